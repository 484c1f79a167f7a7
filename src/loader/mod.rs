//! Archive loading: locate `conversations.json` and parse it into raw conversation records.
//!
//! # Input Shapes
//!
//! - **Zip archive** (`.zip` extension or zip magic bytes): the shallowest entry named
//!   `conversations.json` (case-insensitive, any folder) is decoded straight from the archive,
//!   nothing is extracted to disk.
//! - **Directory**: `<dir>/conversations.json`, or the shallowest nested match a few levels down.
//! - **Data file**: any other regular file is parsed as the document itself.
//!
//! # Error Handling Strategy
//!
//! Loading is all-or-nothing: a missing data entry is [`VaultError::NotFound`], anything that
//! cannot be read or decoded is [`VaultError::Format`]. Per-conversation problems are left to the
//! normaliser, which skips and counts them.

pub mod archive;
pub mod discovery;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, VaultError};
use crate::utils::validate_file_size;

/// Name of the data document inside an export.
pub const DATA_FILENAME: &str = "conversations.json";

/// One conversation as found in the document, before normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawConversation {
    /// Key of the record when the document is an object keyed by conversation id
    pub key: Option<String>,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    ZipArchive,
    Directory,
    DataFile,
}

/// Work out which of the three supported shapes `path` is.
pub fn detect_shape(path: &Path) -> Result<InputShape> {
    let metadata = path.metadata().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            VaultError::NotFound(format!("input path does not exist: {}", path.display()))
        }
        _ => VaultError::unreadable(path, e),
    })?;

    if metadata.is_dir() {
        return Ok(InputShape::Directory);
    }

    let has_zip_extension =
        path.extension().is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("zip"));
    if has_zip_extension || archive::has_zip_magic(path)? {
        Ok(InputShape::ZipArchive)
    } else {
        Ok(InputShape::DataFile)
    }
}

/// Load raw conversation records from a zip archive, a directory or a data file.
pub fn load_raw_conversations(path: &Path) -> Result<Vec<RawConversation>> {
    let shape = detect_shape(path)?;
    debug!(path = %path.display(), ?shape, "Loading archive");

    let conversations = match shape {
        InputShape::ZipArchive => archive::load_from_zip(path)?,
        InputShape::Directory => {
            let data_file = discovery::find_data_file(path)?.ok_or_else(|| {
                VaultError::NotFound(format!(
                    "no {} found in directory {}",
                    DATA_FILENAME,
                    path.display()
                ))
            })?;
            load_from_file(&data_file)?
        }
        InputShape::DataFile => load_from_file(path)?,
    };

    info!("Loaded {} raw conversations from {}", conversations.len(), path.display());
    Ok(conversations)
}

fn load_from_file(path: &Path) -> Result<Vec<RawConversation>> {
    let file = File::open(path).map_err(|e| VaultError::unreadable(path, e))?;
    validate_file_size(&file, path)?;
    parse_document(BufReader::new(file), &path.display().to_string())
}

/// Decode a conversations document: an array of conversations, or an object keyed by id.
pub fn parse_document<R: Read>(reader: R, source: &str) -> Result<Vec<RawConversation>> {
    let document: Value = serde_json::from_reader(reader)
        .map_err(|e| VaultError::Format(format!("{} is not valid JSON: {}", source, e)))?;

    match document {
        Value::Array(items) => {
            Ok(items.into_iter().map(|value| RawConversation { key: None, value }).collect())
        }
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, value)| RawConversation { key: Some(key), value })
            .collect()),
        _ => Err(VaultError::Format(format!(
            "{} must contain an array or object of conversations",
            source
        ))),
    }
}
