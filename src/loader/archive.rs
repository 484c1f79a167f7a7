use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use super::{DATA_FILENAME, RawConversation, parse_document};
use crate::error::{Result, VaultError};
use crate::utils::MAX_DOCUMENT_BYTES;

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Check whether a file starts with the zip local file header signature.
pub fn has_zip_magic(path: &Path) -> Result<bool> {
    let mut file = File::open(path).map_err(|e| VaultError::unreadable(path, e))?;
    let mut header = [0u8; 4];
    match file.read_exact(&mut header) {
        Ok(()) => Ok(header == ZIP_MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(VaultError::unreadable(path, e)),
    }
}

/// Pick the data entry among an archive's entry names.
///
/// Matches the final path component case-insensitively; the shallowest match wins, then the
/// shortest name, so ties resolve the same way on every run.
pub fn find_data_entry<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    names
        .into_iter()
        .filter(|name| {
            name.rsplit(['/', '\\'])
                .next()
                .is_some_and(|file_name| file_name.eq_ignore_ascii_case(DATA_FILENAME))
        })
        .min_by_key(|name| (name.matches(['/', '\\']).count(), name.len(), *name))
}

/// Read raw conversations from the data entry of a zip archive, in memory.
pub fn load_from_zip(path: &Path) -> Result<Vec<RawConversation>> {
    let file = File::open(path).map_err(|e| VaultError::unreadable(path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| {
        VaultError::Format(format!("{} is not a readable zip archive: {}", path.display(), e))
    })?;

    let entry_name = find_data_entry(archive.file_names()).map(str::to_string).ok_or_else(|| {
        VaultError::NotFound(format!("no {} inside {}", DATA_FILENAME, path.display()))
    })?;
    debug!(entry = %entry_name, "Found data entry in archive");

    let entry = archive.by_name(&entry_name).map_err(|e| {
        VaultError::Format(format!("cannot read {} from {}: {}", entry_name, path.display(), e))
    })?;
    if entry.size() > MAX_DOCUMENT_BYTES {
        return Err(VaultError::Format(format!(
            "{} in {} is too large ({} bytes, max {} bytes)",
            entry_name,
            path.display(),
            entry.size(),
            MAX_DOCUMENT_BYTES
        )));
    }

    parse_document(BufReader::new(entry), &format!("{}:{}", path.display(), entry_name))
}
