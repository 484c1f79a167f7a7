//! Result export: serialise hits to `json`, `md` or `txt`, and extract code blocks to files.
//!
//! Result files are written atomically (temp sibling + rename), so a failed export never
//! leaves a partial file at the destination.

pub mod code;
pub mod formats;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::{Result, VaultError};
use crate::models::Hit;
use crate::utils::write_atomic;

pub use code::{extension_for, extract_code};
pub use formats::{render_json, render_markdown, render_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Json,
    #[default]
    Markdown,
    Text,
}

impl FromStr for ExportFormat {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::Text),
            _ => Err(VaultError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Text => "txt",
        })
    }
}

/// Render hits in the given format.
pub fn render(hits: &[Hit<'_>], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => render_json(hits),
        ExportFormat::Markdown => Ok(render_markdown(hits)),
        ExportFormat::Text => Ok(render_text(hits)),
    }
}

/// Render hits and write them to `destination` atomically.
pub fn export_hits(hits: &[Hit<'_>], format: ExportFormat, destination: &Path) -> Result<()> {
    let contents = render(hits, format)?;
    write_atomic(destination, contents.as_bytes())?;
    info!("Exported {} hits as {} to {}", hits.len(), format, destination.display());
    Ok(())
}

/// [`export_hits`] with the format given as a string (`json`, `md`, `txt`).
pub fn export(hits: &[Hit<'_>], format: &str, destination: &Path) -> Result<()> {
    export_hits(hits, format.parse()?, destination)
}
