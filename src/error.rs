//! Error taxonomy for the search-and-extraction engine.
//!
//! Loader and normaliser failures on a single conversation are recovered locally and only
//! show up in [`RunStats`](crate::models::RunStats). Everything that reaches a caller through
//! [`Result`] is one of the variants below.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    /// The expected data entry/file does not exist in the input.
    #[error("not found: {0}")]
    NotFound(String),

    /// The archive or document could not be decoded.
    #[error("unrecognized format: {0}")]
    Format(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid date '{input}': expected YYYY-MM-DD or ISO 8601")]
    InvalidDate { input: String },

    #[error("unsupported export format '{0}' (use json, md or txt)")]
    UnsupportedFormat(String),

    /// Writing an export or code file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VaultError {
    /// A failed write.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// A failed read of the input: the archive is unusable, so it is a format problem.
    pub(crate) fn unreadable(path: &Path, source: io::Error) -> Self {
        Self::Format(format!("cannot read {}: {}", path.display(), source))
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
