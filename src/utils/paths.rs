use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, VaultError};

/// Maximum size of a conversations document: 2 GiB
pub const MAX_DOCUMENT_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Numbered temp names tried before giving up.
const MAX_TEMP_ATTEMPTS: usize = 100;

/// Longest file-name component produced by [`sanitize_component`].
const MAX_COMPONENT_LEN: usize = 64;

/// Validates that a file's size is within acceptable limits
///
/// Takes an open file handle so the size checked is the size of the file that will be read.
///
/// # Errors
///
/// Returns [`VaultError::Format`] if the metadata cannot be read or the file is larger than
/// [`MAX_DOCUMENT_BYTES`].
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file.metadata().map_err(|e| VaultError::unreadable(path, e))?;

    let file_size = metadata.len();
    if file_size > MAX_DOCUMENT_BYTES {
        return Err(VaultError::Format(format!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_DOCUMENT_BYTES
        )));
    }

    Ok(())
}

/// Reduce an identifier to a safe file-name component
///
/// Keeps ASCII alphanumerics, `.`, `_` and `-`; everything else becomes `_`. Leading dots are
/// dropped so the result can never be `.`/`..` or a hidden file. Empty input yields `untitled`.
///
/// # Examples
///
/// ```
/// use chat_vault_search::utils::sanitize_component;
///
/// assert_eq!(sanitize_component("a/b c"), "a_b_c");
/// assert_eq!(sanitize_component("../etc"), "_etc");
/// ```
pub fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .take(MAX_COMPONENT_LEN)
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() { "untitled".to_string() } else { cleaned.to_string() }
}

/// Temporary sibling used while a file is being written: `<name>.tmp`, then `<name>.<n>.tmp`.
pub fn temp_path_for(path: &Path, attempt: usize) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    if attempt > 0 {
        name.push(format!(".{}", attempt));
    }
    name.push(".tmp");
    path.with_file_name(name)
}

/// Create a temp sibling that did not exist before; existing files are never reused.
fn create_temp(path: &Path) -> Result<(File, PathBuf)> {
    for attempt in 0..MAX_TEMP_ATTEMPTS {
        let temp = temp_path_for(path, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&temp) {
            Ok(file) => return Ok((file, temp)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(VaultError::io(path, e)),
        }
    }
    Err(VaultError::io(
        path,
        io::Error::new(io::ErrorKind::AlreadyExists, "no free temporary file name"),
    ))
}

/// Write `contents` to `path` atomically (temp file + rename).
///
/// On failure the temp file is removed and `path` is left untouched. Files already sitting at
/// the temp names are left alone.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let (mut file, temp) = create_temp(path)?;

    let written = file.write_all(contents).and_then(|()| file.sync_all());
    drop(file);
    let written = written.and_then(|()| fs::rename(&temp, path));

    written.map_err(|e| {
        let _ = fs::remove_file(&temp);
        VaultError::io(path, e)
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("abc-123_x.y"), "abc-123_x.y");
        assert_eq!(sanitize_component("a/b\\c d"), "a_b_c_d");
        assert_eq!(sanitize_component("..."), "untitled");
        assert_eq!(sanitize_component(""), "untitled");
        assert_eq!(sanitize_component("héllo"), "h_llo");
    }

    #[test]
    fn test_sanitize_component_truncates() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_component(&long).len(), MAX_COMPONENT_LEN);
    }

    #[test]
    fn test_temp_path_for() {
        assert_eq!(temp_path_for(Path::new("/out/results.md"), 0), PathBuf::from("/out/results.md.tmp"));
        assert_eq!(
            temp_path_for(Path::new("/out/results.md"), 2),
            PathBuf::from("/out/results.md.2.tmp")
        );
    }

    #[test]
    fn test_write_atomic_creates_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_path_for(&path, 0).exists());
    }

    #[test]
    fn test_write_atomic_keeps_existing_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let stale = temp_path_for(&path, 0);
        fs::write(&stale, "not ours").unwrap();

        write_atomic(&path, b"report").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "report");
        assert_eq!(fs::read_to_string(&stale).unwrap(), "not ours");
        assert!(!temp_path_for(&path, 1).exists());
    }

    #[test]
    fn test_write_atomic_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.txt");

        let err = write_atomic(&path, b"data").unwrap_err();
        assert!(matches!(err, VaultError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_validate_file_size_small_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.json");
        fs::write(&path, "[]").unwrap();

        let file = File::open(&path).unwrap();
        assert!(validate_file_size(&file, &path).is_ok());
    }
}
