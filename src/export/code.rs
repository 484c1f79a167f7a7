use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, VaultError};
use crate::models::Hit;
use crate::utils::sanitize_component;

/// Give up after this many numbered variants of one file name.
const MAX_SUFFIX: usize = 10_000;

/// File extension for a fence language tag; `txt` when unknown or empty.
pub fn extension_for(language: &str) -> &'static str {
    match language.trim().to_ascii_lowercase().as_str() {
        "python" | "py" | "python3" => "py",
        "javascript" | "js" | "node" => "js",
        "typescript" | "ts" => "ts",
        "tsx" => "tsx",
        "jsx" => "jsx",
        "rust" | "rs" => "rs",
        "go" | "golang" => "go",
        "java" => "java",
        "kotlin" | "kt" => "kt",
        "c" => "c",
        "cpp" | "c++" | "cxx" => "cpp",
        "csharp" | "cs" | "c#" => "cs",
        "ruby" | "rb" => "rb",
        "php" => "php",
        "swift" => "swift",
        "bash" | "sh" | "zsh" | "shell" | "console" => "sh",
        "powershell" | "ps1" => "ps1",
        "json" => "json",
        "yaml" | "yml" => "yml",
        "toml" => "toml",
        "xml" => "xml",
        "html" => "html",
        "css" => "css",
        "scss" => "scss",
        "sql" => "sql",
        "markdown" | "md" => "md",
        "dockerfile" | "docker" => "dockerfile",
        _ => "txt",
    }
}

/// Write every code block of every hit into `dir`, one file per block.
///
/// Files are named `<conversation>__<message>__<n>.<ext>`. A message appearing in several hits
/// is written once. Existing files are never overwritten: a colliding name gets a `-2`, `-3`, …
/// suffix instead. Returns the written paths in hit order.
pub fn extract_code(hits: &[Hit<'_>], dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| VaultError::io(dir, e))?;

    let mut written = Vec::new();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();

    for hit in hits {
        if !seen.insert((hit.conversation.id.as_str(), hit.message.id.as_str())) {
            continue;
        }
        let base = format!(
            "{}__{}",
            sanitize_component(&hit.conversation.id),
            sanitize_component(&hit.message.id)
        );
        for (index, block) in hit.code_blocks().iter().enumerate() {
            let stem = format!("{}__{}", base, index + 1);
            let path = create_unique(dir, &stem, extension_for(&block.language), &block.code)?;
            written.push(path);
        }
    }

    debug!(files = written.len(), dir = %dir.display(), "Extracted code blocks");
    Ok(written)
}

fn create_unique(dir: &Path, stem: &str, ext: &str, contents: &str) -> Result<PathBuf> {
    for n in 1..=MAX_SUFFIX {
        let name =
            if n == 1 { format!("{}.{}", stem, ext) } else { format!("{}-{}.{}", stem, n, ext) };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                if n > 1 {
                    warn!("{}.{} already exists, wrote {} instead", stem, ext, path.display());
                }
                write_or_remove(file, &path, contents.as_bytes())
                    .map_err(|e| VaultError::io(&path, e))?;
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(VaultError::io(&path, e)),
        }
    }

    Err(VaultError::io(
        dir.join(format!("{}.{}", stem, ext)),
        io::Error::new(io::ErrorKind::AlreadyExists, "too many files with the same name"),
    ))
}

/// Fill a freshly created file; a failed write deletes it rather than leaving it truncated.
fn write_or_remove(mut file: File, path: &Path, contents: &[u8]) -> io::Result<()> {
    let result = file.write_all(contents);
    if result.is_err() {
        drop(file);
        let _ = fs::remove_file(path);
    }
    result
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::models::{AuthorRole, Conversation, HitKind, Message};

    fn conversation() -> Conversation {
        Conversation {
            id: "conv/1".to_string(),
            title: "t".to_string(),
            create_time: None,
            messages: vec![
                Message::new(
                    "m1",
                    AuthorRole::Assistant,
                    None,
                    "```python\nprint(1)\n```\n```\nplain\n```",
                ),
                Message::new("m2", AuthorRole::User, None, "no code"),
            ],
        }
    }

    fn hit<'a>(c: &'a Conversation, i: usize, kind: HitKind) -> Hit<'a> {
        Hit { conversation: c, message: &c.messages[i], kind, snippet: String::new() }
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("Python"), "py");
        assert_eq!(extension_for("zsh"), "sh");
        assert_eq!(extension_for("rust"), "rs");
        assert_eq!(extension_for(""), "txt");
        assert_eq!(extension_for("brainfuck"), "txt");
    }

    #[test]
    fn test_extract_code_writes_one_file_per_block() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("recovered");
        let c = conversation();

        let written = extract_code(&[hit(&c, 0, HitKind::Message), hit(&c, 1, HitKind::Message)], &out)
            .unwrap();

        assert_eq!(written, vec![out.join("conv_1__m1__1.py"), out.join("conv_1__m1__2.txt")]);
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "print(1)");
        assert_eq!(fs::read_to_string(&written[1]).unwrap(), "plain");
    }

    #[test]
    fn test_extract_code_same_message_once() {
        let dir = TempDir::new().unwrap();
        let c = conversation();

        let written =
            extract_code(&[hit(&c, 0, HitKind::Title), hit(&c, 0, HitKind::Message)], dir.path())
                .unwrap();
        assert_eq!(written.len(), 2);
    }

    #[test]
    fn test_extract_code_never_overwrites() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("conv_1__m1__1.py"), "keep me").unwrap();
        let c = conversation();

        let written = extract_code(&[hit(&c, 0, HitKind::Message)], dir.path()).unwrap();

        assert_eq!(written[0], dir.path().join("conv_1__m1__1-2.py"));
        assert_eq!(fs::read_to_string(dir.path().join("conv_1__m1__1.py")).unwrap(), "keep me");
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), "print(1)");
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conv__m__1.py");
        fs::write(&path, "").unwrap();
        // Read-only handle: every write fails
        let file = File::open(&path).unwrap();

        assert!(write_or_remove(file, &path, b"print(1)").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_extract_code_is_repeatable_without_loss() {
        let dir = TempDir::new().unwrap();
        let c = conversation();
        let hits = [hit(&c, 0, HitKind::Message)];

        let first = extract_code(&hits, dir.path()).unwrap();
        let second = extract_code(&hits, dir.path()).unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
    }
}
