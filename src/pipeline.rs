//! Single entry point for CLI/GUI callers: load, normalise, search, export.
//!
//! # Error Handling Strategy
//!
//! - **Query errors** never reach this module: a [`Query`] is validated when it is built.
//! - **Load errors** (missing data entry, undecodable document) abort the run.
//! - **Conversation errors** are skipped and counted in [`RunStats::conversations_skipped`].
//! - **Export errors** are surfaced after the search; no partial result file is left behind.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::export::{ExportFormat, export_hits, extract_code};
use crate::loader::load_raw_conversations;
use crate::models::{Hit, RunStats, Vault};
use crate::parsers::normalize_all;
use crate::search::{HitPosition, Query, ScanObserver, search_positions};

/// What to do with the hits once the search is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Write the hits to this file
    pub export_path: Option<PathBuf>,
    pub format: ExportFormat,
    /// Write every code block of every hit into this directory
    pub extract_code_dir: Option<PathBuf>,
}

/// Result of [`run_search`]: the normalised archive, the hits into it and the run counters.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    vault: Vault,
    positions: Vec<HitPosition>,
    pub stats: RunStats,
    pub exported_to: Option<PathBuf>,
    pub extracted_files: Vec<PathBuf>,
}

impl SearchOutcome {
    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    /// Hits in encounter order, borrowing from the owned archive.
    pub fn hits(&self) -> Vec<Hit<'_>> {
        self.positions.iter().filter_map(|p| p.resolve(&self.vault.conversations)).collect()
    }

    pub fn hit_count(&self) -> usize {
        self.positions.len()
    }
}

/// Load and normalise an archive (zip, directory or data file).
pub fn open_vault(input: &Path) -> Result<Vault> {
    let raw = load_raw_conversations(input)?;
    Ok(normalize_all(&raw))
}

/// Run the whole pipeline on `input`.
///
/// `observer` receives `(processed, total)` once per conversation and may cancel the scan;
/// a cancelled run still exports whatever was found.
pub fn run_search(
    input: &Path,
    query: &Query,
    options: &ExportOptions,
    observer: &mut dyn ScanObserver,
) -> Result<SearchOutcome> {
    let vault = open_vault(input)?;
    search_vault(vault, query, options, observer)
}

/// Run search and export over an already normalised archive.
pub fn search_vault(
    vault: Vault,
    query: &Query,
    options: &ExportOptions,
    observer: &mut dyn ScanObserver,
) -> Result<SearchOutcome> {
    let (positions, mut stats) = search_positions(&vault.conversations, query, observer);
    stats.conversations_total = vault.raw_count;
    stats.conversations_skipped = vault.skipped;

    let mut outcome = SearchOutcome {
        vault,
        positions,
        stats,
        exported_to: None,
        extracted_files: Vec::new(),
    };

    let hits = outcome.hits();
    if let Some(path) = &options.export_path {
        export_hits(&hits, options.format, path)?;
    }
    let extracted = match &options.extract_code_dir {
        Some(dir) => extract_code(&hits, dir)?,
        None => Vec::new(),
    };

    outcome.exported_to = options.export_path.clone();
    outcome.extracted_files = extracted;

    info!(
        "Search complete: {} hits, {} conversations scanned, {} skipped, {} messages",
        outcome.stats.hits,
        outcome.stats.conversations_scanned,
        outcome.stats.conversations_skipped,
        outcome.stats.messages_scanned
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::error::VaultError;

    const DOC: &str = r#"[
        {"id":"c1","title":"Scripts","messages":[
            {"id":"m1","role":"user","content":"write a script"},
            {"id":"m2","role":"assistant","content":"```bash\necho script\n```"}
        ]},
        {"id":"c2","title":"Broken","mapping":"oops"},
        {"id":"c3","title":"Other","messages":[{"id":"m3","role":"user","content":"nothing"}]}
    ]"#;

    #[test]
    fn test_run_search_reports_skips_alongside_hits() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("conversations.json");
        fs::write(&input, DOC).unwrap();
        let query = Query::builder("script").search_titles(false).build().unwrap();

        let outcome = run_search(&input, &query, &ExportOptions::default(), &mut ()).unwrap();

        assert_eq!(outcome.hit_count(), 2);
        assert_eq!(outcome.stats.conversations_total, 3);
        assert_eq!(outcome.stats.conversations_skipped, 1);
        assert_eq!(outcome.stats.conversations_scanned, 2);
        assert_eq!(outcome.stats.messages_scanned, 3);
        assert_eq!(outcome.stats.errors(), 1);
        assert!(outcome.exported_to.is_none());
    }

    #[test]
    fn test_run_search_exports_and_extracts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("conversations.json"), DOC).unwrap();
        let options = ExportOptions {
            export_path: Some(dir.path().join("hits.json")),
            format: ExportFormat::Json,
            extract_code_dir: Some(dir.path().join("code")),
        };
        let query = Query::builder("echo").build().unwrap();

        let outcome = run_search(dir.path(), &query, &options, &mut ()).unwrap();

        assert_eq!(outcome.hit_count(), 1);
        assert!(dir.path().join("hits.json").is_file());
        assert_eq!(outcome.extracted_files, vec![dir.path().join("code/c1__m2__1.sh")]);
    }

    #[test]
    fn test_run_search_missing_input() {
        let query = Query::builder("x").build().unwrap();
        let err = run_search(Path::new("/nonexistent"), &query, &ExportOptions::default(), &mut ())
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFound(_)));
    }
}
