use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::DATA_FILENAME;
use crate::error::Result;

/// How far below the given directory a nested data file is looked for.
const MAX_SEARCH_DEPTH: usize = 4;

/// Find the data document inside an extracted export directory.
///
/// `<dir>/conversations.json` wins outright. Otherwise the directory tree is walked (bounded
/// depth, symlinks not followed) and the shallowest file whose name matches case-insensitively
/// is returned. Returns `Ok(None)` when nothing matches.
pub fn find_data_file(dir: &Path) -> Result<Option<PathBuf>> {
    let direct = dir.join(DATA_FILENAME);
    if direct.is_file() {
        return Ok(Some(direct));
    }

    let mut best: Option<(usize, PathBuf)> = None;
    for entry in WalkDir::new(dir).min_depth(1).max_depth(MAX_SEARCH_DEPTH).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable path while searching {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file()
            || !entry.file_name().to_string_lossy().eq_ignore_ascii_case(DATA_FILENAME)
        {
            continue;
        }
        if best.as_ref().is_none_or(|(depth, _)| entry.depth() < *depth) {
            best = Some((entry.depth(), entry.into_path()));
        }
    }

    if let Some((depth, path)) = &best {
        debug!(depth, path = %path.display(), "Found nested data file");
    }
    Ok(best.map(|(_, path)| path))
}
