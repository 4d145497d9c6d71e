//! Recursive enumeration of regular files under a working root.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::types::{LOCK_FILE_NAME, SfsError};

/// List every regular file under `root`, excluding the root-level lock
/// marker.
///
/// The result is fully materialized and sorted by file name so the engine
/// works from a fixed snapshot in a stable order; enumeration must never be
/// interleaved with the renames that follow. Symlinks are not followed.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>, SfsError> {
    let marker = root.join(LOCK_FILE_NAME);
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| SfsError::Io(e.into()))?;
        if entry.file_type().is_file() && entry.path() != marker {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
