//! The lock marker recording whether a subtree is currently encrypted.
//!
//! Only the marker's existence carries meaning; its content is a
//! human-readable banner and is never parsed.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::types::{LOCK_FILE_NAME, PROGRAM_VERSION, SfsError};

/// Banner written into a fresh marker.
pub fn banner() -> String {
    format!("This folder is encrypted by SFS\nsfs {PROGRAM_VERSION}\n")
}

/// Whether the marker exists at `root`.
pub fn is_locked(root: &Path) -> bool {
    root.join(LOCK_FILE_NAME).is_file()
}

/// Create the marker with the given banner content.
pub fn lock(root: &Path, banner: &str) -> Result<(), SfsError> {
    fs::write(root.join(LOCK_FILE_NAME), banner)?;
    Ok(())
}

/// Remove the marker. An absent marker is not an error, so repeated unlocks
/// observe the same state as a single one.
pub fn unlock(root: &Path) -> Result<(), SfsError> {
    match fs::remove_file(root.join(LOCK_FILE_NAME)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
