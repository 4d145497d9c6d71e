//! Filesystem glue for the shell commands, plus the atomic-write helper the
//! engine and config layer share.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::types::{LOCK_FILE_NAME, SfsError};

/// Atomically write data to a file using a temporary file.
///
/// The temp file is created in the target's directory, filled, synced, and
/// renamed over the target, so readers never observe a half-written file.
///
/// # Errors
///
/// Returns `SfsError::Io` for I/O failures or `SfsError::Invalid` for paths
/// without a parent directory.
pub fn write_all_atomic(path: &Path, data: &[u8], mode_600: bool) -> Result<(), SfsError> {
    let parent = path
        .parent()
        .ok_or(SfsError::Invalid("output path has no parent"))?;
    // A bare relative file name has an empty parent.
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let mut tmp = NamedTempFile::new_in(parent)?;
    if mode_600 {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
        }
    }
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|e| SfsError::Io(e.error))?;
    Ok(())
}

/// Render a directory listing. The lock marker itself is hidden and replaced
/// by an `SFS.LOCKED` badge at the end of the listing.
pub fn list_dir(dir: &Path) -> Result<String, SfsError> {
    let mut names = Vec::new();
    let mut locked = false;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == LOCK_FILE_NAME {
            locked = true;
        } else {
            names.push(name);
        }
    }
    names.sort();
    if locked {
        names.push("SFS.LOCKED".to_string());
    }
    Ok(names.join("  "))
}

pub fn make_dir(dir: &Path) -> Result<(), SfsError> {
    fs::create_dir(dir)?;
    Ok(())
}

/// Remove a directory and everything under it.
pub fn remove_dir(dir: &Path) -> Result<(), SfsError> {
    fs::remove_dir_all(dir)?;
    Ok(())
}

pub fn rename_dir(old: &Path, new: &Path) -> Result<(), SfsError> {
    fs::rename(old, new)?;
    Ok(())
}

/// Create an empty file, truncating any existing one.
pub fn make_file(path: &Path) -> Result<(), SfsError> {
    fs::File::create(path)?;
    Ok(())
}

pub fn remove_file(path: &Path) -> Result<(), SfsError> {
    fs::remove_file(path)?;
    Ok(())
}

/// Read a file as UTF-8 text for display.
pub fn cat(path: &Path) -> Result<String, SfsError> {
    Ok(fs::read_to_string(path)?)
}
