//! The encryption engine: bulk, reversible, in-place transformation of every
//! regular file under a root — contents and leaf names both.
//!
//! Each file's transform is atomic with respect to itself (write the new
//! form, then delete the old), but the batch is not transactional across
//! files: a crash mid-batch leaves a mixed tree. The lock marker is written
//! (or removed) *before* any file is touched so that window is at least
//! detectable from the outside.

use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto;
use crate::fsops::write_all_atomic;
use crate::key::Key;
use crate::lock;
use crate::types::SfsError;
use crate::walk;

/// Outcome of one bulk encrypt or decrypt pass.
///
/// Per-file failures are data, not control flow: the batch keeps going and
/// the caller decides how loudly to report. Failed files are left in the
/// representation they were found in.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files in the snapshot.
    pub attempted: usize,
    /// Files fully transformed (content and name).
    pub transformed: usize,
    /// Paths that could not be transformed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// True when files were present but none could be transformed. The
    /// marker then contradicts the entire tree; callers must not render
    /// this as success.
    pub fn total_failure(&self) -> bool {
        self.attempted > 0 && self.transformed == 0
    }

    /// True when more files failed than were transformed, i.e. the marker
    /// no longer reflects the majority of the tree.
    pub fn mostly_failed(&self) -> bool {
        self.attempted > 0 && self.failed.len() > self.transformed
    }

    fn record(&mut self, path: &Path, err: SfsError) {
        self.failed.push((path.to_path_buf(), err.to_string()));
    }
}

/// Encrypt every regular file under `root` in place.
///
/// Rejects with [`SfsError::AlreadyEncrypted`] when the lock marker is
/// already present; proceeding would re-encrypt ciphertext and destroy it.
/// Otherwise the marker is written first, the file list is snapshotted, and
/// each file is independently sealed and renamed.
pub fn encrypt_tree(root: &Path, key: &Key) -> Result<BatchReport, SfsError> {
    if lock::is_locked(root) {
        return Err(SfsError::AlreadyEncrypted);
    }
    // Marker before mutation: an interrupted run must be detectable.
    lock::lock(root, &lock::banner())?;
    let files = walk::list_files(root)?;
    let mut report = BatchReport::default();
    for path in files {
        report.attempted += 1;
        match encrypt_one(&path, key) {
            Ok(()) => report.transformed += 1,
            Err(e) => report.record(&path, e),
        }
    }
    Ok(report)
}

/// Decrypt every regular file under `root` in place.
///
/// Returns [`SfsError::NotEncrypted`] without touching anything when no
/// lock marker is present. Otherwise the marker is removed first, then each
/// file's name and content are opened. Files that fail to decrypt (wrong
/// key, corruption, plaintext stragglers added after locking) are recorded
/// and left exactly as found.
pub fn decrypt_tree(root: &Path, key: &Key) -> Result<BatchReport, SfsError> {
    if !lock::is_locked(root) {
        return Err(SfsError::NotEncrypted);
    }
    // Marker comes off first, mirroring encrypt: intent before mutation.
    lock::unlock(root)?;
    let files = walk::list_files(root)?;
    let mut report = BatchReport::default();
    for path in files {
        report.attempted += 1;
        match decrypt_one(&path, key) {
            Ok(()) => report.transformed += 1,
            Err(e) => report.record(&path, e),
        }
    }
    Ok(report)
}

fn split_leaf(path: &Path) -> Result<(&Path, &str), SfsError> {
    let leaf = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or(SfsError::Invalid("file name is not valid UTF-8"))?;
    let parent = path
        .parent()
        .ok_or(SfsError::Invalid("file has no parent directory"))?;
    Ok((parent, leaf))
}

fn encrypt_one(path: &Path, key: &Key) -> Result<(), SfsError> {
    let (parent, leaf) = split_leaf(path)?;
    let plaintext = fs::read(path)?;
    let token = crypto::seal(&plaintext, key)?;
    let dest = parent.join(crypto::seal_name(leaf, key)?);
    if dest.exists() {
        return Err(SfsError::NameCollision(dest));
    }
    write_all_atomic(&dest, &token, false)?;
    fs::remove_file(path)?;
    Ok(())
}

fn decrypt_one(path: &Path, key: &Key) -> Result<(), SfsError> {
    let (parent, leaf) = split_leaf(path)?;
    // Name first: a file whose name is not a valid token is left untouched
    // before its content is ever read.
    let real_name = crypto::open_name(leaf, key)?;
    if real_name.is_empty() || real_name.contains(['/', '\\']) || real_name == ".." {
        return Err(SfsError::InvalidToken);
    }
    let token = fs::read(path)?;
    let plaintext = crypto::open(&token, key)?;
    let dest = parent.join(real_name);
    if dest.exists() {
        return Err(SfsError::NameCollision(dest));
    }
    write_all_atomic(&dest, &plaintext, false)?;
    fs::remove_file(path)?;
    Ok(())
}
