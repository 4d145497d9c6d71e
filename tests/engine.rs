//! End-to-end engine behavior over real temporary trees.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use sfs::{
    Key, SfsError, decrypt_tree, encrypt_tree, is_locked, list_files, lock, open_name, seal,
    seal_name, unlock,
};
use tempfile::tempdir;

/// Map of leaf name -> content for every file under `root` (lock marker
/// excluded), for before/after comparisons.
fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut map = BTreeMap::new();
    for path in list_files(root).unwrap() {
        let leaf = path.file_name().unwrap().to_string_lossy().into_owned();
        map.insert(leaf, fs::read(&path).unwrap());
    }
    map
}

#[test]
fn encrypt_then_decrypt_restores_tree() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::create_dir(root.join("b")).unwrap();
    fs::write(root.join("b/c.txt"), "world").unwrap();

    let key = Key::generate().unwrap();
    let report = encrypt_tree(root, &key).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.transformed, 2);

    assert!(is_locked(root));
    assert!(!root.join("a.txt").exists());
    assert!(!root.join("b/c.txt").exists());

    // Every remaining file carries an unrecognizable name that still
    // decrypts to the original leaf under the same key.
    let mut decrypted_names: Vec<String> = list_files(root)
        .unwrap()
        .iter()
        .map(|p| open_name(p.file_name().unwrap().to_str().unwrap(), &key).unwrap())
        .collect();
    decrypted_names.sort();
    assert_eq!(decrypted_names, ["a.txt", "c.txt"]);

    let report = decrypt_tree(root, &key).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.transformed, 2);

    assert!(!is_locked(root));
    assert_eq!(fs::read(root.join("a.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(root.join("b/c.txt")).unwrap(), b"world");
    assert_eq!(list_files(root).unwrap().len(), 2);
}

#[test]
fn double_encrypt_is_rejected_and_changes_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "hello").unwrap();

    let key = Key::generate().unwrap();
    encrypt_tree(root, &key).unwrap();
    let before = snapshot(root);

    let res = encrypt_tree(root, &key);
    assert!(matches!(res, Err(SfsError::AlreadyEncrypted)));
    assert_eq!(snapshot(root), before, "no file may be re-encrypted");
}

#[test]
fn decrypt_without_marker_is_a_noop() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "hello").unwrap();

    let key = Key::generate().unwrap();
    let res = decrypt_tree(root, &key);
    assert!(matches!(res, Err(SfsError::NotEncrypted)));
    assert_eq!(fs::read(root.join("a.txt")).unwrap(), b"hello");
}

#[test]
fn unlock_is_idempotent() {
    let dir = tempdir().unwrap();
    let root = dir.path();

    lock(root, "banner").unwrap();
    assert!(is_locked(root));
    unlock(root).unwrap();
    assert!(!is_locked(root));
    unlock(root).unwrap();
    assert!(!is_locked(root));
}

#[cfg(unix)]
#[test]
fn unreadable_file_is_reported_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("ok.txt"), "fine").unwrap();
    fs::write(root.join("locked-out.txt"), "no access").unwrap();
    fs::set_permissions(
        root.join("locked-out.txt"),
        fs::Permissions::from_mode(0o000),
    )
    .unwrap();

    let key = Key::generate().unwrap();
    let report = encrypt_tree(root, &key).unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.transformed, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("locked-out.txt"));

    // The skipped file keeps its plaintext form.
    assert!(root.join("locked-out.txt").exists());
    assert!(!root.join("ok.txt").exists());

    fs::set_permissions(
        root.join("locked-out.txt"),
        fs::Permissions::from_mode(0o644),
    )
    .unwrap();
}

#[test]
fn plaintext_straggler_is_reported_on_decrypt() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "hello").unwrap();

    let key = Key::generate().unwrap();
    encrypt_tree(root, &key).unwrap();

    // Added after the marker went down; its name is not a token.
    fs::write(root.join("late.txt"), "came late").unwrap();

    let report = decrypt_tree(root, &key).unwrap();
    assert_eq!(report.transformed, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].0.ends_with("late.txt"));

    assert_eq!(fs::read(root.join("a.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(root.join("late.txt")).unwrap(), b"came late");
}

#[test]
fn decrypt_refuses_to_overwrite_on_name_collision() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("x.txt"), "first").unwrap();

    let key = Key::generate().unwrap();
    encrypt_tree(root, &key).unwrap();

    // A second token that also decrypts to "x.txt": whichever is processed
    // later must refuse the existing destination rather than overwrite it.
    let rival_name = seal_name("x.txt", &key).unwrap();
    let rival_content = seal(b"second", &key).unwrap();
    fs::write(root.join(rival_name), rival_content).unwrap();

    let report = decrypt_tree(root, &key).unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.transformed, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].1.contains("already exists"));
    assert!(root.join("x.txt").exists());
}

#[test]
fn marker_alone_decrypts_to_empty_report() {
    // Crash right after the marker write leaves a lock with no encrypted
    // files; decrypt must clean up the marker and touch nothing.
    let dir = tempdir().unwrap();
    let root = dir.path();
    lock(root, "banner").unwrap();

    let key = Key::generate().unwrap();
    let report = decrypt_tree(root, &key).unwrap();
    assert_eq!(report.attempted, 0);
    assert!(report.is_clean());
    assert!(!report.total_failure());
    assert!(!is_locked(root));
}

#[test]
fn wrong_key_decrypt_reports_every_file() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::write(root.join("b.txt"), "world").unwrap();

    let key = Key::generate().unwrap();
    encrypt_tree(root, &key).unwrap();

    let wrong = Key::generate().unwrap();
    let report = decrypt_tree(root, &wrong).unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.transformed, 0);
    assert!(report.total_failure());
    assert!(report.mostly_failed());
}
