#![forbid(unsafe_code)]
//! # sfs — a virtual filesystem shell with reversible in-place encryption.
//!
//! `sfs` presents a directory tree as a managed "virtual filesystem": the
//! usual create/remove/rename/list commands, plus a bulk encryption mode
//! that encrypts every regular file under the working root — contents *and*
//! file names — and a matching decryption mode that restores the originals
//! byte for byte.
//!
//! ## Design
//! - **Cipher**: XChaCha20-Poly1305 tokens (`version || nonce || ct+tag`),
//!   base64url-wrapped when used as file names. Wrong key or tampering
//!   fails deterministically with [`SfsError::InvalidToken`].
//! - **Lock marker**: an `sfs.lock` file at the root records "this subtree
//!   is encrypted" and gates both directions: encrypting twice is rejected,
//!   decrypting an unmarked tree is a no-op.
//! - **Batch semantics**: per-file failures are collected into a
//!   [`BatchReport`] and never abort the rest of the batch; the batch as a
//!   whole is not transactional across files.
//!
//! ## Example: encrypt and restore a tree
//! ```no_run
//! use sfs::{Key, encrypt_tree, decrypt_tree};
//! use std::path::Path;
//!
//! let key = Key::generate().unwrap();
//! let root = Path::new("storage");
//!
//! let report = encrypt_tree(root, &key).unwrap();
//! assert!(report.is_clean());
//! decrypt_tree(root, &key).unwrap();
//! ```
//!
//! Safety notes
//! - The crate is not audited. Protects data at rest against casual access;
//!   does not defend against compromised hosts or side channels.

mod types;
mod key;
mod crypto;
mod walk;
mod lock;
mod engine;
mod fsops;
mod config;
mod shell;

// Re-export public API from modules
pub use types::{LOCK_FILE_NAME, PROGRAM_VERSION, SfsError};
pub use key::{KEY_LEN, Key, KeyProvider};
pub use crypto::{open, open_name, seal, seal_name};
pub use walk::list_files;
pub use lock::{is_locked, lock, unlock};
pub use engine::{BatchReport, decrypt_tree, encrypt_tree};
pub use fsops::write_all_atomic;
pub use config::SfsConfig;
pub use shell::{HELP, Reply, Session};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_small() {
        let key = Key::generate().unwrap();
        let token = seal(b"hi", &key).unwrap();
        assert_eq!(open(&token, &key).unwrap(), b"hi");
    }

    #[test]
    fn wrong_key_fails() {
        let key = Key::generate().unwrap();
        let other = Key::generate().unwrap();
        let token = seal(b"data", &key).unwrap();
        assert!(matches!(open(&token, &other), Err(SfsError::InvalidToken)));
    }

    #[test]
    fn name_round_trip() {
        let key = Key::generate().unwrap();
        let sealed = seal_name("notes.txt", &key).unwrap();
        assert_ne!(sealed, "notes.txt");
        assert!(!sealed.contains('/'));
        assert_eq!(open_name(&sealed, &key).unwrap(), "notes.txt");
    }

    #[test]
    fn fresh_nonce_per_seal() {
        let key = Key::generate().unwrap();
        let a = seal(b"same", &key).unwrap();
        let b = seal(b"same", &key).unwrap();
        assert_ne!(a, b);
        assert_eq!(open(&a, &key).unwrap(), open(&b, &key).unwrap());
    }
}
