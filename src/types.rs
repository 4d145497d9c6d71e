//! Core error type and shared constants for sfs.

use std::path::PathBuf;
use thiserror::Error;

/// Reserved name of the lock marker written at the root of an encrypted
/// subtree. Never enumerated, never encrypted.
pub const LOCK_FILE_NAME: &str = "sfs.lock";

/// Version string baked into banners and the config artifact.
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library error type (no panics for expected failures).
#[derive(Error, Debug)]
pub enum SfsError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    /// Authentication failed or the token structure is wrong: wrong key,
    /// corrupted data, or plaintext passed by mistake.
    #[error("invalid token (wrong key or corrupted data)")]
    InvalidToken,
    #[error("subtree is already encrypted (lock marker present)")]
    AlreadyEncrypted,
    #[error("subtree is not encrypted (no lock marker)")]
    NotEncrypted,
    #[error("destination already exists: {0}")]
    NameCollision(PathBuf),
    #[error("invalid key: {0}")]
    Key(&'static str),
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    #[error("empty command")]
    EmptyCommand,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("configuration parse error")]
    TomlDe(#[from] toml::de::Error),
    #[error("configuration serialize error")]
    TomlSer(#[from] toml::ser::Error),
}
