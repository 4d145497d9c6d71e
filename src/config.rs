//! The key-persistence artifact: a small TOML file holding the active key.
//!
//! The core only needs get/set semantics for the key; this module is the
//! external collaborator that makes it survive restarts.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fsops::write_all_atomic;
use crate::key::Key;
use crate::types::{PROGRAM_VERSION, SfsError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SfsConfig {
    /// Active key in base64url text form.
    pub key: String,
    /// Version of the sfs that wrote this file.
    pub version: String,
}

impl SfsConfig {
    /// A fresh config with a newly generated key.
    pub fn fresh() -> Result<Self, SfsError> {
        Ok(Self {
            key: Key::generate()?.encoded(),
            version: PROGRAM_VERSION.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, SfsError> {
        Ok(toml::from_str(&fs::read_to_string(path)?)?)
    }

    /// Load the config at `path`, creating and saving a fresh one when the
    /// file does not exist. Returns `true` when a new config was created.
    ///
    /// An existing but unparsable file is an error, not a first run:
    /// silently replacing it would orphan every ciphertext made under the
    /// old key.
    pub fn load_or_create(path: &Path) -> Result<(Self, bool), SfsError> {
        if path.exists() {
            Ok((Self::load(path)?, false))
        } else {
            let config = Self::fresh()?;
            config.save(path)?;
            Ok((config, true))
        }
    }

    /// Persist atomically, with 0600 permissions on Unix.
    pub fn save(&self, path: &Path) -> Result<(), SfsError> {
        let text = toml::to_string_pretty(self)?;
        write_all_atomic(path, text.as_bytes(), true)
    }
}
