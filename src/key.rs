//! Key material and the active-key provider.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use getrandom::fill as getrandom;
use zeroize::Zeroize;

use crate::types::SfsError;

/// Key length in bytes (XChaCha20-Poly1305).
pub const KEY_LEN: usize = 32;

/// A 32-byte symmetric key. Zeroized on drop; the raw bytes never appear in
/// `Debug` output. The portable text form is 43 characters of URL-safe,
/// unpadded base64.
pub struct Key([u8; KEY_LEN]);

impl Key {
    /// Generate a fresh cryptographically random key.
    ///
    /// The result is not installed anywhere; callers decide whether to adopt
    /// it via [`KeyProvider::set_key`].
    pub fn generate() -> Result<Self, SfsError> {
        let mut bytes = [0u8; KEY_LEN];
        getrandom(&mut bytes).map_err(|_| SfsError::Key("random generator unavailable"))?;
        Ok(Self(bytes))
    }

    /// Parse a key from its base64url text form.
    pub fn from_encoded(text: &str) -> Result<Self, SfsError> {
        let mut decoded = URL_SAFE_NO_PAD
            .decode(text.trim())
            .map_err(|_| SfsError::Key("not valid base64url"))?;
        if decoded.len() != KEY_LEN {
            decoded.zeroize();
            return Err(SfsError::Key("must decode to exactly 32 bytes"));
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self(bytes))
    }

    /// The base64url text form, suitable for display and persistence.
    pub fn encoded(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    pub(crate) fn bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Clone for Key {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(..)")
    }
}

/// Holds the single active key for a session.
///
/// Replacing the key never re-encrypts existing ciphertext: data sealed
/// under the previous key stays unreadable until that key is restored. This
/// is an explicit, documented hazard of `set_key`, not something the
/// provider papers over.
pub struct KeyProvider {
    active: Key,
}

impl KeyProvider {
    pub fn new(active: Key) -> Self {
        Self { active }
    }

    /// The current key; no side effects.
    pub fn key(&self) -> &Key {
        &self.active
    }

    /// Replace the active key. Takes effect for subsequent operations only.
    pub fn set_key(&mut self, key: Key) {
        self.active = key;
    }
}
