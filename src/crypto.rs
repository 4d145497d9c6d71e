//! The token cipher: authenticated encryption for file contents and names.
//!
//! A token is self-describing: `version(1) || nonce(24) || ciphertext+tag`.
//! Contents are stored as the binary token; names use the URL-safe base64
//! form so every encrypted name is a portable filename. A fresh nonce is
//! drawn per call, so sealing the same input twice yields different tokens;
//! opening a valid token always recovers the exact original bytes.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use getrandom::fill as getrandom;

use crate::key::Key;
use crate::types::SfsError;

/// Token format version byte.
pub const TOKEN_VERSION: u8 = 1;

/// XChaCha20-Poly1305 nonce length.
pub const NONCE_LEN: usize = 24;

/// Poly1305 authentication tag length.
pub const TAG_LEN: usize = 16;

fn cipher_for(key: &Key) -> Result<XChaCha20Poly1305, SfsError> {
    XChaCha20Poly1305::new_from_slice(key.bytes()).map_err(|_| SfsError::InvalidToken)
}

/// Seal plaintext into a binary token under `key`.
pub fn seal(plaintext: &[u8], key: &Key) -> Result<Vec<u8>, SfsError> {
    let mut nonce = [0u8; NONCE_LEN];
    getrandom(&mut nonce).map_err(|_| SfsError::Key("random generator unavailable"))?;
    let ct = cipher_for(key)?
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| SfsError::InvalidToken)?;
    let mut token = Vec::with_capacity(1 + NONCE_LEN + ct.len());
    token.push(TOKEN_VERSION);
    token.extend_from_slice(&nonce);
    token.extend_from_slice(&ct);
    Ok(token)
}

/// Open a binary token, recovering the original plaintext.
///
/// # Errors
///
/// Returns [`SfsError::InvalidToken`] when the tag does not verify or the
/// structure is wrong (wrong key, corrupted data, truncated or plaintext
/// input). Never panics on malformed input.
pub fn open(token: &[u8], key: &Key) -> Result<Vec<u8>, SfsError> {
    if token.len() < 1 + NONCE_LEN + TAG_LEN || token[0] != TOKEN_VERSION {
        return Err(SfsError::InvalidToken);
    }
    let (nonce, ct) = token[1..].split_at(NONCE_LEN);
    cipher_for(key)?
        .decrypt(XNonce::from_slice(nonce), ct)
        .map_err(|_| SfsError::InvalidToken)
}

/// Seal a file name into its encrypted, filesystem-safe form.
pub fn seal_name(name: &str, key: &Key) -> Result<String, SfsError> {
    Ok(URL_SAFE_NO_PAD.encode(seal(name.as_bytes(), key)?))
}

/// Open an encrypted file name back into the original name.
///
/// Non-base64 input (e.g. a plaintext name encountered mid-decrypt) and
/// tokens that do not decrypt to UTF-8 both fail with `InvalidToken`.
pub fn open_name(name: &str, key: &Key) -> Result<String, SfsError> {
    let token = URL_SAFE_NO_PAD
        .decode(name)
        .map_err(|_| SfsError::InvalidToken)?;
    let plain = open(&token, key)?;
    String::from_utf8(plain).map_err(|_| SfsError::InvalidToken)
}
