//! Password hashing and session tokens
//!
//! # Password Storage
//!
//! - Each password gets a fresh 16-byte random salt
//! - Hash is SHA-256 over `salt || password`, re-hashed `HASH_ITERATIONS` times
//! - Hash and salt are stored as lowercase hex in separate columns
//! - Plain-text passwords are never stored or logged
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. Cookie handling and database
//! access live in the web crate.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Number of SHA-256 rounds applied to every password
pub const HASH_ITERATIONS: u32 = 10_000;

/// Salt length in bytes
pub const SALT_LEN: usize = 16;

/// Session token length in bytes (hex-encoded to twice this many chars)
pub const SESSION_TOKEN_LEN: usize = 32;

// ========================================
// Password Hashing
// ========================================

/// Salted password hash as stored in the `users` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    /// 64 hex characters
    pub hash: String,
    /// 32 hex characters
    pub salt: String,
}

/// Hash a password with a freshly generated salt
///
/// # Examples
///
/// ```
/// use werk_common::api::auth::{hash_password, verify_password};
///
/// let stored = hash_password("sashay away");
/// assert_eq!(stored.hash.len(), 64);
/// assert!(verify_password("sashay away", &stored.hash, &stored.salt));
/// assert!(!verify_password("shantay you stay", &stored.hash, &stored.salt));
/// ```
pub fn hash_password(password: &str) -> PasswordHash {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);

    PasswordHash {
        hash: hash_password_with_salt(password, &salt),
        salt,
    }
}

/// Hash a password with a known salt (hex string)
pub fn hash_password_with_salt(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..HASH_ITERATIONS {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(password.as_bytes());
        digest = hasher.finalize();
    }

    hex::encode(digest)
}

/// Check a password against a stored hash and salt
///
/// An empty stored hash never verifies.
pub fn verify_password(password: &str, stored_hash: &str, salt: &str) -> bool {
    if stored_hash.is_empty() {
        return false;
    }
    let calculated = hash_password_with_salt(password, salt);
    let calculated = calculated.as_bytes();
    let stored = stored_hash.as_bytes();
    // ct_eq on slices of different length is already false
    calculated.ct_eq(stored).into()
}

// ========================================
// Session Tokens
// ========================================

/// Generate a random session token (64 hex chars)
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

// ========================================
// Tests
// ========================================
