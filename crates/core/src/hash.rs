//! Digest and identity utilities
//!
//! Commit hashes and signature placeholders are SHA256 over a canonical
//! JSON serialization. Struct fields serialize in declaration order and every
//! map in the hashed payloads is a `BTreeMap`, so equal content always yields
//! the same digest.

use crate::error::CoreError;
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generate a new opaque unique identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// SHA256 of raw bytes, hex-encoded
pub fn digest(content: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_ref());
    hex::encode(hasher.finalize())
}

/// SHA256 of the canonical JSON form of `value`, hex-encoded
pub fn canonical_digest<T: Serialize + ?Sized>(value: &T) -> Result<String, CoreError> {
    let bytes = serde_json::to_vec(value)?;
    Ok(digest(bytes))
}
