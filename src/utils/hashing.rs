//! Canonical serialization and content hashing for audit records.
//!
//! `serde_json::Map` is ordered by key, so going through `serde_json::Value`
//! gives a stable key order at every nesting level.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::models::AppResult;

/// Serialize with sorted keys and no insignificant whitespace
pub fn canonical_json<T: Serialize>(value: &T) -> AppResult<String> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&value)?)
}

/// SHA-256 of `bytes`, lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Content address of any serializable value
pub fn content_hash<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(sha256_hex(canonical_json(value)?.as_bytes()))
}
