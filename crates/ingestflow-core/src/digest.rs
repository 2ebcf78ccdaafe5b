//! Canonical JSON and SHA-256 digests for declarations.
//!
//! Two structurally equal definitions must always produce the same digest,
//! so object keys are emitted in sorted order regardless of how the map that
//! produced them was built.

use crate::error::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

fn sorted(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = serde_json::Map::new();
            for key in keys {
                out.insert(key.clone(), sorted(&map[key]));
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(sorted).collect())
        }
        other => other.clone(),
    }
}

/// Compact JSON with recursively sorted object keys.
pub fn canonical_json(value: &serde_json::Value) -> Result<String> {
    Ok(serde_json::to_string(&sorted(value))?)
}

/// SHA-256 hex digest of the canonical JSON form of `value`.
pub fn digest_of<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_value(value)?;
    let canonical = canonical_json(&json)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}
