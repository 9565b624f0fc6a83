//! Runtime half of the opaque map encoding.
//!
//! A map crosses the API boundary as a string scalar: standard base64 (with
//! padding) of the map's UTF-8 JSON object encoding. Keys of non-string types
//! use their JSON object-key form, e.g. `"7"` for an integer key.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapCodecError {
    #[error("Map value is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Map value is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn encode_map<K, V>(map: &BTreeMap<K, V>) -> Result<String, MapCodecError>
where
    K: Serialize + Ord,
    V: Serialize,
{
    let json = serde_json::to_vec(map)?;
    Ok(STANDARD.encode(json))
}

/// Inverse of [`encode_map`]. An empty string decodes to an empty map.
pub fn decode_map<K, V>(encoded: &str) -> Result<BTreeMap<K, V>, MapCodecError>
where
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    if encoded.is_empty() {
        return Ok(BTreeMap::new());
    }
    let json = STANDARD.decode(encoded)?;
    Ok(serde_json::from_slice(&json)?)
}
