//! Base64 helpers for byte fields in persisted JSON.

use base64::Engine;
use serde::{Deserialize, Deserializer, Serializer};

pub fn encode_base64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

pub fn decode_base64(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(value)
}

/// `#[serde(with = "crate::core::encoding::bytes")]`
pub mod bytes {
    use super::*;

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode_base64(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        decode_base64(&raw).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "crate::core::encoding::key_opt")]` for optional 32-byte keys.
pub mod key_opt {
    use super::*;

    pub fn serialize<S: Serializer>(key: &Option<[u8; 32]>, serializer: S) -> Result<S::Ok, S::Error> {
        match key {
            Some(k) => serializer.serialize_some(&encode_base64(k)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<[u8; 32]>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let bytes = decode_base64(&raw).map_err(serde::de::Error::custom)?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| serde::de::Error::custom(format!("key must be 32 bytes, got {}", b.len())))?;
        Ok(Some(key))
    }
}
