//! Helpers for deserializing `u64` fields the service encodes inconsistently.
//!
//! Nonce and gas figures arrive as JSON numbers from some service versions and
//! as decimal strings from others.

use serde::{Deserialize, Deserializer, Serializer};

/// Serializes a `u64` as a JSON number.
pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(*value)
}

/// Deserializes a `u64` from a JSON number, a decimal string, or `null`
/// (treated as zero).
pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(u64),
        Text(String),
        Missing(()),
    }

    match Lenient::deserialize(deserializer)? {
        Lenient::Number(n) => Ok(n),
        Lenient::Text(s) => s.parse().map_err(serde::de::Error::custom),
        Lenient::Missing(()) => Ok(0),
    }
}
