//! Helpers for (de)serializing [`U256`] quantities as decimal strings.
//!
//! The transaction service encodes `value` and the gas fields as decimal
//! strings, not JSON numbers or hex quantities.

use alloy::primitives::U256;
use serde::{Deserialize, Deserializer, Serializer};

/// Serializes a [`U256`] as a decimal string.
pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

/// Deserializes a [`U256`] from a decimal string, a JSON number, or `null`
/// (treated as zero).
pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quantity {
        Text(String),
        Number(u64),
        Missing(()),
    }

    match Quantity::deserialize(deserializer)? {
        Quantity::Text(s) => s.parse::<U256>().map_err(serde::de::Error::custom),
        Quantity::Number(n) => Ok(U256::from(n)),
        Quantity::Missing(()) => Ok(U256::ZERO),
    }
}
