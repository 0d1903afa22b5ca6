//! FIPE provider abstractions and implementations.
//!
//! This module contains:
//! - The `FipeProvider` trait that all providers implement
//! - Serde helpers shared by provider schemas
//! - Concrete provider implementations (Parallelum v1 and v2)
//!
//! # Schema normalization
//!
//! The two API versions disagree on field names (`codigo`/`code`,
//! `Valor`/`price`), on envelope shape (models wrapped in an object in v1, a
//! bare array in v2) and on scalar types (model codes and model years may be
//! numbers or strings). Each provider owns its raw schema and maps it onto
//! the canonical models, so nothing above this module ever sees a
//! provider-specific shape.

mod traits;

pub mod parallelum_v1;
pub mod parallelum_v2;

pub use parallelum_v1::ParallelumV1;
pub use parallelum_v2::ParallelumV2;
pub use traits::FipeProvider;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::errors::FetchError;
use crate::models::ResourceKind;

/// Decodes a raw value into a provider schema type.
pub(crate) fn decode<T: DeserializeOwned>(provider: &str, raw: Value) -> Result<T, FetchError> {
    serde_json::from_value(raw)
        .map_err(|e| FetchError::ParseError(format!("{} schema mismatch: {}", provider, e)))
}

/// Rejects empty lists.
pub(crate) fn non_empty<T>(items: Vec<T>, kind: ResourceKind) -> Result<Vec<T>, FetchError> {
    if items.is_empty() {
        Err(FetchError::NoData(kind))
    } else {
        Ok(items)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Text(String),
}

impl NumberOrString {
    fn into_i64(self) -> Result<i64, String> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| format!("expected a number, got {:?}", s)),
        }
    }
}

/// Accepts `5940` or `"5940"`.
pub(crate) fn u64_from_any<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberOrString::deserialize(deserializer)?
        .into_i64()
        .map_err(serde::de::Error::custom)?;
    u64::try_from(value).map_err(serde::de::Error::custom)
}

/// Accepts `2023` or `"2023"`.
pub(crate) fn i32_from_any<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberOrString::deserialize(deserializer)?
        .into_i64()
        .map_err(serde::de::Error::custom)?;
    i32::try_from(value).map_err(serde::de::Error::custom)
}

/// Accepts `1` or `"1"`.
pub(crate) fn u8_from_any<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = NumberOrString::deserialize(deserializer)?
        .into_i64()
        .map_err(serde::de::Error::custom)?;
    u8::try_from(value).map_err(serde::de::Error::custom)
}

/// Accepts `"59"` or `59`, yielding a string code.
pub(crate) fn string_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct LenientRow {
        #[serde(deserialize_with = "u64_from_any")]
        code: u64,
        #[serde(deserialize_with = "string_from_any")]
        label: String,
    }

    #[test]
    fn test_number_or_string_both_decode() {
        let a: LenientRow = serde_json::from_value(json!({"code": 5940, "label": 7})).unwrap();
        let b: LenientRow = serde_json::from_value(json!({"code": "5940", "label": "7"})).unwrap();
        assert_eq!(a.code, b.code);
        assert_eq!(a.label, b.label);
    }

    #[test]
    fn test_non_numeric_string_is_rejected() {
        let result: Result<LenientRow, _> =
            serde_json::from_value(json!({"code": "abc", "label": ""}));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_empty_reports_kind() {
        let result = non_empty(Vec::<u8>::new(), ResourceKind::Models);
        assert_eq!(result.unwrap_err(), FetchError::NoData(ResourceKind::Models));
    }
}
