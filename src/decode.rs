//! Sub-field decoding
//!
//! Several export columns carry JSON text (contributor breakdowns, the SpO2
//! block, session heart-rate series). They are decoded on first access and the
//! outcome, success or failure, is cached on the record for the lifetime of the
//! loaded store.

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use std::sync::OnceLock;
use tracing::debug;

/// An embedded JSON field with a lazily decoded, cached value
#[derive(Debug, Clone)]
pub struct Encoded<T> {
    raw: Option<String>,
    parsed: OnceLock<Result<T, DecodeError>>,
}

impl<T> Default for Encoded<T> {
    fn default() -> Self {
        Self {
            raw: None,
            parsed: OnceLock::new(),
        }
    }
}

impl<T> Encoded<T> {
    pub fn new(raw: Option<String>) -> Self {
        Self {
            raw,
            parsed: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Whether a decode has already been attempted
    pub fn is_decoded(&self) -> bool {
        self.parsed.get().is_some()
    }
}

impl<T: DeserializeOwned> Encoded<T> {
    /// Decode the field, attempting the parse only once.
    pub fn decode(&self) -> Result<&T, DecodeError> {
        self.parsed
            .get_or_init(|| decode_text(self.raw.as_deref()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The decoded value, or `None` when the field is absent or malformed
    pub fn get(&self) -> Option<&T> {
        self.decode().ok()
    }
}

impl<T> Serialize for Encoded<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.raw {
            Some(raw) => serializer.serialize_str(raw),
            None => serializer.serialize_none(),
        }
    }
}

/// Parse JSON text into `T`
pub fn decode_text<T: DeserializeOwned>(raw: Option<&str>) -> Result<T, DecodeError> {
    let text = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(DecodeError::Missing)?;

    serde_json::from_str(text).map_err(|e| {
        debug!(error = %e, "sub-field decode failed");
        DecodeError::Malformed(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContributorBreakdown, SampleSeries, Spo2Percentage};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_is_idempotent() {
        let field: Encoded<ContributorBreakdown> =
            Encoded::new(Some(r#"{"deep_sleep": 80, "rem_sleep": 65}"#.to_string()));
        assert!(!field.is_decoded());

        let first = field.decode().unwrap().clone();
        let second = field.decode().unwrap();
        assert!(field.is_decoded());
        assert_eq!(&first, second);
        assert_eq!(second.score("rem_sleep"), Some(65));
    }

    #[test]
    fn test_malformed_field_is_absent() {
        let field: Encoded<Spo2Percentage> = Encoded::new(Some("{average: 97".to_string()));
        assert!(matches!(field.decode(), Err(DecodeError::Malformed(_))));
        assert!(field.get().is_none());
        // The failure is cached too
        assert!(matches!(field.decode(), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn test_missing_field() {
        let field: Encoded<SampleSeries> = Encoded::new(None);
        assert_eq!(field.decode().unwrap_err(), DecodeError::Missing);

        let blank: Encoded<SampleSeries> = Encoded::new(Some("  ".to_string()));
        assert_eq!(blank.decode().unwrap_err(), DecodeError::Missing);
    }

    #[test]
    fn test_serializes_raw_text() {
        let field: Encoded<Spo2Percentage> = Encoded::new(Some(r#"{"average":97.5}"#.to_string()));
        assert_eq!(field.get().unwrap().average, Some(97.5));
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#""{\"average\":97.5}""#);
    }
}
