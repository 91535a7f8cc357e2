//! Export row adapters
//!
//! Each uploaded file arrives as a list of flat attribute maps (one per CSV
//! row). Adapters validate those rows into typed per-domain records. Rows
//! missing a required key are skipped with a warning; every other attribute is
//! optional.

mod daily;
mod samples;
mod sessions;
mod sleep;

use crate::decode::Encoded;
use crate::error::IngestError;
use crate::types::{parse_day, Domain, Timestamp};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, warn};

/// One parsed CSV row
pub type Attributes = serde_json::Map<String, Value>;

/// Trait for converting export rows into typed records
pub trait ExportAdapter: Sized {
    /// File the rows come from
    const DOMAIN: Domain;

    /// Validate a single row
    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError>;
}

/// Convert all rows of a file, skipping the ones that fail validation
pub fn adapt_rows<T: ExportAdapter>(rows: &[Attributes]) -> Vec<T> {
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match T::from_attributes(row) {
            Ok(record) => records.push(record),
            Err(e) => warn!(domain = %T::DOMAIN, row = index, error = %e, "skipping row"),
        }
    }
    debug!(
        domain = %T::DOMAIN,
        rows = rows.len(),
        kept = records.len(),
        "adapted export rows"
    );
    records
}

/// Numeric attribute; accepts JSON numbers and numeric strings
pub(crate) fn get_f64(attrs: &Attributes, key: &str) -> Option<f64> {
    let value = match attrs.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

/// Non-empty text attribute
pub(crate) fn get_str(attrs: &Attributes, key: &str) -> Option<String> {
    match attrs.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Embedded JSON attribute; objects already expanded by the backend are
/// re-serialised so decoding goes through one path
pub(crate) fn get_encoded<T>(attrs: &Attributes, key: &str) -> Encoded<T> {
    let raw = match attrs.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(v @ (Value::Object(_) | Value::Array(_))) => Some(v.to_string()),
        _ => None,
    };
    Encoded::new(raw)
}

pub(crate) fn get_timestamp(attrs: &Attributes, key: &str) -> Option<Timestamp> {
    get_str(attrs, key).and_then(|s| Timestamp::parse(&s))
}

pub(crate) fn get_day(attrs: &Attributes, key: &str) -> Option<NaiveDate> {
    get_str(attrs, key).and_then(|s| parse_day(&s))
}

/// The `day` key every daily record is indexed by
pub(crate) fn require_day(attrs: &Attributes) -> Result<NaiveDate, IngestError> {
    let raw = get_str(attrs, "day").ok_or(IngestError::MissingField("day"))?;
    parse_day(&raw).ok_or(IngestError::InvalidField {
        field: "day",
        value: raw,
    })
}

pub(crate) fn require_timestamp(attrs: &Attributes) -> Result<Timestamp, IngestError> {
    let raw = get_str(attrs, "timestamp").ok_or(IngestError::MissingField("timestamp"))?;
    Timestamp::parse(&raw).ok_or(IngestError::InvalidField {
        field: "timestamp",
        value: raw,
    })
}

#[cfg(test)]
pub(crate) fn row(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        other => panic!("test row must be an object, got {other}"),
    }
}
