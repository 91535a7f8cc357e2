//! Sub-daily sample adapters

use crate::error::IngestError;
use crate::types::{Domain, HeartRateSample, TemperatureSample};

use super::{get_f64, get_str, require_timestamp, Attributes, ExportAdapter};

impl ExportAdapter for HeartRateSample {
    const DOMAIN: Domain = Domain::HeartRate;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            timestamp: require_timestamp(attrs)?,
            bpm: get_f64(attrs, "bpm"),
            source: get_str(attrs, "source"),
        })
    }
}

impl ExportAdapter for TemperatureSample {
    const DOMAIN: Domain = Domain::Temperature;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            timestamp: require_timestamp(attrs)?,
            skin_temp: get_f64(attrs, "skin_temp"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::{adapt_rows, row};
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_heart_rate_rows() {
        let rows = vec![
            row(json!({"timestamp": "2024-01-01T10:05:00+00:00", "bpm": "60", "source": "awake"})),
            row(json!({"timestamp": "", "bpm": 61})),
            row(json!({"timestamp": "2024-01-01T10:40:00+00:00", "bpm": null})),
        ];
        let samples: Vec<HeartRateSample> = adapt_rows(&rows);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].bpm, Some(60.0));
        assert_eq!(samples[1].bpm, None);
    }

    #[test]
    fn test_temperature_row_with_bad_timestamp() {
        let attrs = row(json!({"timestamp": "noon", "skin_temp": 33.2}));
        assert!(matches!(
            TemperatureSample::from_attributes(&attrs),
            Err(IngestError::InvalidField {
                field: "timestamp",
                ..
            })
        ));
    }
}
