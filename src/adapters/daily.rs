//! Daily score adapters
//!
//! Sleep, activity, readiness, SpO2, stress and cardiovascular age exports
//! all carry one row per calendar day.

use crate::error::IngestError;
use crate::types::{
    CardiovascularAge, DailyActivity, DailyReadiness, DailySleep, DailySpo2, DailyStress, Domain,
};

use super::{get_encoded, get_f64, get_str, require_day, Attributes, ExportAdapter};

impl ExportAdapter for DailySleep {
    const DOMAIN: Domain = Domain::DailySleep;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            id: get_str(attrs, "id"),
            day: require_day(attrs)?,
            score: get_f64(attrs, "score"),
            timestamp: get_str(attrs, "timestamp"),
            contributors: get_encoded(attrs, "contributors"),
        })
    }
}

impl ExportAdapter for DailyActivity {
    const DOMAIN: Domain = Domain::DailyActivity;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            id: get_str(attrs, "id"),
            day: require_day(attrs)?,
            score: get_f64(attrs, "score"),
            steps: get_f64(attrs, "steps"),
            total_calories: get_f64(attrs, "total_calories"),
            active_calories: get_f64(attrs, "active_calories"),
            contributors: get_encoded(attrs, "contributors"),
        })
    }
}

impl ExportAdapter for DailyReadiness {
    const DOMAIN: Domain = Domain::DailyReadiness;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            id: get_str(attrs, "id"),
            day: require_day(attrs)?,
            score: get_f64(attrs, "score"),
            temperature_deviation: get_f64(attrs, "temperature_deviation"),
            contributors: get_encoded(attrs, "contributors"),
        })
    }
}

impl ExportAdapter for DailySpo2 {
    const DOMAIN: Domain = Domain::DailySpo2;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            id: get_str(attrs, "id"),
            day: require_day(attrs)?,
            spo2_percentage: get_encoded(attrs, "spo2_percentage"),
            breathing_disturbance_index: get_f64(attrs, "breathing_disturbance_index"),
        })
    }
}

impl ExportAdapter for DailyStress {
    const DOMAIN: Domain = Domain::DailyStress;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            id: get_str(attrs, "id"),
            day: require_day(attrs)?,
            stress_high: get_f64(attrs, "stress_high"),
            recovery_high: get_f64(attrs, "recovery_high"),
            day_summary: get_str(attrs, "day_summary"),
        })
    }
}

impl ExportAdapter for CardiovascularAge {
    const DOMAIN: Domain = Domain::CardiovascularAge;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            day: require_day(attrs)?,
            vascular_age: get_f64(attrs, "vascular_age"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::row;
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_activity_row() {
        let attrs = row(json!({
            "id": "a1",
            "day": "2024-03-02",
            "score": "88",
            "steps": 10432,
            "total_calories": "2450",
            "active_calories": null,
            "contributors": "{\"stay_active\": 90, \"recovery_time\": 100}"
        }));
        let record = DailyActivity::from_attributes(&attrs).unwrap();
        assert_eq!(record.day.to_string(), "2024-03-02");
        assert_eq!(record.steps, Some(10432.0));
        assert_eq!(record.total_calories, Some(2450.0));
        assert_eq!(record.active_calories, None);
        let contributors = record.contributors.get().unwrap();
        assert_eq!(contributors.score("recovery_time"), Some(100));
    }

    #[test]
    fn test_spo2_row_keeps_malformed_block_lazy() {
        let attrs = row(json!({"day": "2024-03-02", "spo2_percentage": "{average"}));
        let record = DailySpo2::from_attributes(&attrs).unwrap();
        assert!(!record.spo2_percentage.is_decoded());
        assert!(record.spo2_percentage.get().is_none());
    }

    #[test]
    fn test_stress_row() {
        let attrs = row(json!({
            "day": "2024-03-02",
            "stress_high": 5400,
            "recovery_high": "1800",
            "day_summary": "restored"
        }));
        let record = DailyStress::from_attributes(&attrs).unwrap();
        assert_eq!(record.stress_high, Some(5400.0));
        assert_eq!(record.recovery_high, Some(1800.0));
        assert_eq!(record.day_summary.as_deref(), Some("restored"));
    }

    #[test]
    fn test_cardiovascular_requires_day() {
        let attrs = row(json!({"vascular_age": 31}));
        assert_eq!(
            CardiovascularAge::from_attributes(&attrs).unwrap_err(),
            IngestError::MissingField("day")
        );
    }
}
