//! Detailed sleep period and bedtime recommendation adapters

use crate::error::IngestError;
use crate::types::{Domain, SleepPeriod, SleepTimeRecommendation};

use super::{get_encoded, get_f64, get_str, get_timestamp, require_day, Attributes, ExportAdapter};

impl ExportAdapter for SleepPeriod {
    const DOMAIN: Domain = Domain::SleepModel;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            id: get_str(attrs, "id"),
            day: require_day(attrs)?,
            bedtime_start: get_timestamp(attrs, "bedtime_start"),
            bedtime_end: get_timestamp(attrs, "bedtime_end"),
            deep_sleep_duration: get_f64(attrs, "deep_sleep_duration"),
            rem_sleep_duration: get_f64(attrs, "rem_sleep_duration"),
            light_sleep_duration: get_f64(attrs, "light_sleep_duration"),
            awake_time: get_f64(attrs, "awake_time"),
            total_sleep_duration: get_f64(attrs, "total_sleep_duration"),
            efficiency: get_f64(attrs, "efficiency"),
            average_heart_rate: get_f64(attrs, "average_heart_rate"),
            lowest_heart_rate: get_f64(attrs, "lowest_heart_rate"),
            average_hrv: get_f64(attrs, "average_hrv"),
        })
    }
}

impl ExportAdapter for SleepTimeRecommendation {
    const DOMAIN: Domain = Domain::SleepTime;

    fn from_attributes(attrs: &Attributes) -> Result<Self, IngestError> {
        Ok(Self {
            id: get_str(attrs, "id"),
            day: require_day(attrs)?,
            status: get_str(attrs, "status"),
            recommendation: get_str(attrs, "recommendation"),
            optimal_bedtime: get_encoded(attrs, "optimal_bedtime"),
        })
    }
}
