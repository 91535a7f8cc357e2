//! Core types for the dashboard
//!
//! This module defines the typed per-domain records produced at the ingestion
//! boundary, the timestamp representation shared by all sub-daily samples, and
//! the structures decoded out of embedded JSON sub-fields.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::decode::Encoded;

/// Export file a record collection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    DailySleep,
    DailyActivity,
    DailyReadiness,
    DailySpo2,
    DailyStress,
    HeartRate,
    Temperature,
    Session,
    CardiovascularAge,
    SleepModel,
    SleepTime,
}

impl Domain {
    pub const ALL: [Domain; 11] = [
        Domain::DailySleep,
        Domain::DailyActivity,
        Domain::DailyReadiness,
        Domain::DailySpo2,
        Domain::DailyStress,
        Domain::HeartRate,
        Domain::Temperature,
        Domain::Session,
        Domain::CardiovascularAge,
        Domain::SleepModel,
        Domain::SleepTime,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Domain::DailySleep => "dailysleep.csv",
            Domain::DailyActivity => "dailyactivity.csv",
            Domain::DailyReadiness => "dailyreadiness.csv",
            Domain::DailySpo2 => "dailyspo2.csv",
            Domain::DailyStress => "dailystress.csv",
            Domain::HeartRate => "heartrate.csv",
            Domain::Temperature => "temperature.csv",
            Domain::Session => "session.csv",
            Domain::CardiovascularAge => "dailycardiovascularage.csv",
            Domain::SleepModel => "sleepmodel.csv",
            Domain::SleepTime => "sleeptime.csv",
        }
    }

    /// Resolve an uploaded file name; matching ignores directories and case
    pub fn from_file_name(name: &str) -> Option<Domain> {
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        Domain::ALL
            .into_iter()
            .find(|d| d.file_name().eq_ignore_ascii_case(base))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A timestamp as written in the export.
///
/// The wall-clock reading is kept exactly as given; bucketing and display use
/// it without any timezone conversion. The offset, when present, is only used
/// for instant arithmetic such as session durations.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    raw: String,
    local: NaiveDateTime,
    instant: Option<DateTime<FixedOffset>>,
}

const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

impl Timestamp {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();

        let with_offset = DateTime::parse_from_rfc3339(trimmed)
            .or_else(|_| DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .ok();
        if let Some(dt) = with_offset {
            return Some(Self {
                raw: trimmed.to_string(),
                local: dt.naive_local(),
                instant: Some(dt),
            });
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .map(|local| Self {
                raw: trimmed.to_string(),
                local,
                instant: None,
            })
    }

    /// Wall-clock reading in the export's own representation
    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    pub fn date(&self) -> NaiveDate {
        self.local.date()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Minutes elapsed from `earlier` to `self`
    pub fn minutes_since(&self, earlier: &Timestamp) -> f64 {
        let delta = match (self.instant, earlier.instant) {
            (Some(end), Some(start)) => end - start,
            _ => self.local - earlier.local,
        };
        delta.num_milliseconds() as f64 / 60_000.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Parse a calendar day from a `YYYY-MM-DD` prefix
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let prefix = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Records keyed by a calendar day
pub trait Dated {
    fn day(&self) -> NaiveDate;
}

/// Records carrying a sub-day timestamp
pub trait Timestamped {
    fn timestamp(&self) -> &Timestamp;
}

// Decoded sub-field structures

/// Named 0-100 sub-scores explaining a composite daily score
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Option<f64>>")]
pub struct ContributorBreakdown(BTreeMap<String, u8>);

impl From<BTreeMap<String, Option<f64>>> for ContributorBreakdown {
    fn from(raw: BTreeMap<String, Option<f64>>) -> Self {
        let scores = raw
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .filter(|v| v.is_finite())
                    .map(|v| (name, v.round().clamp(0.0, 100.0) as u8))
            })
            .collect();
        Self(scores)
    }
}

impl ContributorBreakdown {
    pub fn score(&self, name: &str) -> Option<u8> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// SpO2 percentage block embedded in daily SpO2 records
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Spo2Percentage {
    pub average: Option<f64>,
}

/// Sampled series embedded in session records
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SampleSeries {
    #[serde(default)]
    pub items: Vec<Option<f64>>,
    pub interval: Option<f64>,
    pub timestamp: Option<String>,
}

/// Optimal bedtime window; offsets are seconds relative to midnight
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BedtimeWindow {
    pub day_tz: Option<i64>,
    pub start_offset: Option<i64>,
    pub end_offset: Option<i64>,
}

// Per-domain records

#[derive(Debug, Clone, Serialize)]
pub struct DailySleep {
    pub id: Option<String>,
    pub day: NaiveDate,
    pub score: Option<f64>,
    pub timestamp: Option<String>,
    pub contributors: Encoded<ContributorBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyActivity {
    pub id: Option<String>,
    pub day: NaiveDate,
    pub score: Option<f64>,
    pub steps: Option<f64>,
    pub total_calories: Option<f64>,
    pub active_calories: Option<f64>,
    pub contributors: Encoded<ContributorBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyReadiness {
    pub id: Option<String>,
    pub day: NaiveDate,
    pub score: Option<f64>,
    pub temperature_deviation: Option<f64>,
    pub contributors: Encoded<ContributorBreakdown>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySpo2 {
    pub id: Option<String>,
    pub day: NaiveDate,
    pub spo2_percentage: Encoded<Spo2Percentage>,
    pub breathing_disturbance_index: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStress {
    pub id: Option<String>,
    pub day: NaiveDate,
    /// Seconds of high stress
    pub stress_high: Option<f64>,
    /// Seconds of high recovery
    pub recovery_high: Option<f64>,
    pub day_summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeartRateSample {
    pub timestamp: Timestamp,
    pub bpm: Option<f64>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemperatureSample {
    pub timestamp: Timestamp,
    pub skin_temp: Option<f64>,
}

/// Mindfulness session kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Meditation,
    Breathing,
    Rest,
    #[serde(untagged)]
    Other(String),
}

impl SessionKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "meditation" => SessionKind::Meditation,
            "breathing" => SessionKind::Breathing,
            "rest" => SessionKind::Rest,
            _ => SessionKind::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SessionKind::Meditation => "meditation",
            SessionKind::Breathing => "breathing",
            SessionKind::Rest => "rest",
            SessionKind::Other(name) => name.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Good,
    Same,
    Bad,
    #[serde(untagged)]
    Other(String),
}

impl Mood {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "good" => Mood::Good,
            "same" => Mood::Same,
            "bad" => Mood::Bad,
            _ => Mood::Other(raw.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MindfulSession {
    pub id: Option<String>,
    pub day: Option<NaiveDate>,
    pub start_datetime: Option<Timestamp>,
    pub end_datetime: Option<Timestamp>,
    #[serde(rename = "type")]
    pub kind: Option<SessionKind>,
    pub mood: Option<Mood>,
    pub heart_rate: Encoded<SampleSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardiovascularAge {
    pub day: NaiveDate,
    pub vascular_age: Option<f64>,
}

/// One detailed sleep period
#[derive(Debug, Clone, Serialize)]
pub struct SleepPeriod {
    pub id: Option<String>,
    pub day: NaiveDate,
    pub bedtime_start: Option<Timestamp>,
    pub bedtime_end: Option<Timestamp>,
    /// Stage durations are in seconds
    pub deep_sleep_duration: Option<f64>,
    pub rem_sleep_duration: Option<f64>,
    pub light_sleep_duration: Option<f64>,
    pub awake_time: Option<f64>,
    pub total_sleep_duration: Option<f64>,
    pub efficiency: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub lowest_heart_rate: Option<f64>,
    pub average_hrv: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SleepTimeRecommendation {
    pub id: Option<String>,
    pub day: NaiveDate,
    pub status: Option<String>,
    pub recommendation: Option<String>,
    pub optimal_bedtime: Encoded<BedtimeWindow>,
}

macro_rules! impl_dated {
    ($($ty:ty),* $(,)?) => {
        $(impl Dated for $ty {
            fn day(&self) -> NaiveDate {
                self.day
            }
        })*
    };
}

impl_dated!(
    DailySleep,
    DailyActivity,
    DailyReadiness,
    DailySpo2,
    DailyStress,
    CardiovascularAge,
    SleepPeriod,
    SleepTimeRecommendation,
);

impl Timestamped for HeartRateSample {
    fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }
}

impl Timestamped for TemperatureSample {
    fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_domain_from_file_name() {
        assert_eq!(
            Domain::from_file_name("dailysleep.csv"),
            Some(Domain::DailySleep)
        );
        assert_eq!(
            Domain::from_file_name("export/HeartRate.csv"),
            Some(Domain::HeartRate)
        );
        assert_eq!(Domain::from_file_name("workout.csv"), None);
    }

    #[test]
    fn test_timestamp_keeps_wall_clock() {
        let ts = Timestamp::parse("2024-01-01T10:05:00+02:00").unwrap();
        assert_eq!(ts.local().to_string(), "2024-01-01 10:05:00");
        assert_eq!(ts.as_str(), "2024-01-01T10:05:00+02:00");

        let naive = Timestamp::parse("2024-01-01T10:05:00").unwrap();
        assert_eq!(naive.local(), ts.local());
        assert!(Timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_minutes_since() {
        let start = Timestamp::parse("2024-01-01T00:00:00").unwrap();
        let end = Timestamp::parse("2024-01-01T00:30:00").unwrap();
        assert_eq!(end.minutes_since(&start), 30.0);

        // Same instant written with different offsets
        let a = Timestamp::parse("2024-01-01T10:00:00+00:00").unwrap();
        let b = Timestamp::parse("2024-01-01T12:15:00+02:00").unwrap();
        assert_eq!(b.minutes_since(&a), 15.0);
    }

    #[test]
    fn test_contributor_scores_are_clamped() {
        let parsed: ContributorBreakdown = serde_json::from_str(
            r#"{"deep_sleep": 85, "latency": 101.4, "timing": null, "efficiency": 72.6}"#,
        )
        .unwrap();
        assert_eq!(parsed.score("deep_sleep"), Some(85));
        assert_eq!(parsed.score("latency"), Some(100));
        assert_eq!(parsed.score("efficiency"), Some(73));
        assert_eq!(parsed.score("timing"), None);
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_parse_day_accepts_datetime_prefix() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_day("2024-01-15"), Some(expected));
        assert_eq!(parse_day("2024-01-15T08:30:00.000Z"), Some(expected));
        assert_eq!(parse_day(""), None);
    }
}
