//! Sample aggregation
//!
//! Buckets timestamped samples by truncated wall-clock hour or day and
//! computes per-bucket means.

use crate::types::{HeartRateSample, TemperatureSample, Timestamped};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Bucket width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hour,
    Day,
}

impl Granularity {
    /// Truncate a wall-clock reading to the start of its bucket
    pub fn truncate(&self, at: NaiveDateTime) -> NaiveDateTime {
        match self {
            Granularity::Hour => at
                .date()
                .and_time(NaiveTime::from_hms_opt(at.hour(), 0, 0).unwrap_or(NaiveTime::MIN)),
            Granularity::Day => at.date().and_time(NaiveTime::MIN),
        }
    }
}

/// A timestamped sample carrying an optional reading
pub trait Sample: Timestamped {
    fn value(&self) -> Option<f64>;
}

impl Sample for HeartRateSample {
    fn value(&self) -> Option<f64> {
        self.bpm
    }
}

impl Sample for TemperatureSample {
    fn value(&self) -> Option<f64> {
        self.skin_temp
    }
}

/// Mean of the valid samples in one bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: NaiveDateTime,
    pub mean: f64,
    pub count: usize,
}

impl Bucket {
    /// Key rendered as `YYYY-MM-DDTHH:MM:SS` for hourly buckets or `YYYY-MM-DD` for daily
    pub fn label(&self, granularity: Granularity) -> String {
        match granularity {
            Granularity::Hour => self.key.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Granularity::Day => self.key.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Group samples into buckets in ascending key order.
///
/// Samples without a finite value are excluded from both sum and count, so a
/// bucket holding only invalid samples does not appear.
pub fn aggregate<'a, S, I>(samples: I, granularity: Granularity) -> Vec<Bucket>
where
    S: Sample + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut sums: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    let mut skipped = 0usize;

    for sample in samples {
        let Some(value) = sample.value().filter(|v| v.is_finite()) else {
            skipped += 1;
            continue;
        };
        let key = granularity.truncate(sample.timestamp().local());
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    debug!(buckets = sums.len(), skipped, ?granularity, "aggregated samples");

    sums.into_iter()
        .map(|(key, (sum, count))| Bucket {
            key,
            mean: sum / count as f64,
            count,
        })
        .collect()
}
