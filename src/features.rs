//! Derived metrics
//!
//! Pure computations over records, recomputed on demand:
//! - Session duration and total minutes
//! - Means over optional series
//! - Min/max/mean summaries
//! - Per-kind session tallies

use crate::types::{MindfulSession, SessionKind, Timestamp};
use serde::Serialize;
use std::collections::BTreeMap;

/// Minutes between two timestamps; `None` when either end is missing
pub fn session_duration_minutes(start: Option<&Timestamp>, end: Option<&Timestamp>) -> Option<f64> {
    match (start, end) {
        (Some(start), Some(end)) => Some(end.minutes_since(start)),
        _ => None,
    }
}

/// Arithmetic mean of the finite entries; `None` when there are none
pub fn mean_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Min, max and mean over a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl SeriesSummary {
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut summary: Option<SeriesSummary> = None;
        let mut sum = 0.0;

        for v in values.into_iter().flatten().filter(|v| v.is_finite()) {
            sum += v;
            summary = Some(match summary {
                None => SeriesSummary {
                    min: v,
                    max: v,
                    mean: v,
                    count: 1,
                },
                Some(s) => SeriesSummary {
                    min: s.min.min(v),
                    max: s.max.max(v),
                    mean: s.mean,
                    count: s.count + 1,
                },
            });
        }

        summary.map(|s| SeriesSummary {
            mean: sum / s.count as f64,
            ..s
        })
    }
}

impl MindfulSession {
    pub fn duration_minutes(&self) -> Option<f64> {
        session_duration_minutes(self.start_datetime.as_ref(), self.end_datetime.as_ref())
    }

    /// Mean of the non-null heart-rate series entries
    pub fn average_heart_rate(&self) -> Option<f64> {
        let series = self.heart_rate.get()?;
        mean_of(series.items.iter().copied())
    }
}

/// Sum of defined session durations
pub fn total_minutes<'a, I>(sessions: I) -> f64
where
    I: IntoIterator<Item = &'a MindfulSession>,
{
    sessions
        .into_iter()
        .filter_map(MindfulSession::duration_minutes)
        .sum()
}

/// Session counts and minutes per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionTally {
    pub sessions: usize,
    /// Sessions with both endpoints present
    pub timed_sessions: usize,
    pub total_minutes: f64,
    pub by_kind: BTreeMap<String, usize>,
}

impl SessionTally {
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a MindfulSession>,
    {
        let mut tally = SessionTally::default();
        for session in sessions {
            tally.sessions += 1;
            if let Some(minutes) = session.duration_minutes() {
                tally.timed_sessions += 1;
                tally.total_minutes += minutes;
            }
            let kind = session
                .kind
                .as_ref()
                .map(SessionKind::as_str)
                .unwrap_or("unknown");
            *tally.by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
        tally
    }

    /// Mean duration over timed sessions
    pub fn average_minutes(&self) -> Option<f64> {
        (self.timed_sessions > 0).then(|| self.total_minutes / self.timed_sessions as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Encoded;
    use pretty_assertions::assert_eq;

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    fn session(start: Option<&str>, end: Option<&str>, kind: &str, hr: Option<&str>) -> MindfulSession {
        MindfulSession {
            id: None,
            day: None,
            start_datetime: start.map(ts),
            end_datetime: end.map(ts),
            kind: Some(SessionKind::parse(kind)),
            mood: None,
            heart_rate: Encoded::new(hr.map(str::to_string)),
        }
    }

    #[test]
    fn test_thirty_minute_session() {
        let start = ts("2024-01-01T00:00:00");
        let end = ts("2024-01-01T00:30:00");
        assert_eq!(session_duration_minutes(Some(&start), Some(&end)), Some(30.0));
    }

    #[test]
    fn test_missing_endpoint_is_absent_not_zero() {
        let start = ts("2024-01-01T00:00:00");
        assert_eq!(session_duration_minutes(Some(&start), None), None);
        assert_eq!(session_duration_minutes(None, Some(&start)), None);
    }

    #[test]
    fn test_mean_of_skips_nulls() {
        assert_eq!(mean_of(vec![Some(60.0), None, Some(70.0)]), Some(65.0));
        assert_eq!(mean_of(vec![None, Some(f64::NAN)]), None);
        assert_eq!(mean_of(Vec::<Option<f64>>::new()), None);
        assert_eq!(mean_of(vec![Some(0.0)]), Some(0.0));
    }

    #[test]
    fn test_series_summary() {
        let summary = SeriesSummary::from_values(vec![Some(20.0), None, Some(16.0), Some(24.0)]).unwrap();
        assert_eq!(
            summary,
            SeriesSummary {
                min: 16.0,
                max: 24.0,
                mean: 20.0,
                count: 3
            }
        );
        assert!(SeriesSummary::from_values(vec![None]).is_none());
    }

    #[test]
    fn test_total_minutes_ignores_untimed_sessions() {
        let sessions = vec![
            session(Some("2024-01-01T00:00:00"), Some("2024-01-01T00:30:00"), "meditation", None),
            session(Some("2024-01-02T07:00:00"), None, "breathing", None),
            session(Some("2024-01-03T21:00:00"), Some("2024-01-03T21:10:00"), "meditation", None),
        ];
        assert_eq!(total_minutes(&sessions), 40.0);

        let tally = SessionTally::from_sessions(&sessions);
        assert_eq!(tally.sessions, 3);
        assert_eq!(tally.timed_sessions, 2);
        assert_eq!(tally.average_minutes(), Some(20.0));
        assert_eq!(tally.by_kind.get("meditation"), Some(&2));
        assert_eq!(tally.by_kind.get("breathing"), Some(&1));
    }

    #[test]
    fn test_session_average_heart_rate() {
        let s = session(None, None, "rest", Some(r#"{"interval": 5, "items": [60, null, 64]}"#));
        assert_eq!(s.average_heart_rate(), Some(62.0));

        let broken = session(None, None, "rest", Some("not json"));
        assert_eq!(broken.average_heart_rate(), None);
    }
}
