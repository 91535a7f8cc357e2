//! Headline statistics across every loaded domain

use crate::features::mean_of;
use crate::store::RecordStore;
use crate::types::Dated;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;

/// Stress summaries listed in the overview
const RECENT_STRESS_DAYS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOverview {
    pub days: usize,
    pub average: Option<f64>,
    pub latest_day: Option<NaiveDate>,
    pub latest_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityOverview {
    pub days: usize,
    pub average_steps: Option<f64>,
    pub average_calories: Option<f64>,
    pub latest_day: Option<NaiveDate>,
    pub latest_steps: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartRateOverview {
    pub measurements: usize,
    pub average_bpm: Option<f64>,
}

/// Per-domain summary of a record store; domains without data are `None`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreOverview {
    pub sleep: Option<ScoreOverview>,
    pub activity: Option<ActivityOverview>,
    pub readiness: Option<ScoreOverview>,
    pub heart_rate: Option<HeartRateOverview>,
    pub spo2_measurements: Option<usize>,
    pub recent_stress: Vec<String>,
}

fn latest<T: Dated>(records: &[T]) -> Option<&T> {
    records.iter().max_by_key(|r| r.day())
}

fn scores<T: Dated>(records: &[T], score: fn(&T) -> Option<f64>) -> Option<ScoreOverview> {
    let newest = latest(records)?;
    Some(ScoreOverview {
        days: records.len(),
        average: mean_of(records.iter().map(score)),
        latest_day: Some(newest.day()),
        latest_score: score(newest),
    })
}

impl StoreOverview {
    pub fn from_store(store: &RecordStore) -> Self {
        let activity = latest(store.activity()).map(|newest| ActivityOverview {
            days: store.activity().len(),
            average_steps: mean_of(store.activity().iter().map(|a| a.steps)),
            average_calories: mean_of(store.activity().iter().map(|a| a.total_calories)),
            latest_day: Some(newest.day),
            latest_steps: newest.steps,
        });

        let heart_rate = (!store.heart_rate().is_empty()).then(|| HeartRateOverview {
            measurements: store.heart_rate().len(),
            average_bpm: mean_of(store.heart_rate().iter().map(|s| s.bpm)),
        });

        let mut stress: Vec<_> = store
            .stress()
            .iter()
            .filter_map(|s| s.day_summary.as_ref().map(|summary| (s.day, summary.clone())))
            .collect();
        stress.sort_by_key(|(day, _)| *day);
        let skip = stress.len().saturating_sub(RECENT_STRESS_DAYS);
        let recent_stress = stress.into_iter().skip(skip).map(|(_, s)| s).collect();

        Self {
            sleep: scores(store.sleep(), |s| s.score),
            activity,
            readiness: scores(store.readiness(), |r| r.score),
            heart_rate,
            spo2_measurements: (!store.spo2().is_empty()).then(|| store.spo2().len()),
            recent_stress,
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Plain-text rendering, one domain per line
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let na = |v: Option<f64>, decimals: usize| match v {
            Some(v) => format!("{v:.decimals$}"),
            None => "N/A".to_string(),
        };
        let day = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "N/A".to_string());

        if let Some(sleep) = &self.sleep {
            let _ = writeln!(out, "Sleep: {} nights, avg score {}", sleep.days, na(sleep.average, 1));
            let _ = writeln!(out, "  Latest: {} - Score: {}", day(sleep.latest_day), na(sleep.latest_score, 0));
        }
        if let Some(activity) = &self.activity {
            let _ = writeln!(
                out,
                "Activity: {} days, avg {} steps, {} calories",
                activity.days,
                na(activity.average_steps, 0),
                na(activity.average_calories, 0)
            );
            let _ = writeln!(
                out,
                "  Latest: {} - {} steps",
                day(activity.latest_day),
                na(activity.latest_steps, 0)
            );
        }
        if let Some(readiness) = &self.readiness {
            let _ = writeln!(out, "Readiness: avg score {}", na(readiness.average, 1));
            let _ = writeln!(
                out,
                "  Latest: {} - Score: {}",
                day(readiness.latest_day),
                na(readiness.latest_score, 0)
            );
        }
        if !self.recent_stress.is_empty() {
            let _ = writeln!(out, "Stress: Recent days - {}", self.recent_stress.join(", "));
        }
        if let Some(count) = self.spo2_measurements {
            let _ = writeln!(out, "SpO2: {count} measurements tracked");
        }
        if let Some(hr) = &self.heart_rate {
            let _ = writeln!(out, "Heart Rate: {} measurements, avg {} bpm", hr.measurements, na(hr.average_bpm, 0));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::store;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_overview_text() {
        let store = store(json!({
            "dailysleep.csv": [
                {"day": "2024-01-02", "score": 80},
                {"day": "2024-01-01", "score": 71}
            ],
            "dailyactivity.csv": [
                {"day": "2024-01-01", "steps": 8000, "total_calories": 2200},
                {"day": "2024-01-02", "steps": 10000}
            ],
            "heartrate.csv": [
                {"timestamp": "2024-01-01T10:05:00", "bpm": 60},
                {"timestamp": "2024-01-01T10:40:00", "bpm": 70}
            ],
            "dailystress.csv": [
                {"day": "2024-01-02", "day_summary": "restored"},
                {"day": "2024-01-01", "day_summary": "stressful"},
                {"day": "2024-01-03"}
            ]
        }));
        let overview = StoreOverview::from_store(&store);
        assert_eq!(overview.readiness, None);
        assert_eq!(
            overview.to_text(),
            "Sleep: 2 nights, avg score 75.5\n  Latest: 2024-01-02 - Score: 80\n\
             Activity: 2 days, avg 9000 steps, 2200 calories\n  Latest: 2024-01-02 - 10000 steps\n\
             Stress: Recent days - stressful, restored\n\
             Heart Rate: 2 measurements, avg 65 bpm\n"
        );
    }

    #[test]
    fn test_empty_store_has_empty_overview() {
        let overview = StoreOverview::from_store(&RecordStore::default());
        assert!(overview.is_empty());
        assert_eq!(overview.to_text(), "");
    }

    #[test]
    fn test_recent_stress_keeps_last_five() {
        let rows: Vec<_> = (1..=7)
            .map(|d| json!({"day": format!("2024-01-{d:02}"), "day_summary": format!("d{d}")}))
            .collect();
        let overview = StoreOverview::from_store(&store(json!({ "dailystress.csv": rows })));
        assert_eq!(overview.recent_stress, vec!["d3", "d4", "d5", "d6", "d7"]);
    }
}
