//! Sleep tab: daily sleep score trend with a contributor breakdown per night

use super::{
    contributor_cards, day_axis, detail_panel, find_clicked, find_selected, header, ContributorSpec,
    Tab, TabView,
};
use crate::chart::{Axis, ChartClick, ChartSpec, Layout, Marker, Trace, ROYAL};
use crate::store::RecordStore;
use crate::types::DailySleep;
use crate::window::{filter, Window};
use chrono::NaiveDate;

pub const CHART: &str = "sleep-chart";

const CONTRIBUTORS: [ContributorSpec; 7] = [
    ContributorSpec {
        key: "deep_sleep",
        label: "Deep Sleep",
        description: "Restorative sleep phase",
    },
    ContributorSpec {
        key: "rem_sleep",
        label: "REM Sleep",
        description: "Dream & memory consolidation",
    },
    ContributorSpec {
        key: "efficiency",
        label: "Efficiency",
        description: "Time asleep vs in bed",
    },
    ContributorSpec {
        key: "latency",
        label: "Latency",
        description: "Time to fall asleep",
    },
    ContributorSpec {
        key: "restfulness",
        label: "Restfulness",
        description: "Sleep disruptions",
    },
    ContributorSpec {
        key: "timing",
        label: "Timing",
        description: "Schedule consistency",
    },
    ContributorSpec {
        key: "total_sleep",
        label: "Total Sleep",
        description: "Duration of sleep",
    },
];

pub fn build(store: &RecordStore, window: Window, selected: Option<NaiveDate>) -> TabView {
    if store.sleep().is_empty() {
        return TabView::placeholder(Tab::Sleep, "No sleep data available");
    }
    let nights = filter(store.sleep(), window);

    let trace = Trace::line(
        "Sleep Score",
        day_axis(nights.iter().copied()),
        nights.iter().map(|n| n.score).collect(),
        ROYAL,
    )
    .with_marker(Marker::color(ROYAL).sized(8.0))
    .with_hover("<b>%{x}</b><br>Sleep Score: %{y}<extra></extra>");
    let layout = Layout::new("Sleep Quality Trend", Axis::category(""), Axis::titled("Score").with_range(0.0, 100.0));

    let detail = find_selected(&nights, selected)
        .map(|night| (night.day, contributor_cards(night.contributors.decode(), &CONTRIBUTORS)));

    let html = format!(
        r#"<div class="chart-container">
{}
<div id="{CHART}"></div>
<p class="text-xs text-gray-500 mt-3">Click on any point to view detailed breakdown</p>
</div>
{}"#,
        header(Tab::Sleep, "Sleep Quality Trend", window),
        detail_panel("sleep", "Sleep Breakdown", 4, detail)
    );

    TabView::new(Tab::Sleep, html, vec![ChartSpec::new(CHART, vec![trace], layout)])
}

pub fn select(store: &RecordStore, window: Window, click: &ChartClick) -> Option<NaiveDate> {
    if click.mount != CHART {
        return None;
    }
    let nights = filter(store.sleep(), window);
    find_clicked::<DailySleep>(&nights, click).map(|n| n.day)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::store;
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_store() -> RecordStore {
        store(json!({
            "dailysleep.csv": [
                {"day": "2024-01-01", "score": 70, "contributors": "{\"deep_sleep\": 90, \"timing\": 55}"},
                {"day": "2024-01-02", "score": 80, "contributors": "{\"deep_sleep\": 65}"},
                {"day": "2024-01-03", "score": 90, "contributors": "not json"}
            ]
        }))
    }

    #[test]
    fn test_window_of_two_plots_last_two_nights() {
        let view = build(&sample_store(), Window::days(2), None);
        assert!(!view.empty);
        assert_eq!(view.charts.len(), 1);
        let trace = &view.charts[0].data[0];
        assert_eq!(trace.x, vec![json!("2024-01-02"), json!("2024-01-03")]);
        assert_eq!(trace.y, vec![Some(80.0), Some(90.0)]);
        assert!(view.html.contains(r#"id="sleep-detail-view" class="detail-view hidden""#));
    }

    #[test]
    fn test_click_selects_night_and_renders_cards() {
        let store = sample_store();
        let click = ChartClick::new(CHART, "2024-01-01");
        let day = select(&store, Window::All, &click).unwrap();
        let view = build(&store, Window::All, Some(day));
        assert!(view.html.contains("Jan 1, 2024"));
        assert!(view.html.contains("Deep Sleep"));
        assert!(view.html.contains(r#"style="width: 90%""#));
        assert_eq!(view.html.matches("stat-card").count(), 7);
    }

    #[test]
    fn test_click_outside_window_is_ignored() {
        let store = sample_store();
        let click = ChartClick::new(CHART, "2024-01-01");
        assert_eq!(select(&store, Window::days(2), &click), None);
        assert_eq!(select(&store, Window::All, &ChartClick::new("steps-chart", "2024-01-01")), None);
    }

    #[test]
    fn test_malformed_contributors_degrade_detail_only() {
        let store = sample_store();
        let day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let view = build(&store, Window::All, Some(day));
        assert!(view.html.contains(super::super::NO_CONTRIBUTORS));
        assert_eq!(view.charts.len(), 1);
    }

    #[test]
    fn test_no_sleep_data() {
        let view = build(&RecordStore::default(), Window::default(), None);
        assert!(view.empty);
        assert!(view.charts.is_empty());
        assert!(view.html.contains("No sleep data available"));
    }
}
