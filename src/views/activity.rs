//! Activity tab: steps and calories with a contributor breakdown per day

use super::{
    contributor_cards, day_axis, detail_panel, find_clicked, find_selected, header, ContributorSpec,
    Tab, TabView,
};
use crate::chart::{Axis, ChartClick, ChartSpec, Layout, Trace, GREEN, ROYAL};
use crate::store::RecordStore;
use crate::types::DailyActivity;
use crate::window::{filter, Window};
use chrono::NaiveDate;

pub const STEPS_CHART: &str = "steps-chart";
pub const CALORIES_CHART: &str = "calories-chart";

const CONTRIBUTORS: [ContributorSpec; 5] = [
    ContributorSpec {
        key: "stay_active",
        label: "Stay Active",
        description: "Movement throughout day",
    },
    ContributorSpec {
        key: "move_every_hour",
        label: "Move Every Hour",
        description: "Hourly movement",
    },
    ContributorSpec {
        key: "meet_daily_targets",
        label: "Meet Daily Targets",
        description: "Goal achievement",
    },
    ContributorSpec {
        key: "training_volume",
        label: "Training Volume",
        description: "Exercise intensity",
    },
    ContributorSpec {
        key: "recovery_time",
        label: "Recovery Time",
        description: "Rest periods",
    },
];

pub fn build(store: &RecordStore, window: Window, selected: Option<NaiveDate>) -> TabView {
    if store.activity().is_empty() {
        return TabView::placeholder(Tab::Activity, "No activity data available");
    }
    let days = filter(store.activity(), window);
    let x = day_axis(days.iter().copied());

    let steps = ChartSpec::new(
        STEPS_CHART,
        vec![Trace::bar("Steps", x.clone(), days.iter().map(|d| d.steps).collect(), ROYAL)
            .with_hover("<b>%{x}</b><br>Steps: %{y:,}<extra></extra>")],
        Layout::new("Daily Steps", Axis::category(""), Axis::titled("Steps")),
    );
    let calories = ChartSpec::new(
        CALORIES_CHART,
        vec![
            Trace::area("Total", x.clone(), days.iter().map(|d| d.total_calories).collect(), ROYAL),
            Trace::area("Active", x, days.iter().map(|d| d.active_calories).collect(), GREEN),
        ],
        Layout::new("Calories Burned", Axis::category(""), Axis::titled("Calories")).with_legend(),
    );

    let detail = find_selected(&days, selected)
        .map(|day| (day.day, contributor_cards(day.contributors.decode(), &CONTRIBUTORS)));

    let html = format!(
        r#"{}
<div class="grid grid-cols-1 lg:grid-cols-2 gap-4 mb-6">
    <div class="chart-container">
        <div id="{STEPS_CHART}"></div>
        <p class="text-xs text-gray-500 mt-3">Click on any bar to view detailed breakdown</p>
    </div>
    <div class="chart-container">
        <div id="{CALORIES_CHART}"></div>
    </div>
</div>
{}"#,
        header(Tab::Activity, "Activity Overview", window),
        detail_panel("activity", "Activity Breakdown", 5, detail)
    );

    TabView::new(Tab::Activity, html, vec![steps, calories])
}

/// Both charts share the same days, so either can drive the detail view
pub fn select(store: &RecordStore, window: Window, click: &ChartClick) -> Option<NaiveDate> {
    if click.mount != STEPS_CHART && click.mount != CALORIES_CHART {
        return None;
    }
    let days = filter(store.activity(), window);
    find_clicked::<DailyActivity>(&days, click).map(|d| d.day)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::store;
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_store() -> RecordStore {
        store(json!({
            "dailyactivity.csv": [
                {"day": "2024-02-01", "steps": 8000, "total_calories": 2300, "active_calories": 400,
                 "contributors": "{\"stay_active\": 85, \"move_every_hour\": 100, \"recovery_time\": 40}"},
                {"day": "2024-02-02", "steps": "12000", "total_calories": 2600, "active_calories": null}
            ]
        }))
    }

    #[test]
    fn test_two_charts_for_window() {
        let view = build(&sample_store(), Window::days(10), None);
        assert_eq!(view.charts.len(), 2);
        assert_eq!(view.charts[0].mount, STEPS_CHART);
        assert_eq!(view.charts[0].data[0].y, vec![Some(8000.0), Some(12000.0)]);
        assert_eq!(view.charts[1].data[1].y, vec![Some(400.0), None]);
        assert!(view.html.contains(r#"id="activity-time-range""#));
    }

    #[test]
    fn test_calorie_click_opens_breakdown() {
        let store = sample_store();
        let day = select(&store, Window::days(10), &ChartClick::new(CALORIES_CHART, "2024-02-01")).unwrap();
        let view = build(&store, Window::days(10), Some(day));
        assert_eq!(view.html.matches("stat-card").count(), 5);
        assert!(view.html.contains("Move Every Hour"));
        // Missing contributors read as zero
        assert!(view.html.contains(r#"style="width: 0%""#));
    }

    #[test]
    fn test_day_without_contributors() {
        let store = sample_store();
        let day = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let view = build(&store, Window::All, Some(day));
        assert!(view.html.contains(super::super::NO_CONTRIBUTORS));
    }
}
