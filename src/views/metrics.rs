//! Metrics tab: blood oxygen and readiness, with readiness contributors

use super::{
    contributor_cards, day_axis, detail_panel, find_clicked, find_selected, header, ContributorSpec,
    Tab, TabView,
};
use crate::chart::{Axis, ChartClick, ChartSpec, Layout, Marker, Trace, CYAN, PURPLE};
use crate::store::RecordStore;
use crate::types::DailyReadiness;
use crate::window::{filter, Window};
use chrono::NaiveDate;

pub const SPO2_CHART: &str = "spo2-chart";
pub const READINESS_CHART: &str = "readiness-chart";

const CONTRIBUTORS: [ContributorSpec; 8] = [
    ContributorSpec {
        key: "activity_balance",
        label: "Activity Balance",
        description: "Recent activity vs long-term average",
    },
    ContributorSpec {
        key: "body_temperature",
        label: "Body Temperature",
        description: "Deviation from your normal",
    },
    ContributorSpec {
        key: "hrv_balance",
        label: "HRV Balance",
        description: "Recent HRV vs long-term average",
    },
    ContributorSpec {
        key: "previous_day_activity",
        label: "Previous Day Activity",
        description: "Yesterday's activity load",
    },
    ContributorSpec {
        key: "previous_night",
        label: "Previous Night",
        description: "Last night's sleep",
    },
    ContributorSpec {
        key: "recovery_index",
        label: "Recovery Index",
        description: "Time for resting heart rate to stabilise",
    },
    ContributorSpec {
        key: "resting_heart_rate",
        label: "Resting Heart Rate",
        description: "Lowest heart rate overnight",
    },
    ContributorSpec {
        key: "sleep_balance",
        label: "Sleep Balance",
        description: "Recent sleep vs need",
    },
];

pub fn build(store: &RecordStore, window: Window, selected: Option<NaiveDate>) -> TabView {
    if store.spo2().is_empty() && store.readiness().is_empty() {
        return TabView::placeholder(Tab::Metrics, "No SpO2 or readiness data available");
    }

    let mut charts = Vec::new();
    let mut cards = Vec::new();

    let spo2 = filter(store.spo2(), window);
    if !spo2.is_empty() {
        // An undecodable block leaves a gap for that day only
        let averages = spo2
            .iter()
            .map(|d| d.spo2_percentage.get().and_then(|p| p.average))
            .collect();
        let trace = Trace::line("SpO2", day_axis(spo2.iter().copied()), averages, CYAN)
            .with_marker(Marker::color(CYAN).sized(8.0))
            .with_hover("<b>%{x}</b><br>SpO2: %{y:.1f}%<extra></extra>");
        charts.push(ChartSpec::new(
            SPO2_CHART,
            vec![trace],
            Layout::new("Blood Oxygen Levels", Axis::category(""), Axis::titled("SpO2 %").with_range(90.0, 100.0)),
        ));
        cards.push(format!(r#"<div class="chart-container"><div id="{SPO2_CHART}"></div></div>"#));
    }

    let readiness = filter(store.readiness(), window);
    if !readiness.is_empty() {
        let trace = Trace::line(
            "Readiness",
            day_axis(readiness.iter().copied()),
            readiness.iter().map(|d| d.score).collect(),
            PURPLE,
        )
        .with_marker(Marker::color(PURPLE).sized(8.0))
        .with_hover("<b>%{x}</b><br>Readiness: %{y}<extra></extra>");
        charts.push(ChartSpec::new(
            READINESS_CHART,
            vec![trace],
            Layout::new("Readiness Score", Axis::category(""), Axis::titled("Score").with_range(0.0, 100.0)),
        ));
        cards.push(format!(
            r#"<div class="chart-container"><div id="{READINESS_CHART}"></div><p class="text-xs text-gray-500 mt-3">Click on any point to view readiness contributors</p></div>"#
        ));
    }

    let detail = find_selected(&readiness, selected)
        .map(|day| (day.day, contributor_cards(day.contributors.decode(), &CONTRIBUTORS)));

    let html = format!(
        r#"{}
<div class="grid grid-cols-1 lg:grid-cols-2 gap-4">
{}
</div>
{}"#,
        header(Tab::Metrics, "Health Metrics", window),
        cards.join("\n"),
        detail_panel("readiness", "Readiness Breakdown", 4, detail)
    );

    TabView::new(Tab::Metrics, html, charts)
}

pub fn select(store: &RecordStore, window: Window, click: &ChartClick) -> Option<NaiveDate> {
    if click.mount != READINESS_CHART {
        return None;
    }
    let days = filter(store.readiness(), window);
    find_clicked::<DailyReadiness>(&days, click).map(|d| d.day)
}
