//! Heart tab: hourly heart rate and daily stress versus recovery

use super::{detail_panel, day_axis, find_clicked, find_selected, fmt_opt, header, html_escape, Tab, TabView};
use crate::aggregate::{aggregate, Granularity};
use crate::chart::{Axis, ChartClick, ChartSpec, Layout, Trace, AMBER, GREEN, RED};
use crate::store::RecordStore;
use crate::types::DailyStress;
use crate::window::{filter, trailing_days, Window};
use chrono::NaiveDate;
use serde_json::Value;

pub const HEART_CHART: &str = "heart-chart";
pub const STRESS_CHART: &str = "stress-chart";

fn hours(seconds: Option<f64>) -> Option<f64> {
    seconds.map(|s| s / 3600.0)
}

pub fn build(store: &RecordStore, window: Window, selected: Option<NaiveDate>) -> TabView {
    if store.heart_rate().is_empty() && store.stress().is_empty() {
        return TabView::placeholder(Tab::Heart, "No heart rate or stress data available");
    }

    let mut charts = Vec::new();
    let mut cards = Vec::new();

    if !store.heart_rate().is_empty() {
        let samples = trailing_days(store.heart_rate(), window);
        let buckets = aggregate(samples, Granularity::Hour);
        let trace = Trace::area(
            "Avg BPM",
            buckets
                .iter()
                .map(|b| Value::String(b.label(Granularity::Hour)))
                .collect(),
            buckets.iter().map(|b| Some(b.mean)).collect(),
            RED,
        )
        .with_hover("<b>%{x}</b><br>Avg BPM: %{y:.0f}<extra></extra>");
        charts.push(ChartSpec::new(
            HEART_CHART,
            vec![trace],
            Layout::new("Heart Rate Trends", Axis::category(""), Axis::titled("BPM")),
        ));
        cards.push(format!(r#"<div class="chart-container"><div id="{HEART_CHART}"></div></div>"#));
    }

    let days = filter(store.stress(), window);
    if !days.is_empty() {
        let x = day_axis(days.iter().copied());
        let stress = Trace::bar("Stress", x.clone(), days.iter().map(|d| hours(d.stress_high)).collect(), AMBER)
            .with_hover("<b>%{x}</b><br>Stress: %{y:.1f} hours<extra></extra>");
        let recovery = Trace::bar("Recovery", x, days.iter().map(|d| hours(d.recovery_high)).collect(), GREEN)
            .with_hover("<b>%{x}</b><br>Recovery: %{y:.1f} hours<extra></extra>");
        charts.push(ChartSpec::new(
            STRESS_CHART,
            vec![stress, recovery],
            Layout::new("Stress vs Recovery", Axis::category(""), Axis::titled("Hours")).with_barmode("group"),
        ));
        cards.push(format!(r#"<div class="chart-container"><div id="{STRESS_CHART}"></div></div>"#));
    }

    let detail = find_selected(&days, selected).map(|day| (day.day, stress_card(day)));

    let html = format!(
        r#"{}
<div class="grid grid-cols-1 lg:grid-cols-2 gap-4">
{}
</div>
{}"#,
        header(Tab::Heart, "Heart & Stress Metrics", window),
        cards.join("\n"),
        detail_panel("heart", "Stress Breakdown", 3, detail)
    );

    TabView::new(Tab::Heart, html, charts)
}

fn stress_card(day: &DailyStress) -> String {
    let summary = day
        .day_summary
        .as_deref()
        .map(|s| html_escape(&s.replace('_', " ")))
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        r#"<div class="stat-card bg-amber-50 border-amber-200 rounded-lg p-4 border">
    <div class="text-xs font-semibold uppercase tracking-wide text-gray-600 mb-2">High Stress</div>
    <div class="text-3xl font-bold text-amber-900">{} h</div>
</div>
<div class="stat-card bg-green-50 border-green-200 rounded-lg p-4 border">
    <div class="text-xs font-semibold uppercase tracking-wide text-gray-600 mb-2">High Recovery</div>
    <div class="text-3xl font-bold text-green-900">{} h</div>
</div>
<div class="stat-card bg-gray-50 border-gray-200 rounded-lg p-4 border">
    <div class="text-xs font-semibold uppercase tracking-wide text-gray-600 mb-2">Day Summary</div>
    <div class="text-xl font-bold text-gray-900 capitalize">{summary}</div>
</div>"#,
        fmt_opt(hours(day.stress_high), 1),
        fmt_opt(hours(day.recovery_high), 1),
    )
}

pub fn select(store: &RecordStore, window: Window, click: &ChartClick) -> Option<NaiveDate> {
    if click.mount != STRESS_CHART {
        return None;
    }
    let days = filter(store.stress(), window);
    find_clicked::<DailyStress>(&days, click).map(|d| d.day)
}
