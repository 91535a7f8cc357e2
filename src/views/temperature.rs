//! Temperature tab: raw skin temperature trend and daily means

use super::{chart_card, header, Tab, TabView};
use crate::aggregate::{aggregate, Granularity};
use crate::chart::{Axis, ChartSpec, Layout, Trace, RED};
use crate::store::RecordStore;
use crate::window::{trailing_days, Window};
use serde_json::Value;

pub const TREND_CHART: &str = "temp-trend-chart";
pub const DAILY_CHART: &str = "temp-daily-chart";

pub fn build(store: &RecordStore, window: Window) -> TabView {
    if store.temperature().is_empty() {
        return TabView::placeholder(Tab::Temperature, "No temperature data available");
    }
    let samples = trailing_days(store.temperature(), window);

    let trend = Trace::lines(
        "Skin Temperature",
        samples
            .iter()
            .map(|s| Value::String(s.timestamp.as_str().to_string()))
            .collect(),
        samples.iter().map(|s| s.skin_temp).collect(),
        RED,
    )
    .with_hover("<b>%{x}</b><br>Temperature: %{y:.2f}°C<extra></extra>");

    let days = aggregate(samples, Granularity::Day);
    let daily = Trace::bar(
        "Avg Temperature",
        days.iter()
            .map(|b| Value::String(b.label(Granularity::Day)))
            .collect(),
        days.iter().map(|b| Some(b.mean)).collect(),
        RED,
    )
    .with_hover("<b>%{x}</b><br>Avg Temperature: %{y:.2f}°C<extra></extra>");

    let charts = vec![
        ChartSpec::new(
            TREND_CHART,
            vec![trend],
            Layout::new("", Axis::titled("Date/Time"), Axis::titled("Temperature (°C)")),
        ),
        ChartSpec::new(
            DAILY_CHART,
            vec![daily],
            Layout::new("", Axis::category("Date"), Axis::titled("Average Temperature (°C)")),
        ),
    ];

    let html = format!(
        r#"<div class="space-y-6">
{}
{}
{}
</div>"#,
        header(Tab::Temperature, "Skin Temperature", window),
        chart_card("Skin Temperature Trend", TREND_CHART),
        chart_card("Daily Average Temperature", DAILY_CHART)
    );

    TabView::new(Tab::Temperature, html, charts)
}
