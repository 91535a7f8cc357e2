//! Sleep model tab: stage durations, efficiency and overnight HR/HRV

use super::{chart_card, day_axis, fmt_opt, format_long_date, format_time, Tab, TabView};
use crate::chart::{Axis, ChartSpec, Layout, Trace, BLUE, CYAN, GREEN, PURPLE, RED};
use crate::store::RecordStore;
use crate::types::SleepPeriod;

pub const STAGES_CHART: &str = "sleep-stages-chart";
pub const EFFICIENCY_CHART: &str = "sleep-efficiency-chart";
pub const HR_HRV_CHART: &str = "sleep-hr-hrv-chart";

/// Periods listed under the charts
const RECENT_PERIODS: usize = 10;

fn hours(seconds: Option<f64>) -> Option<f64> {
    seconds.map(|s| s / 3600.0)
}

pub fn build(store: &RecordStore) -> TabView {
    if store.sleep_periods().is_empty() {
        return TabView::placeholder(Tab::SleepModel, "No sleep model data available");
    }
    let mut periods: Vec<&SleepPeriod> = store.sleep_periods().iter().collect();
    periods.sort_by_key(|p| p.day);
    let x = day_axis(periods.iter().copied());

    let stage = |name: &str, field: fn(&SleepPeriod) -> Option<f64>, color: &str| {
        Trace::bar(name, x.clone(), periods.iter().map(|p| hours(field(*p))).collect(), color)
            .with_hover(format!("{name}: %{{y:.1f}}h<extra></extra>"))
    };
    let stages = vec![
        stage("Deep Sleep", |p| p.deep_sleep_duration, BLUE),
        stage("REM Sleep", |p| p.rem_sleep_duration, PURPLE),
        stage("Light Sleep", |p| p.light_sleep_duration, CYAN),
        stage("Awake", |p| p.awake_time, RED),
    ];

    let efficiency = Trace::line(
        "Efficiency",
        x.clone(),
        periods.iter().map(|p| p.efficiency).collect(),
        GREEN,
    )
    .with_hover("<b>%{x}</b><br>Efficiency: %{y}%<extra></extra>");

    let heart_rate = Trace::line(
        "Avg Heart Rate",
        x.clone(),
        periods.iter().map(|p| p.average_heart_rate).collect(),
        RED,
    )
    .with_hover("HR: %{y:.1f} bpm<extra></extra>");
    let hrv = Trace::line("Avg HRV", x, periods.iter().map(|p| p.average_hrv).collect(), PURPLE)
        .on_secondary_axis()
        .with_hover("HRV: %{y:.1f} ms<extra></extra>");

    let charts = vec![
        ChartSpec::new(
            STAGES_CHART,
            stages,
            Layout::new("", Axis::category("Date"), Axis::titled("Hours")).with_barmode("stack"),
        ),
        ChartSpec::new(
            EFFICIENCY_CHART,
            vec![efficiency],
            Layout::new("", Axis::category("Date"), Axis::titled("Efficiency (%)").with_range(0.0, 100.0))
                .with_height(300),
        ),
        ChartSpec::new(
            HR_HRV_CHART,
            vec![heart_rate, hrv],
            Layout::new("", Axis::category("Date"), Axis::titled("Heart Rate (bpm)"))
                .with_secondary_axis(Axis::secondary("HRV (ms)"))
                .with_height(300),
        ),
    ];

    let recent = periods
        .iter()
        .rev()
        .take(RECENT_PERIODS)
        .map(|p| period_entry(p))
        .collect::<Vec<_>>()
        .join("\n");

    let html = format!(
        r#"<div class="space-y-6">
{}
{}
{}
<div class="bg-white border border-gray-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-gray-900 mb-4">Recent Sleep Sessions</h3>
    <div id="sleep-sessions-list" class="space-y-3">
{recent}
    </div>
</div>
</div>"#,
        chart_card("Sleep Stage Duration", STAGES_CHART),
        chart_card("Sleep Efficiency Over Time", EFFICIENCY_CHART),
        chart_card("Average Heart Rate & HRV During Sleep", HR_HRV_CHART)
    );

    TabView::new(Tab::SleepModel, html, charts)
}

fn period_entry(period: &SleepPeriod) -> String {
    let vitals = period
        .average_heart_rate
        .map(|hr| {
            let hrv = period
                .average_hrv
                .map(|v| format!(" | {v:.0} ms HRV"))
                .unwrap_or_default();
            format!(
                r#"
    <div class="mt-2 text-sm text-gray-600">{hr:.1} bpm avg | {} bpm lowest{hrv}</div>"#,
                fmt_opt(period.lowest_heart_rate, 0)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="border border-gray-200 rounded-lg p-4">
    <div class="flex justify-between items-start mb-2">
        <div>
            <div class="font-semibold text-gray-900">{}</div>
            <div class="text-sm text-gray-600 mt-1">{} - {}</div>
        </div>
        <div class="text-right">
            <div class="text-sm font-medium text-blue-600">{}% efficient</div>
            <div class="text-xs text-gray-500">{}h total</div>
        </div>
    </div>
    <div class="grid grid-cols-2 md:grid-cols-4 gap-3 mt-3 text-sm">
        <div><span class="text-gray-600">Deep:</span> <span class="font-medium text-blue-600">{}h</span></div>
        <div><span class="text-gray-600">REM:</span> <span class="font-medium text-purple-600">{}h</span></div>
        <div><span class="text-gray-600">Light:</span> <span class="font-medium text-cyan-600">{}h</span></div>
        <div><span class="text-gray-600">Awake:</span> <span class="font-medium text-red-600">{}h</span></div>
    </div>{vitals}
</div>"#,
        format_long_date(period.day),
        format_time(period.bedtime_start.as_ref()),
        format_time(period.bedtime_end.as_ref()),
        fmt_opt(period.efficiency, 0),
        fmt_opt(hours(period.total_sleep_duration), 1),
        fmt_opt(hours(period.deep_sleep_duration), 1),
        fmt_opt(hours(period.rem_sleep_duration), 1),
        fmt_opt(hours(period.light_sleep_duration), 1),
        fmt_opt(hours(period.awake_time), 1),
    )
}
