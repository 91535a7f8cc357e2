//! Cardiovascular tab: vascular age trend against an 18-year target

use super::{chart_card, fmt_plain, format_date, Tab, TabView};
use crate::chart::{
    Annotation, Axis, ChartSpec, Layout, Line, Marker, Shape, Trace, AMBER, BLUE, GREEN, RED,
};
use crate::features::SeriesSummary;
use crate::store::RecordStore;
use crate::types::CardiovascularAge;
use serde_json::Value;

pub const CHART: &str = "cardio-age-chart";

/// Target vascular age drawn as a reference line
pub const TARGET_AGE: f64 = 18.0;

/// Marker colour band for a vascular age
pub fn age_color(age: f64) -> &'static str {
    if age <= 15.0 {
        GREEN
    } else if age <= TARGET_AGE {
        BLUE
    } else if age <= 22.0 {
        AMBER
    } else {
        RED
    }
}

fn age_text_class(age: f64) -> &'static str {
    if age <= 15.0 {
        "text-green-600"
    } else if age <= TARGET_AGE {
        "text-blue-600"
    } else if age <= 22.0 {
        "text-orange-600"
    } else {
        "text-red-600"
    }
}

pub fn build(store: &RecordStore) -> TabView {
    let mut records: Vec<(&CardiovascularAge, f64)> = store
        .cardiovascular()
        .iter()
        .filter_map(|r| r.vascular_age.map(|age| (r, age)))
        .collect();
    let Some(summary) = SeriesSummary::from_values(records.iter().map(|(_, age)| Some(*age))) else {
        return TabView::placeholder(Tab::Cardiovascular, "No cardiovascular age data available");
    };
    records.sort_by_key(|(r, _)| r.day);
    let latest = records.last().map(|(_, age)| *age).unwrap_or(summary.mean);

    let ages: Vec<f64> = records.iter().map(|(_, age)| *age).collect();
    let trace = Trace::line(
        "Vascular Age",
        records
            .iter()
            .map(|(r, _)| Value::String(r.day.to_string()))
            .collect(),
        ages.iter().map(|a| Some(*a)).collect(),
        BLUE,
    )
    .with_line(Line::solid(BLUE, 3.0))
    .with_marker(Marker::per_point(ages.iter().map(|a| age_color(*a).to_string()).collect()).sized(10.0))
    .with_hover("<b>%{x}</b><br>Vascular Age: %{y} years<extra></extra>");

    let mut layout = Layout::new(
        "",
        Axis::date("Date"),
        Axis::titled("Vascular Age (years)").with_range(summary.min - 2.0, summary.max + 2.0),
    );
    layout.shapes.push(Shape::horizontal(TARGET_AGE, Line::dashed(GREEN, 2.0)));
    layout
        .annotations
        .push(Annotation::right_edge(TARGET_AGE, "Target: ≤18 years"));

    let stats = [
        ("Current Age", fmt_plain(latest), "text-blue-600"),
        ("Average Age", format!("{:.1}", summary.mean), "text-gray-900"),
        ("Best (Lowest)", fmt_plain(summary.min), "text-green-600"),
        ("Worst (Highest)", fmt_plain(summary.max), "text-red-600"),
    ]
    .iter()
    .map(|(caption, value, color)| {
        format!(
            r#"<div class="bg-white border border-gray-200 rounded-lg p-4">
    <div class="text-sm text-gray-600 mb-1">{caption}</div>
    <div class="text-3xl font-bold {color}">{value}</div>
    <div class="text-xs text-gray-500 mt-1">years</div>
</div>"#
        )
    })
    .collect::<Vec<_>>()
    .join("\n");

    let daily = records
        .iter()
        .rev()
        .map(|(r, age)| {
            format!(
                r#"<div class="flex justify-between items-center p-3 border border-gray-200 rounded-lg">
    <div>
        <div class="text-sm font-medium text-gray-900">{}</div>
        <div class="text-xs text-gray-500">{}</div>
    </div>
    <div class="text-right">
        <div class="text-xl font-bold {}">{}</div>
        <div class="text-xs text-gray-500">years</div>
    </div>
</div>"#,
                format_date(r.day),
                r.day.format("%A"),
                age_text_class(*age),
                fmt_plain(*age)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let html = format!(
        r#"<div class="space-y-6">
<div class="bg-white border border-gray-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-gray-900 mb-2">Cardiovascular Age</h3>
    <p class="text-sm text-gray-600">Track your vascular age based on your heart health metrics</p>
</div>
<div class="grid grid-cols-1 md:grid-cols-4 gap-4">
{stats}
</div>
{}
<div class="bg-blue-50 border border-blue-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-blue-900 mb-3">Understanding Your Cardiovascular Age</h3>
    <div class="space-y-2 text-sm text-blue-800">
        <p><strong>Cardiovascular age</strong> estimates how old your cardiovascular system is compared to your chronological age.</p>
        <p>A <strong>lower vascular age</strong> indicates better heart health.</p>
    </div>
</div>
<div class="bg-white border border-gray-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-gray-900 mb-4">Daily Records</h3>
    <div class="space-y-2">
{daily}
    </div>
</div>
</div>"#,
        chart_card("Vascular Age Trend", CHART)
    );

    TabView::new(Tab::Cardiovascular, html, vec![ChartSpec::new(CHART, vec![trace], layout)])
}
