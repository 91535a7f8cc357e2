//! Sleep time tab: daily bedtime recommendations

use super::{format_long_date, html_escape, stat_tile, Tab, TabView};
use crate::store::RecordStore;
use crate::types::{BedtimeWindow, SleepTimeRecommendation};

const SECONDS_PER_DAY: i64 = 86_400;

fn status_label(status: &str) -> &str {
    match status {
        "not_enough_nights" => "Not Enough Data",
        "only_recommended_found" => "Recommendation Only",
        "optimal_bedtime_available" => "Optimal Time Available",
        other => other,
    }
}

fn status_classes(status: Option<&str>) -> &'static str {
    match status {
        Some("only_recommended_found") => "bg-blue-100 text-blue-700",
        Some("optimal_bedtime_available") => "bg-green-100 text-green-700",
        _ => "bg-gray-100 text-gray-700",
    }
}

fn advice(recommendation: &str) -> &str {
    match recommendation {
        "earlier_bedtime" => "Try going to bed earlier",
        "later_bedtime" => "You can go to bed later",
        "optimal_timing" => "Your bedtime is optimal",
        other => other,
    }
}

fn border_class(recommendation: Option<&str>) -> &'static str {
    match recommendation {
        Some("earlier_bedtime") => "border-blue-500",
        Some("later_bedtime") => "border-orange-500",
        Some("optimal_timing") => "border-green-500",
        _ => "border-gray-300",
    }
}

/// `HH:MM` for an offset in seconds from midnight; negative offsets fall on
/// the previous evening
pub fn clock_from_offset(offset: i64) -> String {
    let seconds = offset.rem_euclid(SECONDS_PER_DAY);
    format!("{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60)
}

/// Bedtime window text, when the block decodes and names a start
pub fn bedtime_text(window: &BedtimeWindow) -> Option<String> {
    let start = clock_from_offset(window.start_offset?);
    Some(match window.end_offset {
        Some(end) => format!("{start} - {}", clock_from_offset(end)),
        None => start,
    })
}

fn optimal_bedtime(rec: &SleepTimeRecommendation) -> Option<String> {
    rec.optimal_bedtime.get().and_then(bedtime_text)
}

pub fn build(store: &RecordStore) -> TabView {
    if store.sleep_times().is_empty() {
        return TabView::placeholder(Tab::SleepTime, "No sleep time data available");
    }
    let mut recommendations: Vec<&SleepTimeRecommendation> = store.sleep_times().iter().collect();
    recommendations.sort_by(|a, b| b.day.cmp(&a.day));

    let with_optimal = recommendations.iter().filter(|r| optimal_bedtime(r).is_some()).count();
    let with_advice = recommendations.iter().filter(|r| r.recommendation.is_some()).count();

    let list = recommendations
        .iter()
        .map(|r| recommendation_entry(r))
        .collect::<Vec<_>>()
        .join("\n");
    let stats = [
        stat_tile(&recommendations.len().to_string(), "Total Days Tracked", "text-gray-900"),
        stat_tile(&with_optimal.to_string(), "Days with Optimal Time", "text-green-600"),
        stat_tile(&with_advice.to_string(), "Days with Advice", "text-blue-600"),
    ]
    .join("\n");

    let html = format!(
        r#"<div class="space-y-6">
<div class="bg-white border border-gray-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-gray-900 mb-2">Sleep Time Recommendations</h3>
    <p class="text-sm text-gray-600">Daily bedtime advice from your ring</p>
</div>
<div class="bg-white border border-gray-200 rounded-lg p-6">
    <div class="space-y-4">
{list}
    </div>
</div>
<div class="grid grid-cols-1 md:grid-cols-3 gap-4">
{stats}
</div>
</div>"#
    );

    TabView::new(Tab::SleepTime, html, Vec::new())
}

fn recommendation_entry(rec: &SleepTimeRecommendation) -> String {
    let status = rec
        .status
        .as_deref()
        .map(|s| html_escape(status_label(s)))
        .unwrap_or_default();
    let advice_line = rec
        .recommendation
        .as_deref()
        .map(|r| {
            format!(
                r#"
            <p class="text-sm text-gray-700"><strong>Advice:</strong> {}</p>"#,
                html_escape(advice(r))
            )
        })
        .unwrap_or_default();
    let bedtime_line = match optimal_bedtime(rec) {
        Some(text) => format!(r#"<p class="text-sm text-gray-700"><strong>Optimal Bedtime:</strong> {text}</p>"#),
        None => r#"<p class="text-sm text-gray-500 italic">Insufficient data for bedtime recommendation</p>"#.to_string(),
    };

    format!(
        r#"<div class="border-l-4 {} bg-gray-50 p-4 rounded-r-lg">
        <div class="flex items-center space-x-3">
            <span class="text-sm font-semibold text-gray-900">{}</span>
            <span class="px-2 py-1 text-xs rounded {}">{status}</span>
        </div>
        <div class="mt-2 space-y-1">{advice_line}
            {bedtime_line}
        </div>
    </div>"#,
        border_class(rec.recommendation.as_deref()),
        format_long_date(rec.day),
        status_classes(rec.status.as_deref()),
    )
}
