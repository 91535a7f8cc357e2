//! Session tab: mindfulness session durations, heart rate and history

use super::{chart_card, fmt_opt, format_long_date, format_time, html_escape, stat_tile, Tab, TabView};
use crate::chart::{Axis, ChartSpec, Layout, Marker, Trace, BLUE, GRAY, GREEN, PURPLE, RED};
use crate::features::{total_minutes, SessionTally};
use crate::store::RecordStore;
use crate::types::{MindfulSession, Mood, SessionKind};
use serde_json::Value;

pub const DURATION_CHART: &str = "sessions-duration-chart";
pub const HEART_RATE_CHART: &str = "sessions-hr-chart";

/// Bar colour per session kind
pub fn kind_color(kind: Option<&SessionKind>) -> &'static str {
    match kind {
        Some(SessionKind::Meditation) => PURPLE,
        Some(SessionKind::Breathing) => BLUE,
        Some(SessionKind::Rest) => GREEN,
        _ => GRAY,
    }
}

fn kind_classes(kind: Option<&SessionKind>) -> &'static str {
    match kind {
        Some(SessionKind::Meditation) => "border-purple-500 bg-purple-50",
        Some(SessionKind::Breathing) => "border-blue-500 bg-blue-50",
        Some(SessionKind::Rest) => "border-green-500 bg-green-50",
        _ => "border-gray-300 bg-gray-50",
    }
}

fn mood_label(mood: &Mood) -> String {
    match mood {
        Mood::Good => "Good".to_string(),
        Mood::Same => "Same".to_string(),
        Mood::Bad => "Bad".to_string(),
        Mood::Other(other) => html_escape(other),
    }
}

pub fn build(store: &RecordStore) -> TabView {
    // Newest first for the list; the charts read oldest first
    let mut sessions: Vec<&MindfulSession> = store.sessions().iter().filter(|s| s.day.is_some()).collect();
    if sessions.is_empty() {
        return TabView::placeholder(Tab::Session, "No session data available");
    }
    sessions.sort_by(|a, b| b.day.cmp(&a.day));
    let chronological: Vec<&MindfulSession> = sessions.iter().rev().copied().collect();

    let tally = SessionTally::from_sessions(sessions.iter().copied());
    let count_of = |kind: &SessionKind| tally.by_kind.get(kind.as_str()).copied().unwrap_or(0);

    let x: Vec<Value> = chronological
        .iter()
        .map(|s| Value::String(s.day.map(|d| d.to_string()).unwrap_or_default()))
        .collect();
    let durations = Trace::bar(
        "Duration",
        x,
        chronological.iter().map(|s| s.duration_minutes()).collect(),
        GRAY,
    )
    .with_marker(Marker::per_point(
        chronological
            .iter()
            .map(|s| kind_color(s.kind.as_ref()).to_string())
            .collect(),
    ))
    .with_hover("<b>%{x}</b><br>Duration: %{y:.1f} min<extra></extra>");
    let mut charts = vec![ChartSpec::new(
        DURATION_CHART,
        vec![durations],
        Layout::new("", Axis::category("Date"), Axis::titled("Duration (minutes)")).with_height(350),
    )];

    let with_hr: Vec<(&MindfulSession, f64)> = chronological
        .iter()
        .filter_map(|s| s.average_heart_rate().map(|hr| (*s, hr)))
        .collect();
    let hr_body = if with_hr.is_empty() {
        r#"<div class="text-center text-gray-500 py-8">No heart rate data available for sessions</div>"#
    } else {
        let trace = Trace::line(
            "Avg HR",
            with_hr
                .iter()
                .map(|(s, _)| Value::String(s.day.map(|d| d.to_string()).unwrap_or_default()))
                .collect(),
            with_hr.iter().map(|(_, hr)| Some(*hr)).collect(),
            RED,
        )
        .with_marker(Marker::color(RED).sized(6.0))
        .with_hover("<b>%{x}</b><br>Avg HR: %{y:.1f} bpm<extra></extra>");
        charts.push(ChartSpec::new(
            HEART_RATE_CHART,
            vec![trace],
            Layout::new("", Axis::category("Date"), Axis::titled("Heart Rate (bpm)")).with_height(300),
        ));
        ""
    };

    let stats = [
        stat_tile(&tally.sessions.to_string(), "Total Sessions", "text-gray-900"),
        stat_tile(&count_of(&SessionKind::Meditation).to_string(), "Meditations", "text-purple-600"),
        stat_tile(&count_of(&SessionKind::Breathing).to_string(), "Breathing Exercises", "text-blue-600"),
        stat_tile(&format!("{:.0}", total_minutes(sessions.iter().copied())), "Total Minutes", "text-green-600"),
    ]
    .join("\n");

    let list = sessions.iter().map(|s| session_entry(s)).collect::<Vec<_>>().join("\n");

    let html = format!(
        r#"<div class="space-y-6">
<div class="bg-white border border-gray-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-gray-900 mb-2">Mindfulness Sessions</h3>
    <p class="text-sm text-gray-600">Track your meditation, breathing exercises, and rest sessions</p>
</div>
<div class="grid grid-cols-1 md:grid-cols-4 gap-4">
{stats}
</div>
{}
<div class="bg-white border border-gray-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-gray-900 mb-4">Average Heart Rate During Sessions</h3>
    <div id="{HEART_RATE_CHART}">{hr_body}</div>
</div>
<div class="bg-white border border-gray-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-gray-900 mb-4">Recent Sessions</h3>
    <div class="space-y-3">
{list}
    </div>
</div>
</div>"#,
        chart_card("Session Duration Over Time", DURATION_CHART)
    );

    TabView::new(Tab::Session, html, charts)
}

fn session_entry(session: &MindfulSession) -> String {
    let kind = session.kind.as_ref().map(SessionKind::as_str).unwrap_or("Session");
    let mood = session
        .mood
        .as_ref()
        .map(|m| format!(r#" <span class="text-sm text-gray-600">{}</span>"#, mood_label(m)))
        .unwrap_or_default();
    let date = session.day.map(format_long_date).unwrap_or_else(|| "N/A".to_string());
    let duration = session
        .duration_minutes()
        .map(|m| format!("\n            <div><strong>Duration:</strong> {m:.1} minutes</div>"))
        .unwrap_or_default();
    let heart_rate = session
        .average_heart_rate()
        .map(|hr| {
            format!(
                r#"
        <div class="mt-2 text-sm text-gray-700"><strong>Avg Heart Rate:</strong> {} bpm</div>"#,
                fmt_opt(Some(hr), 1)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="border-l-4 {} p-4 rounded-r-lg">
        <div class="flex items-center space-x-2">
            <span class="font-semibold text-gray-900 capitalize">{}</span>{mood}
        </div>
        <div class="mt-2 text-sm text-gray-600">
            <div><strong>Date:</strong> {date}</div>
            <div><strong>Time:</strong> {} - {}</div>{duration}
        </div>{heart_rate}
    </div>"#,
        kind_classes(session.kind.as_ref()),
        html_escape(kind),
        format_time(session.start_datetime.as_ref()),
        format_time(session.end_datetime.as_ref()),
    )
}

#[cfg(test)]
mod tests {
    use super::super::test_support::store;
    use super::*;
    use crate::chart::MarkerColor;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_store() -> RecordStore {
        store(json!({
            "session.csv": [
                {"day": "2024-01-02", "type": "breathing", "mood": "good",
                 "start_datetime": "2024-01-02T07:00:00", "end_datetime": null},
                {"day": "2024-01-01", "type": "meditation",
                 "start_datetime": "2024-01-01T00:00:00", "end_datetime": "2024-01-01T00:30:00",
                 "heart_rate": "{\"items\": [60, null, 62]}"},
                {"day": "2024-01-03", "type": "nap",
                 "start_datetime": "2024-01-03T13:00:00", "end_datetime": "2024-01-03T13:20:00"}
            ]
        }))
    }

    #[test]
    fn test_duration_chart_colours_and_gaps() {
        let view = build(&sample_store());
        let bars = &view.charts[0].data[0];
        assert_eq!(bars.x, vec![json!("2024-01-01"), json!("2024-01-02"), json!("2024-01-03")]);
        assert_eq!(bars.y, vec![Some(30.0), None, Some(20.0)]);
        assert_eq!(
            bars.marker.as_ref().map(|m| m.color.clone()),
            Some(MarkerColor::PerPoint(vec![
                PURPLE.to_string(),
                BLUE.to_string(),
                GRAY.to_string()
            ]))
        );
    }

    #[test]
    fn test_summary_and_heart_rate() {
        let view = build(&sample_store());
        // Total minutes only counts timed sessions
        assert!(view.html.contains(r#"<div class="text-2xl font-bold text-green-600">50</div>"#));
        assert!(view.html.contains("Avg Heart Rate:</strong> 61.0 bpm"));
        assert_eq!(view.charts.len(), 2);
        assert_eq!(view.charts[1].data[0].y, vec![Some(61.0)]);
    }

    #[test]
    fn test_sessions_without_heart_rate_degrade_chart_only() {
        let store = store(json!({
            "session.csv": [{"day": "2024-01-01", "type": "rest"}]
        }));
        let view = build(&store);
        assert_eq!(view.charts.len(), 1);
        assert!(view.html.contains("No heart rate data available for sessions"));
    }
}
