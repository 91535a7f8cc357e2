//! Per-tab view builders
//!
//! Every builder reads the record store, applies the tab's window and returns
//! a `TabView`: the complete HTML fragment for the tab container plus the
//! charts to draw into the mount points that fragment declares. Building never
//! fails; absent data yields a placeholder and malformed records only lose
//! their own element.

pub mod activity;
pub mod cardiovascular;
pub mod heart;
pub mod metrics;
pub mod session;
pub mod sleep;
pub mod sleep_model;
pub mod sleep_time;
pub mod temperature;

use crate::chart::{ChartClick, ChartSpec};
use crate::error::{DashboardError, DecodeError};
use crate::store::RecordStore;
use crate::types::{parse_day, ContributorBreakdown, Dated, Timestamp};
use crate::window::Window;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

/// Dashboard tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Sleep,
    Activity,
    Heart,
    Metrics,
    Temperature,
    Session,
    Cardiovascular,
    SleepModel,
    SleepTime,
}

impl Tab {
    pub const ALL: [Tab; 9] = [
        Tab::Sleep,
        Tab::Activity,
        Tab::Heart,
        Tab::Metrics,
        Tab::Temperature,
        Tab::Session,
        Tab::Cardiovascular,
        Tab::SleepModel,
        Tab::SleepTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Sleep => "sleep",
            Tab::Activity => "activity",
            Tab::Heart => "heart",
            Tab::Metrics => "metrics",
            Tab::Temperature => "temperature",
            Tab::Session => "session",
            Tab::Cardiovascular => "cardiovascular",
            Tab::SleepModel => "sleepmodel",
            Tab::SleepTime => "sleeptime",
        }
    }

    /// Id of the element the tab's fragment replaces
    pub fn container(&self) -> String {
        format!("tab-content-{}", self.as_str())
    }

    /// Whether the tab offers a time range selector
    pub fn has_window(&self) -> bool {
        matches!(
            self,
            Tab::Sleep | Tab::Activity | Tab::Heart | Tab::Metrics | Tab::Temperature
        )
    }

    /// Build the tab's view from the store
    pub fn build(&self, store: &RecordStore, window: Window, selected: Option<NaiveDate>) -> TabView {
        match self {
            Tab::Sleep => sleep::build(store, window, selected),
            Tab::Activity => activity::build(store, window, selected),
            Tab::Heart => heart::build(store, window, selected),
            Tab::Metrics => metrics::build(store, window, selected),
            Tab::Temperature => temperature::build(store, window),
            Tab::Session => session::build(store),
            Tab::Cardiovascular => cardiovascular::build(store),
            Tab::SleepModel => sleep_model::build(store),
            Tab::SleepTime => sleep_time::build(store),
        }
    }

    /// Chart whose clicks open the detail panel
    pub fn detail_chart(&self) -> Option<&'static str> {
        match self {
            Tab::Sleep => Some(sleep::CHART),
            Tab::Activity => Some(activity::STEPS_CHART),
            Tab::Heart => Some(heart::STRESS_CHART),
            Tab::Metrics => Some(metrics::READINESS_CHART),
            _ => None,
        }
    }

    /// Map a chart click to the day of a record shown in the current window.
    ///
    /// Tabs without a detail view never resolve a selection.
    pub fn resolve_click(&self, store: &RecordStore, window: Window, click: &ChartClick) -> Option<NaiveDate> {
        match self {
            Tab::Sleep => sleep::select(store, window, click),
            Tab::Activity => activity::select(store, window, click),
            Tab::Heart => heart::select(store, window, click),
            Tab::Metrics => metrics::select(store, window, click),
            _ => None,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Tab::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| DashboardError::UnknownTab(s.to_string()))
    }
}

/// Output of one view build
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub tab: Tab,
    /// Complete fragment for the tab container
    pub html: String,
    /// Charts to plot after the fragment is in place
    pub charts: Vec<ChartSpec>,
    /// True when the fragment is the no-data placeholder
    pub empty: bool,
}

impl TabView {
    pub fn new(tab: Tab, html: String, charts: Vec<ChartSpec>) -> Self {
        Self {
            tab,
            html,
            charts,
            empty: false,
        }
    }

    pub fn placeholder(tab: Tab, message: &str) -> Self {
        Self {
            tab,
            html: format!(
                r#"<div class="bg-white border border-gray-200 rounded-lg p-6 text-center">
    <p class="text-gray-500">{}</p>
</div>"#,
                html_escape(message)
            ),
            charts: Vec::new(),
            empty: true,
        }
    }

    pub fn container(&self) -> String {
        self.tab.container()
    }
}

/// Contributor shown in a detail grid
pub(crate) struct ContributorSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub(crate) const NO_CONTRIBUTORS: &str = "No contributor data available for this date.";

/// Escape text for HTML content and attribute values
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `Jan 5, 2024`
pub fn format_date(day: NaiveDate) -> String {
    day.format("%b %-d, %Y").to_string()
}

/// `Fri, Jan 5, 2024`
pub fn format_long_date(day: NaiveDate) -> String {
    day.format("%a, %b %-d, %Y").to_string()
}

/// Wall-clock time as `07:45 PM`
pub fn format_time(ts: Option<&Timestamp>) -> String {
    ts.map(|t| t.local().format("%I:%M %p").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Number with `decimals` places, or `N/A`
pub(crate) fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Integer-valued readings print without a fraction, others as given
pub(crate) fn fmt_plain(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

pub(crate) fn day_axis<'a, T: Dated + 'a>(records: impl IntoIterator<Item = &'a T>) -> Vec<Value> {
    records
        .into_iter()
        .map(|r| Value::String(r.day().to_string()))
        .collect()
}

/// Day referenced by a click's x value
pub(crate) fn clicked_day(click: &ChartClick) -> Option<NaiveDate> {
    match &click.x {
        Value::String(s) => parse_day(s),
        _ => None,
    }
}

/// Record in `records` whose day matches the clicked x value
pub(crate) fn find_clicked<'a, T: Dated>(records: &[&'a T], click: &ChartClick) -> Option<&'a T> {
    let day = clicked_day(click)?;
    records.iter().copied().find(|r| r.day() == day)
}

/// Record shown for the selected day, if still inside the window
pub(crate) fn find_selected<'a, T: Dated>(records: &[&'a T], selected: Option<NaiveDate>) -> Option<&'a T> {
    let day = selected?;
    records.iter().copied().find(|r| r.day() == day)
}

/// Range selector with the current window pre-selected
pub(crate) fn window_selector(tab: Tab, current: Window) -> String {
    let mut options = String::new();
    for window in Window::presets() {
        let selected = if window == current { " selected" } else { "" };
        let _ = writeln!(
            options,
            r#"        <option value="{}"{}>{}</option>"#,
            window.value(),
            selected,
            window.label()
        );
    }
    format!(
        r#"<select id="{}-time-range" class="px-3 py-1.5 border border-gray-300 rounded-lg text-sm font-medium">
{}    </select>"#,
        tab.as_str(),
        options
    )
}

/// Tab header with title and range selector
pub(crate) fn header(tab: Tab, title: &str, window: Window) -> String {
    format!(
        r#"<div class="flex items-center justify-between mb-4">
    <h3 class="text-base font-semibold text-gray-900">{}</h3>
    {}
</div>"#,
        html_escape(title),
        window_selector(tab, window)
    )
}

/// Colour classes for a 0-100 score: green from 80, yellow from 60, red below
pub(crate) fn score_classes(value: u8) -> (&'static str, &'static str, &'static str) {
    if value >= 80 {
        ("bg-green-50 border-green-200", "text-green-900", "bg-green-600")
    } else if value >= 60 {
        ("bg-yellow-50 border-yellow-200", "text-yellow-900", "bg-yellow-600")
    } else {
        ("bg-red-50 border-red-200", "text-red-900", "bg-red-600")
    }
}

pub(crate) fn contributor_card(label: &str, value: u8, description: &str) -> String {
    let (card, text, bar) = score_classes(value);
    let description = if description.is_empty() {
        String::new()
    } else {
        format!(
            r#"
    <p class="text-xs text-gray-600 leading-relaxed">{}</p>"#,
            html_escape(description)
        )
    };
    format!(
        r#"<div class="stat-card {card} rounded-lg p-4 border">
    <div class="text-xs font-semibold uppercase tracking-wide text-gray-600 mb-2">{label}</div>
    <div class="text-3xl font-bold {text} mb-3">{value}</div>
    <div class="w-full bg-white rounded-full h-1.5 mb-3 overflow-hidden">
        <div class="{bar} h-1.5 rounded-full" style="width: {value}%"></div>
    </div>{description}
</div>"#,
        label = html_escape(label),
    )
}

/// Cards for every listed contributor; a missing score reads as zero
pub(crate) fn contributor_cards(
    breakdown: Result<&ContributorBreakdown, DecodeError>,
    specs: &[ContributorSpec],
) -> String {
    match breakdown {
        Ok(contributors) => specs
            .iter()
            .map(|s| contributor_card(s.label, contributors.score(s.key).unwrap_or(0), s.description))
            .collect::<Vec<_>>()
            .join("\n"),
        Err(_) => format!(
            r#"<p class="text-gray-500 text-center col-span-full text-sm">{NO_CONTRIBUTORS}</p>"#
        ),
    }
}

/// Detail panel; hidden until a day is selected
pub(crate) fn detail_panel(prefix: &str, title: &str, columns: u8, selected: Option<(NaiveDate, String)>) -> String {
    let (visibility, date, body) = match selected {
        Some((day, body)) => ("visible", format_date(day), body),
        None => ("hidden", String::new(), String::new()),
    };
    format!(
        r#"<div id="{prefix}-detail-view" class="detail-view {visibility}">
    <div class="flex items-center justify-between mb-4">
        <h3 class="text-sm font-semibold text-gray-900">{title}</h3>
        <div id="{prefix}-selected-date" class="text-xs text-gray-600">{date}</div>
    </div>
    <div id="{prefix}-details" class="stat-grid grid grid-cols-1 md:grid-cols-2 lg:grid-cols-{columns} gap-4">{body}</div>
</div>"#,
        title = html_escape(title),
    )
}

/// Headline number with caption
pub(crate) fn stat_tile(value: &str, caption: &str, color: &str) -> String {
    format!(
        r#"<div class="bg-white border border-gray-200 rounded-lg p-4">
    <div class="text-2xl font-bold {color}">{}</div>
    <div class="text-sm text-gray-600">{}</div>
</div>"#,
        html_escape(value),
        html_escape(caption)
    )
}

/// Titled card wrapping a chart mount point
pub(crate) fn chart_card(title: &str, mount: &str) -> String {
    format!(
        r#"<div class="bg-white border border-gray-200 rounded-lg p-6">
    <h3 class="text-lg font-semibold text-gray-900 mb-4">{}</h3>
    <div id="{mount}"></div>
</div>"#,
        html_escape(title)
    )
}


#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tab_names() {
        assert_eq!("sleep".parse::<Tab>().unwrap(), Tab::Sleep);
        assert_eq!("sleep-model".parse::<Tab>().unwrap(), Tab::SleepModel);
        assert_eq!("SleepTime".parse::<Tab>().unwrap(), Tab::SleepTime);
        assert!("workouts".parse::<Tab>().is_err());
        assert_eq!(Tab::Cardiovascular.container(), "tab-content-cardiovascular");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape(r#"<b>"Tom" & 'Jerry'</b>"#), "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_score_thresholds() {
        assert_eq!(score_classes(80).1, "text-green-900");
        assert_eq!(score_classes(79).1, "text-yellow-900");
        assert_eq!(score_classes(60).1, "text-yellow-900");
        assert_eq!(score_classes(59).1, "text-red-900");
    }

    #[test]
    fn test_window_selector_marks_current() {
        let html = window_selector(Tab::Sleep, Window::days(30));
        assert!(html.contains(r#"id="sleep-time-range""#));
        assert!(html.contains(r#"<option value="30" selected>Last 30 days</option>"#));
        assert!(html.contains(r#"<option value="all">All time</option>"#));
    }

    #[test]
    fn test_contributor_cards_degrade_on_decode_failure() {
        let specs = [ContributorSpec {
            key: "timing",
            label: "Timing",
            description: "",
        }];
        let html = contributor_cards(Err(DecodeError::Missing), &specs);
        assert!(html.contains(NO_CONTRIBUTORS));
    }

    #[test]
    fn test_formatting() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(day), "Jan 5, 2024");
        assert_eq!(format_long_date(day), "Fri, Jan 5, 2024");
        let ts = Timestamp::parse("2024-01-05T19:45:00+01:00").unwrap();
        assert_eq!(format_time(Some(&ts)), "07:45 PM");
        assert_eq!(format_time(None), "N/A");
        assert_eq!(fmt_plain(31.0), "31");
        assert_eq!(fmt_plain(31.5), "31.5");
    }
}
