//! Time-window selection
//!
//! Daily records are scoped to the most recent N records; sub-daily samples
//! are scoped to the N calendar days ending on the latest sample.

use crate::error::DashboardError;
use crate::types::{Dated, Timestamped};
use chrono::Duration;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use tracing::debug;

/// Trailing window used to scope a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    Days(NonZeroUsize),
    All,
}

impl Window {
    /// Windows offered by the range selector, in display order
    pub fn presets() -> [Window; 5] {
        [
            Window::days(7),
            Window::days(10),
            Window::days(30),
            Window::days(90),
            Window::All,
        ]
    }

    /// Window of `days` days; zero means all
    pub fn days(days: usize) -> Self {
        NonZeroUsize::new(days).map_or(Window::All, Window::Days)
    }

    /// Value used in range selector options
    pub fn value(&self) -> String {
        match self {
            Window::Days(n) => n.to_string(),
            Window::All => "all".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Window::Days(n) => format!("Last {n} days"),
            Window::All => "All time".to_string(),
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::days(10)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value())
    }
}

impl FromStr for Window {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Window::All);
        }
        trimmed
            .parse::<NonZeroUsize>()
            .map(Window::Days)
            .map_err(|_| DashboardError::InvalidWindow(s.to_string()))
    }
}

/// Select the trailing window of daily records in ascending date order.
///
/// The input is never reordered or mutated; `All` returns every record in its
/// original relative order.
pub fn filter<T: Dated>(records: &[T], window: Window) -> Vec<&T> {
    let n = match window {
        Window::All => return records.iter().collect(),
        Window::Days(n) => n.get(),
    };

    let mut sorted: Vec<&T> = records.iter().collect();
    sorted.sort_by(|a, b| b.day().cmp(&a.day()));
    sorted.truncate(n);
    sorted.reverse();

    debug!(total = records.len(), kept = sorted.len(), %window, "filtered daily records");
    sorted
}

/// Select samples within the trailing calendar-day window, keeping input order.
pub fn trailing_days<T: Timestamped>(samples: &[T], window: Window) -> Vec<&T> {
    let n = match window {
        Window::All => return samples.iter().collect(),
        Window::Days(n) => n.get(),
    };

    let Some(latest) = samples.iter().map(|s| s.timestamp().date()).max() else {
        return Vec::new();
    };
    // A span reaching past the calendar's start keeps every sample
    let first_day = i64::try_from(n - 1)
        .ok()
        .and_then(Duration::try_days)
        .and_then(|span| latest.checked_sub_signed(span));

    let kept: Vec<&T> = samples
        .iter()
        .filter(|s| first_day.map_or(true, |first| s.timestamp().date() >= first))
        .collect();

    debug!(total = samples.len(), kept = kept.len(), %window, "filtered samples");
    kept
}
