//! Dashboard state and interaction handling
//!
//! `Dashboard` owns the record store of the current upload, the active tab,
//! each tab's retained window and the view state of the active tab. Every
//! interaction rebuilds the active tab's view and hands it to a `RenderSink`:
//! the fragment first, then one plot call per chart.

use crate::chart::{ChartClick, ChartSpec};
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::store::{RecordStore, UploadResponse};
use crate::views::{Tab, TabView};
use crate::window::Window;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Receiver of rendered output
pub trait RenderSink {
    /// Replace the whole content of the element with id `container`
    fn replace_fragment(&mut self, container: &str, html: &str);

    /// Draw a chart into the element named by `chart.mount`
    fn plot(&mut self, chart: &ChartSpec);
}

/// One call received by a `RecordingSink`
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Fragment { container: String, html: String },
    Plot(ChartSpec),
}

/// Sink that keeps every call in order
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plots(&self) -> Vec<&ChartSpec> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Plot(chart) => Some(chart),
                SinkEvent::Fragment { .. } => None,
            })
            .collect()
    }

    /// Most recent fragment written to `container`
    pub fn fragment(&self, container: &str) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match e {
            SinkEvent::Fragment { container: c, html } if c == container => Some(html.as_str()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl RenderSink for RecordingSink {
    fn replace_fragment(&mut self, container: &str, html: &str) {
        self.events.push(SinkEvent::Fragment {
            container: container.to_string(),
            html: html.to_string(),
        });
    }

    fn plot(&mut self, chart: &ChartSpec) {
        self.events.push(SinkEvent::Plot(chart.clone()));
    }
}

/// View state of the active tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "day")]
pub enum TabState {
    /// No data for the tab; the placeholder is shown
    Empty,
    /// Charts for the current window
    Filtered,
    /// Charts plus the detail panel for the selected day
    Detail(NaiveDate),
}

impl TabState {
    pub fn selected(&self) -> Option<NaiveDate> {
        match self {
            TabState::Detail(day) => Some(*day),
            _ => None,
        }
    }
}

/// User interaction delivered to the dashboard
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    SwitchTab(Tab),
    ChangeWindow(Window),
    Select(ChartClick),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

/// Transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error notification; upstream messages are shown verbatim
    pub fn from_error(title: impl Into<String>, error: &DashboardError) -> Self {
        let message = match error {
            DashboardError::Upstream(message) => message.clone(),
            other => other.to_string(),
        };
        Self::new(NotificationKind::Error, title, message)
    }
}

fn files_processed(count: usize) -> String {
    let noun = if count == 1 { "file" } else { "files" };
    format!("{count} {noun} processed successfully.")
}

/// Dashboard session over one record store
#[derive(Debug, Clone)]
pub struct Dashboard {
    session_id: Uuid,
    store: RecordStore,
    active: Tab,
    windows: BTreeMap<Tab, Window>,
    state: TabState,
}

impl Dashboard {
    pub fn new(config: &DashboardConfig) -> Self {
        Self::with_store(RecordStore::default(), config)
    }

    pub fn with_store(store: RecordStore, config: &DashboardConfig) -> Self {
        let windows = Tab::ALL
            .into_iter()
            .filter(Tab::has_window)
            .map(|tab| {
                let window = match tab {
                    Tab::Temperature => config.temperature_window,
                    _ => config.default_window,
                };
                (tab, window)
            })
            .collect();
        Self {
            session_id: Uuid::new_v4(),
            store,
            active: Tab::Sleep,
            windows,
            state: TabState::Empty,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn state(&self) -> TabState {
        self.state
    }

    /// Retained window of a tab; tabs without a selector always show everything
    pub fn window(&self, tab: Tab) -> Window {
        self.windows.get(&tab).copied().unwrap_or(Window::All)
    }

    /// Build the active tab's view without touching any sink
    pub fn view(&self) -> TabView {
        self.active
            .build(&self.store, self.window(self.active), self.state.selected())
    }

    /// Rebuild the active tab and push it to the sink
    pub fn render(&mut self, sink: &mut dyn RenderSink) -> TabState {
        let view = self.view();
        self.state = if view.empty {
            TabState::Empty
        } else {
            match self.state {
                TabState::Detail(day) => TabState::Detail(day),
                _ => TabState::Filtered,
            }
        };

        sink.replace_fragment(&view.container(), &view.html);
        for chart in &view.charts {
            sink.plot(chart);
        }
        debug!(
            session = %self.session_id,
            tab = %self.active,
            charts = view.charts.len(),
            state = ?self.state,
            "tab rendered"
        );
        self.state
    }

    pub fn handle(&mut self, interaction: Interaction, sink: &mut dyn RenderSink) -> TabState {
        match interaction {
            Interaction::SwitchTab(tab) => {
                self.active = tab;
                self.state = TabState::Filtered;
                self.render(sink)
            }
            Interaction::ChangeWindow(window) => {
                if !self.active.has_window() {
                    debug!(tab = %self.active, "tab has no time range; window ignored");
                    return self.state;
                }
                self.windows.insert(self.active, window);
                self.state = TabState::Filtered;
                self.render(sink)
            }
            Interaction::Select(click) => {
                if self.state == TabState::Empty {
                    return self.state;
                }
                match self
                    .active
                    .resolve_click(&self.store, self.window(self.active), &click)
                {
                    Some(day) => {
                        self.state = TabState::Detail(day);
                        self.render(sink)
                    }
                    None => {
                        debug!(tab = %self.active, mount = %click.mount, x = %click.x, "click matched no record");
                        self.state
                    }
                }
            }
        }
    }

    /// Apply an upload response.
    ///
    /// A successful payload replaces the store and opens the sleep tab; any
    /// other response leaves the current store in place.
    pub fn apply_upload(&mut self, response: UploadResponse, sink: &mut dyn RenderSink) -> Notification {
        match response.into_payload() {
            Ok(payload) => {
                let files = payload.files.len();
                self.store = RecordStore::from_payload(payload);
                info!(session = %self.session_id, files, "store replaced from upload");
                self.handle(Interaction::SwitchTab(Tab::Sleep), sink);
                Notification::new(NotificationKind::Success, "Upload Successful!", files_processed(files))
            }
            Err(err) => {
                warn!(session = %self.session_id, error = %err, "upload rejected; keeping current data");
                Notification::from_error("Upload Error", &err)
            }
        }
    }
}
