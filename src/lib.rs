//! Oura Dash - dashboard core for wearable export data
//!
//! Turns the parsed exports returned by an upload backend into per-tab
//! dashboard views: chart specifications for a plotting sink and HTML
//! fragments for a DOM sink. Records are validated into typed collections at
//! ingestion, scoped by a trailing time window, aggregated where needed and
//! rendered tab by tab.
//!
//! ## Modules
//!
//! - **Ingestion**: `adapters` and `store` turn backend rows into typed records
//! - **Computation**: `window`, `aggregate`, `decode` and `features`
//! - **Presentation**: `chart`, `views` and the `dashboard` state machine
//! - **Backend**: `client` (feature `client`) for the upload and chat endpoints

pub mod adapters;
pub mod aggregate;
pub mod chart;
#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod dashboard;
pub mod decode;
pub mod error;
pub mod features;
pub mod overview;
pub mod store;
pub mod types;
pub mod views;
pub mod window;

pub use chart::{ChartClick, ChartSpec};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, Interaction, Notification, RenderSink, TabState};
pub use error::{DashboardError, DecodeError, IngestError};
pub use overview::StoreOverview;
pub use store::{ChatRequest, ChatResponse, RecordStore, UploadResponse};
pub use views::{Tab, TabView};
pub use window::Window;

/// Crate version, reported by the CLI
pub const DASHBOARD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name reported by the CLI doctor
pub const PRODUCER_NAME: &str = "oura-dash";
