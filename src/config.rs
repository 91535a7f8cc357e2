//! Dashboard configuration

use crate::error::DashboardError;
use crate::window::Window;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    /// Base URL of the upload/chat backend
    pub backend_url: String,
    /// Initial window for every tab with a time range selector
    pub default_window: Window,
    /// Initial window for the temperature tab
    pub temperature_window: Window,
    pub request_timeout: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            default_window: Window::days(10),
            temperature_window: Window::days(7),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, DashboardError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads configuration through `get` so tests never touch the process
    /// environment. Unset or blank variables keep their defaults.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, DashboardError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut get = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let backend_url = get("OURA_DASH_BACKEND_URL").unwrap_or(defaults.backend_url);
        let default_window = match get("OURA_DASH_DEFAULT_WINDOW") {
            Some(v) => v.parse()?,
            None => defaults.default_window,
        };
        let temperature_window = match get("OURA_DASH_TEMPERATURE_WINDOW") {
            Some(v) => v.parse()?,
            None => defaults.temperature_window,
        };
        let request_timeout = match get("OURA_DASH_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = v.trim().parse().map_err(|_| {
                    DashboardError::Config(format!("OURA_DASH_TIMEOUT_SECS must be whole seconds, got {v}"))
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        Ok(Self {
            backend_url,
            default_window,
            temperature_window,
            request_timeout,
        })
    }
}
