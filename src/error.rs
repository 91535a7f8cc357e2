//! Error types for the dashboard core

use thiserror::Error;

/// Errors that can occur while loading data or talking to the backend
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Backend returned an error: {0}")]
    Upstream(String),

    #[error("Unexpected response format from server")]
    UnexpectedResponse,

    #[error("The {0} request is still in progress")]
    Busy(&'static str),

    #[error("No CSV files selected")]
    NoCsvFiles,

    #[error("Chat message is empty")]
    EmptyMessage,

    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    #[error("Unknown tab: {0}")]
    UnknownTab(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reason an uploaded row was rejected at ingestion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Failure to decode an embedded structured sub-field.
///
/// Views treat any of these as "no data for this record".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("field is absent")]
    Missing,

    #[error("malformed encoded field: {0}")]
    Malformed(String),
}
