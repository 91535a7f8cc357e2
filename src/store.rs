//! Record store and backend payloads
//!
//! The store holds every typed record collection for the current session. It
//! is built once from an upload payload and replaced wholesale on the next
//! successful upload; views only ever borrow it.

use crate::adapters::{adapt_rows, Attributes};
use crate::error::DashboardError;
use crate::types::{
    CardiovascularAge, DailyActivity, DailyReadiness, DailySleep, DailySpo2, DailyStress, Domain,
    HeartRateSample, MindfulSession, SleepPeriod, SleepTimeRecommendation, TemperatureSample,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Rows per uploaded file name
pub type FileRows = BTreeMap<String, Vec<Attributes>>;

/// Body returned by the upload backend.
///
/// The backend answers either `{success, files, data, summary}` or `{error}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub data: FileRows,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A successful upload
#[derive(Debug, Clone, Default)]
pub struct UploadPayload {
    pub files: Vec<String>,
    pub data: FileRows,
    pub summary: Option<String>,
}

impl UploadResponse {
    pub fn into_payload(self) -> Result<UploadPayload, DashboardError> {
        if let Some(error) = self.error {
            return Err(DashboardError::Upstream(error));
        }
        if !self.success {
            return Err(DashboardError::UnexpectedResponse);
        }
        Ok(UploadPayload {
            files: self.files,
            data: self.data,
            summary: self.summary,
        })
    }
}

/// Body sent to the chat backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub data: Value,
}

/// Body returned by the chat backend: `{response}` or `{error}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn into_reply(self) -> Result<String, DashboardError> {
        match (self.response, self.error) {
            (_, Some(error)) => Err(DashboardError::Upstream(error)),
            (Some(reply), None) => Ok(reply),
            (None, None) => Err(DashboardError::UnexpectedResponse),
        }
    }
}

/// Typed record collections for one upload
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    files: Vec<String>,
    summary: Option<String>,
    raw: FileRows,
    sleep: Vec<DailySleep>,
    activity: Vec<DailyActivity>,
    readiness: Vec<DailyReadiness>,
    spo2: Vec<DailySpo2>,
    stress: Vec<DailyStress>,
    heart_rate: Vec<HeartRateSample>,
    temperature: Vec<TemperatureSample>,
    sessions: Vec<MindfulSession>,
    cardiovascular: Vec<CardiovascularAge>,
    sleep_periods: Vec<SleepPeriod>,
    sleep_times: Vec<SleepTimeRecommendation>,
}

impl RecordStore {
    /// Validate every recognised file of an upload into typed records.
    ///
    /// Files with unknown names are kept only in raw form so they still reach
    /// the chat backend.
    pub fn from_payload(payload: UploadPayload) -> Self {
        let mut store = RecordStore {
            files: payload.files,
            summary: payload.summary,
            ..RecordStore::default()
        };

        for (name, rows) in &payload.data {
            let Some(domain) = Domain::from_file_name(name) else {
                warn!(file = %name, rows = rows.len(), "unrecognised export file kept for chat only");
                continue;
            };
            match domain {
                Domain::DailySleep => store.sleep = adapt_rows(rows),
                Domain::DailyActivity => store.activity = adapt_rows(rows),
                Domain::DailyReadiness => store.readiness = adapt_rows(rows),
                Domain::DailySpo2 => store.spo2 = adapt_rows(rows),
                Domain::DailyStress => store.stress = adapt_rows(rows),
                Domain::HeartRate => store.heart_rate = adapt_rows(rows),
                Domain::Temperature => store.temperature = adapt_rows(rows),
                Domain::Session => store.sessions = adapt_rows(rows),
                Domain::CardiovascularAge => store.cardiovascular = adapt_rows(rows),
                Domain::SleepModel => store.sleep_periods = adapt_rows(rows),
                Domain::SleepTime => store.sleep_times = adapt_rows(rows),
            }
        }
        store.raw = payload.data;

        info!(
            files = store.files.len(),
            domains = store.domains().len(),
            "record store loaded"
        );
        store
    }

    /// Whether a domain has at least one valid record
    pub fn has(&self, domain: Domain) -> bool {
        self.count(domain) > 0
    }

    pub fn count(&self, domain: Domain) -> usize {
        match domain {
            Domain::DailySleep => self.sleep.len(),
            Domain::DailyActivity => self.activity.len(),
            Domain::DailyReadiness => self.readiness.len(),
            Domain::DailySpo2 => self.spo2.len(),
            Domain::DailyStress => self.stress.len(),
            Domain::HeartRate => self.heart_rate.len(),
            Domain::Temperature => self.temperature.len(),
            Domain::Session => self.sessions.len(),
            Domain::CardiovascularAge => self.cardiovascular.len(),
            Domain::SleepModel => self.sleep_periods.len(),
            Domain::SleepTime => self.sleep_times.len(),
        }
    }

    /// Domains with data, in display order
    pub fn domains(&self) -> Vec<Domain> {
        Domain::ALL.into_iter().filter(|d| self.has(*d)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.domains().is_empty()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Backend-generated summary text, if any
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Uploaded file names no adapter recognised
    pub fn unrecognised_files(&self) -> Vec<&str> {
        self.raw
            .keys()
            .filter(|name| Domain::from_file_name(name).is_none())
            .map(String::as_str)
            .collect()
    }

    pub fn sleep(&self) -> &[DailySleep] {
        &self.sleep
    }

    pub fn activity(&self) -> &[DailyActivity] {
        &self.activity
    }

    pub fn readiness(&self) -> &[DailyReadiness] {
        &self.readiness
    }

    pub fn spo2(&self) -> &[DailySpo2] {
        &self.spo2
    }

    pub fn stress(&self) -> &[DailyStress] {
        &self.stress
    }

    pub fn heart_rate(&self) -> &[HeartRateSample] {
        &self.heart_rate
    }

    pub fn temperature(&self) -> &[TemperatureSample] {
        &self.temperature
    }

    pub fn sessions(&self) -> &[MindfulSession] {
        &self.sessions
    }

    pub fn cardiovascular(&self) -> &[CardiovascularAge] {
        &self.cardiovascular
    }

    pub fn sleep_periods(&self) -> &[SleepPeriod] {
        &self.sleep_periods
    }

    pub fn sleep_times(&self) -> &[SleepTimeRecommendation] {
        &self.sleep_times
    }

    /// Everything uploaded, as sent to the chat backend
    pub fn to_chat_data(&self) -> Value {
        let files = self
            .raw
            .iter()
            .map(|(name, rows)| {
                let rows = rows.iter().cloned().map(Value::Object).collect();
                (name.clone(), Value::Array(rows))
            })
            .collect();
        Value::Object(files)
    }

    pub fn chat_request(&self, message: impl Into<String>) -> ChatRequest {
        ChatRequest {
            message: message.into(),
            data: self.to_chat_data(),
        }
    }
}
