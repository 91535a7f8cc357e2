//! Upload and chat backend client
//!
//! The backend parses uploaded CSV exports into attribute rows and answers
//! chat questions about them. [`HttpBackend`] talks to it over HTTP;
//! [`BackendSession`] wraps any backend with one in-flight guard per action
//! and a loading label for the UI.

use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, Notification, NotificationKind, RenderSink};
use crate::error::DashboardError;
use crate::store::{ChatRequest, ChatResponse, RecordStore, UploadResponse};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reply shown when the chat backend cannot be reached or answers with an error
pub const CHAT_FALLBACK: &str = "Sorry, I'm having trouble connecting right now. Please try again.";

/// One file selected for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_csv(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with(".csv")
    }
}

#[async_trait]
pub trait DashboardBackend: Send + Sync {
    /// Send export files for parsing
    async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadResponse, DashboardError>;

    /// Ask a question about the uploaded data
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, DashboardError>;
}

/// Backend reached over HTTP
#[derive(Clone, Debug)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, DashboardError> {
        Self::new(&config.backend_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Status code of `GET /`, used to check the backend is reachable
    pub async fn ping(&self) -> Result<u16, DashboardError> {
        let resp = self.client.get(format!("{}/", self.base_url)).send().await?;
        Ok(resp.status().as_u16())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, DashboardError> {
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Error bodies carry `{error}`; anything else is reported by status
    async fn error_from_response(&self, resp: reqwest::Response) -> DashboardError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
        match message {
            Some(message) => DashboardError::Upstream(message),
            None => {
                let body_snippet: String = body.chars().take(256).collect();
                debug!(status, body = %body_snippet, "backend error without message");
                DashboardError::Upstream(format!("Server returned {status}"))
            }
        }
    }
}

#[async_trait]
impl DashboardBackend for HttpBackend {
    async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadResponse, DashboardError> {
        let url = format!("{}/upload", self.base_url);
        let count = files.len();
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str("text/csv")?;
            form = form.part("files", part);
        }
        info!(url = %url, files = count, "uploading export files");
        let resp = self.client.post(&url).multipart(form).send().await?;
        self.handle_response(resp).await
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, DashboardError> {
        let url = format!("{}/chat", self.base_url);
        debug!(url = %url, chars = request.message.len(), "sending chat message");
        let resp = self.client.post(&url).json(request).send().await?;
        self.handle_response(resp).await
    }
}

/// Single-flight flag for one backend action
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn end(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Held for the duration of one backend call; releases the flag on drop,
/// whatever the outcome. Only the guard that set the loading label clears it.
struct FlightGuard<'a> {
    flight: &'a InFlight,
    label: Option<&'a Mutex<Option<String>>>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if let Some(loading) = self.label {
            set_label(loading, None);
        }
        self.flight.end();
    }
}

fn set_label(loading: &Mutex<Option<String>>, label: Option<String>) {
    let mut slot = loading.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *slot = label;
}

fn uploading_label(count: usize) -> String {
    let noun = if count == 1 { "file" } else { "files" };
    format!("Uploading {count} {noun}...")
}

/// Backend wrapper that rejects duplicate submissions
#[derive(Debug)]
pub struct BackendSession<B> {
    backend: B,
    upload_flight: InFlight,
    chat_flight: InFlight,
    loading: Mutex<Option<String>>,
}

impl<B: DashboardBackend> BackendSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            upload_flight: InFlight::default(),
            chat_flight: InFlight::default(),
            loading: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Label to show while an upload is pending
    pub fn loading(&self) -> Option<String> {
        self.loading
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.upload_flight.is_active()
    }

    pub fn is_chatting(&self) -> bool {
        self.chat_flight.is_active()
    }

    fn begin<'a>(
        &'a self,
        flight: &'a InFlight,
        action: &'static str,
        label: Option<String>,
    ) -> Result<FlightGuard<'a>, DashboardError> {
        if !flight.try_begin() {
            warn!(action, "request already in flight; rejecting duplicate");
            return Err(DashboardError::Busy(action));
        }
        let owns_label = label.is_some();
        if owns_label {
            set_label(&self.loading, label);
        }
        Ok(FlightGuard {
            flight,
            label: owns_label.then_some(&self.loading),
        })
    }

    /// Upload the CSV files of a selection.
    ///
    /// Non-CSV files are dropped; a selection without any CSV never reaches
    /// the backend.
    pub async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadResponse, DashboardError> {
        let total = files.len();
        let csv: Vec<UploadFile> = files.into_iter().filter(UploadFile::is_csv).collect();
        if csv.is_empty() {
            return Err(DashboardError::NoCsvFiles);
        }
        if csv.len() < total {
            debug!(skipped = total - csv.len(), "ignoring non-CSV files");
        }
        let _guard = self.begin(&self.upload_flight, "upload", Some(uploading_label(csv.len())))?;
        self.backend.upload(csv).await
    }

    /// Upload a selection and apply the result to the dashboard
    pub async fn upload_into(
        &self,
        dashboard: &mut Dashboard,
        files: Vec<UploadFile>,
        sink: &mut dyn RenderSink,
    ) -> Notification {
        if files.is_empty() {
            return Notification::new(
                NotificationKind::Info,
                "No Files Selected",
                "Please select at least one CSV file to upload.",
            );
        }
        match self.upload(files).await {
            Ok(response) => dashboard.apply_upload(response, sink),
            Err(DashboardError::NoCsvFiles) => Notification::new(
                NotificationKind::Error,
                "Invalid Files",
                "Please select CSV files only.",
            ),
            Err(err @ DashboardError::Busy(_)) => Notification::from_error("Upload In Progress", &err),
            Err(err @ DashboardError::Upstream(_)) => Notification::from_error("Upload Error", &err),
            Err(err) => Notification::from_error("Upload Failed", &err),
        }
    }

    /// Ask the chat backend about the store's data.
    ///
    /// Backend failures come back as the fallback reply; only an empty
    /// message or a duplicate submission is an error.
    pub async fn chat(&self, store: &RecordStore, message: &str) -> Result<String, DashboardError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(DashboardError::EmptyMessage);
        }
        let _guard = self.begin(&self.chat_flight, "chat", None)?;
        let request = store.chat_request(message);
        let reply = match self.backend.chat(&request).await {
            Ok(response) => response.into_reply(),
            Err(err) => Err(err),
        };
        Ok(reply.unwrap_or_else(|err| {
            warn!(error = %err, "chat request failed");
            CHAT_FALLBACK.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Backend that parks uploads until released
    struct GatedBackend {
        gate: Arc<Notify>,
        started: Arc<Notify>,
    }

    #[async_trait]
    impl DashboardBackend for GatedBackend {
        async fn upload(&self, files: Vec<UploadFile>) -> Result<UploadResponse, DashboardError> {
            self.started.notify_one();
            self.gate.notified().await;
            Ok(UploadResponse {
                success: true,
                files: files.into_iter().map(|f| f.name).collect(),
                ..UploadResponse::default()
            })
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse, DashboardError> {
            Err(DashboardError::Upstream("model offline".into()))
        }
    }

    fn gated() -> (BackendSession<GatedBackend>, Arc<Notify>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let started = Arc::new(Notify::new());
        let session = BackendSession::new(GatedBackend {
            gate: gate.clone(),
            started: started.clone(),
        });
        (session, gate, started)
    }

    #[tokio::test]
    async fn test_duplicate_upload_is_rejected() {
        let (session, gate, started) = gated();
        let session = Arc::new(session);

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.upload(vec![UploadFile::new("dailysleep.csv", "day\n")]).await }
        });
        started.notified().await;
        assert!(session.is_uploading());
        assert_eq!(session.loading().as_deref(), Some("Uploading 1 file..."));

        let second = session.upload(vec![UploadFile::new("dailysleep.csv", "day\n")]).await;
        assert!(matches!(second, Err(DashboardError::Busy("upload"))));

        gate.notify_one();
        let response = first.await.unwrap().unwrap();
        assert_eq!(response.files, vec!["dailysleep.csv".to_string()]);
        assert!(!session.is_uploading());
        assert_eq!(session.loading(), None);
    }

    #[tokio::test]
    async fn test_chat_during_upload_keeps_upload_label() {
        let (session, gate, started) = gated();
        let session = Arc::new(session);

        let upload = tokio::spawn({
            let session = session.clone();
            async move { session.upload(vec![UploadFile::new("heartrate.csv", "timestamp\n")]).await }
        });
        started.notified().await;

        let reply = session.chat(&RecordStore::default(), "any trends?").await.unwrap();
        assert_eq!(reply, CHAT_FALLBACK);
        assert!(!session.is_chatting());
        assert!(session.is_uploading());
        assert_eq!(session.loading().as_deref(), Some("Uploading 1 file..."));

        gate.notify_one();
        upload.await.unwrap().unwrap();
        assert_eq!(session.loading(), None);
    }

    #[tokio::test]
    async fn test_selection_without_csv_never_reaches_backend() {
        let (session, _gate, _started) = gated();
        let result = session.upload(vec![UploadFile::new("notes.txt", "hi")]).await;
        assert!(matches!(result, Err(DashboardError::NoCsvFiles)));
        assert!(!session.is_uploading());
    }

    #[tokio::test]
    async fn test_chat_failure_falls_back() {
        let (session, _gate, _started) = gated();
        let reply = session.chat(&RecordStore::default(), "how did I sleep?").await.unwrap();
        assert_eq!(reply, CHAT_FALLBACK);
        assert!(!session.is_chatting());
        assert!(matches!(
            session.chat(&RecordStore::default(), "   ").await,
            Err(DashboardError::EmptyMessage)
        ));
    }

    #[test]
    fn test_uploading_label() {
        assert_eq!(uploading_label(1), "Uploading 1 file...");
        assert_eq!(uploading_label(3), "Uploading 3 files...");
    }
}
