use oura_dash::client::{BackendSession, DashboardBackend, HttpBackend, UploadFile, CHAT_FALLBACK};
use oura_dash::dashboard::{Dashboard, NotificationKind, RecordingSink, TabState};
use oura_dash::{DashboardConfig, DashboardError, RecordStore, Tab};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn upload_posts_multipart_files() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"files\"; filename=\"dailysleep.csv\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "files": ["dailysleep.csv"],
            "data": {
                "dailysleep.csv": [
                    {"day": "2024-01-01", "score": 81, "contributors": "{\"deep_sleep\": 90}"}
                ]
            },
            "summary": "You slept well."
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = backend(&mock_server);
    assert_eq!(client.base_url(), mock_server.uri());
    let res = client
        .upload(vec![UploadFile::new("dailysleep.csv", "day,score\n2024-01-01,81\n")])
        .await
        .unwrap();
    assert!(res.success);

    let store = RecordStore::from_payload(res.into_payload().unwrap());
    assert_eq!(store.sleep().len(), 1);
    assert_eq!(store.summary(), Some("You slept well."));
}

#[tokio::test]
async fn upload_error_status_surfaces_backend_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "No files provided"})),
        )
        .mount(&mock_server)
        .await;

    let res = backend(&mock_server)
        .upload(vec![UploadFile::new("dailysleep.csv", "day\n")])
        .await;
    match res {
        Err(DashboardError::Upstream(message)) => assert_eq!(message, "No files provided"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn upload_error_without_body_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&mock_server)
        .await;

    let res = backend(&mock_server)
        .upload(vec![UploadFile::new("dailysleep.csv", "day\n")])
        .await;
    match res {
        Err(DashboardError::Upstream(message)) => assert_eq!(message, "Server returned 502"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn upload_into_dashboard_replaces_store_and_renders_sleep() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "files": ["dailysleep.csv", "heartrate.csv"],
            "data": {
                "dailysleep.csv": [
                    {"day": "2024-01-01", "score": 70},
                    {"day": "2024-01-02", "score": 75}
                ],
                "heartrate.csv": [
                    {"timestamp": "2024-01-01T10:05:00", "bpm": 60},
                    {"timestamp": "2024-01-01T10:40:00", "bpm": 70}
                ]
            }
        })))
        .mount(&mock_server)
        .await;

    let session = BackendSession::new(backend(&mock_server));
    let mut dashboard = Dashboard::new(&DashboardConfig::default());
    let mut sink = RecordingSink::new();

    let note = session
        .upload_into(
            &mut dashboard,
            vec![
                UploadFile::new("dailysleep.csv", "day\n"),
                UploadFile::new("heartrate.csv", "timestamp\n"),
                UploadFile::new("readme.md", "ignored"),
            ],
            &mut sink,
        )
        .await;

    assert_eq!(note.kind, NotificationKind::Success);
    assert_eq!(note.message, "2 files processed successfully.");
    assert_eq!(dashboard.active(), Tab::Sleep);
    assert_eq!(dashboard.state(), TabState::Filtered);
    assert_eq!(sink.plots().len(), 1);
    assert_eq!(session.loading(), None);

    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("readme.md"));
}

#[tokio::test]
async fn upload_into_without_csv_is_rejected_locally() {
    let mock_server = MockServer::start().await;
    let session = BackendSession::new(backend(&mock_server));
    let mut dashboard = Dashboard::new(&DashboardConfig::default());
    let mut sink = RecordingSink::new();

    let note = session
        .upload_into(&mut dashboard, vec![UploadFile::new("notes.txt", "x")], &mut sink)
        .await;
    assert_eq!(note.kind, NotificationKind::Error);
    assert_eq!(note.title, "Invalid Files");

    let note = session.upload_into(&mut dashboard, Vec::new(), &mut sink).await;
    assert_eq!(note.kind, NotificationKind::Info);

    assert!(mock_server.received_requests().await.unwrap().is_empty());
    assert!(sink.events.is_empty());
}

#[tokio::test]
async fn chat_sends_message_with_uploaded_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_partial_json(serde_json::json!({
            "message": "How was my sleep?",
            "data": {"dailysleep.csv": [{"day": "2024-01-01", "score": 81}]}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": "Pretty good."})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = RecordStore::from_payload(
        serde_json::from_value::<oura_dash::UploadResponse>(serde_json::json!({
            "success": true,
            "files": ["dailysleep.csv"],
            "data": {"dailysleep.csv": [{"day": "2024-01-01", "score": 81}]}
        }))
        .unwrap()
        .into_payload()
        .unwrap(),
    );

    let session = BackendSession::new(backend(&mock_server));
    let reply = session.chat(&store, "  How was my sleep?  ").await.unwrap();
    assert_eq!(reply, "Pretty good.");
}

#[tokio::test]
async fn chat_error_payload_falls_back() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "quota exceeded"})),
        )
        .mount(&mock_server)
        .await;

    let session = BackendSession::new(backend(&mock_server));
    let reply = session.chat(&RecordStore::default(), "hello").await.unwrap();
    assert_eq!(reply, CHAT_FALLBACK);
}

#[tokio::test]
async fn chat_unreachable_backend_falls_back() {
    let client = HttpBackend::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    let session = BackendSession::new(client);
    let reply = session.chat(&RecordStore::default(), "hello").await.unwrap();
    assert_eq!(reply, CHAT_FALLBACK);
}
