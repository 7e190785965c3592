use std::net::SocketAddr;

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use dual_capture_core::{CaptureError, CaptureKind, CaptureStore, NewCapture};
use dual_capture_server::{serve, ErrorBody, HttpCaptureStore, MemoryStorage};

struct TestServer {
    addr: SocketAddr,
    storage: MemoryStorage,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start(storage: MemoryStorage) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let served = storage.clone();
        tokio::spawn(async move {
            serve(listener, served, async move {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });
        Self {
            addr,
            storage,
            shutdown: Some(tx),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    fn store(&self) -> HttpCaptureStore {
        HttpCaptureStore::new(format!("http://{}/", self.addr)).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

fn body(kind: &str) -> Value {
    json!({
        "title": "Studio take",
        "type": kind,
        "landscapeUrl": "https://cdn.example/l.webm",
        "portraitUrl": "https://cdn.example/p.webm",
    })
}

#[tokio::test]
async fn post_creates_record() {
    let server = TestServer::start(MemoryStorage::new()).await;
    let client = reqwest::Client::new();

    let response = client.post(server.url("/api/captures")).json(&body("video")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let record: Value = response.json().await.unwrap();
    assert_eq!(record["id"], 1);
    assert_eq!(record["type"], "video");
    assert_eq!(record["title"], "Studio take");
    assert!(record["createdAt"].is_string());
    assert_eq!(server.storage.len(), 1);
}

#[tokio::test]
async fn post_with_bad_type_names_field() {
    let server = TestServer::start(MemoryStorage::new()).await;
    let client = reqwest::Client::new();

    let response = client.post(server.url("/api/captures")).json(&body("gif")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let error: ErrorBody = response.json().await.unwrap();
    assert_eq!(error.field.as_deref(), Some("type"));
    assert!(error.message.starts_with("Invalid enum value"));

    let mut missing = body("video");
    missing.as_object_mut().unwrap().remove("type");
    let response = client.post(server.url("/api/captures")).json(&missing).send().await.unwrap();
    let error: ErrorBody = response.json().await.unwrap();
    assert_eq!(error, ErrorBody { message: "Required".into(), field: Some("type".into()) });

    assert!(server.storage.is_empty());
}

#[tokio::test]
async fn malformed_json_has_no_field() {
    let server = TestServer::start(MemoryStorage::new()).await;
    let response = reqwest::Client::new()
        .post(server.url("/api/captures"))
        .header("content-type", "application/json")
        .body("{\"title\":")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let error: Value = response.json().await.unwrap();
    assert!(error.get("field").is_none());
    assert!(error["message"].is_string());
}

#[tokio::test]
async fn unknown_or_non_integer_id_is_not_found() {
    let server = TestServer::start(MemoryStorage::new()).await;
    let client = reqwest::Client::new();

    for path in ["/api/captures/42", "/api/captures/abc"] {
        let response = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND, "{path}");
        let error: ErrorBody = response.json().await.unwrap();
        assert_eq!(error.message, "Capture not found");
    }
}

#[tokio::test]
async fn list_keeps_insertion_order_and_is_idempotent() {
    let storage = MemoryStorage::new();
    storage.seed_demo().unwrap();
    let server = TestServer::start(storage).await;
    let store = server.store();

    let created = store
        .create(NewCapture {
            title: "Third".into(),
            kind: CaptureKind::Photo,
            landscape_url: "file:///tmp/l.png".into(),
            portrait_url: "file:///tmp/p.png".into(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, 3);

    let first = store.list().await.unwrap();
    let second = store.list().await.unwrap();
    assert_eq!(first, second);

    let titles: Vec<_> = first.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Test Video Capture", "Test Photo Capture", "Third"]);
}

#[tokio::test]
async fn client_maps_statuses() {
    let server = TestServer::start(MemoryStorage::new()).await;
    let store = server.store();

    assert_eq!(store.get(9).await.unwrap(), None);

    let record = store
        .create(NewCapture {
            title: "Clip".into(),
            kind: CaptureKind::Video,
            landscape_url: "a".into(),
            portrait_url: "b".into(),
        })
        .await
        .unwrap();
    assert_eq!(store.get(record.id).await.unwrap(), Some(record));
}

#[tokio::test]
async fn client_rejects_blank_fields_before_sending() {
    let server = TestServer::start(MemoryStorage::new()).await;
    let store = server.store();

    let err = store
        .create(NewCapture {
            title: "Clip".into(),
            kind: CaptureKind::Video,
            landscape_url: String::new(),
            portrait_url: "b".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err, CaptureError::validation("Must not be empty", "landscapeUrl"));
    assert!(server.storage.is_empty());
}

#[tokio::test]
async fn server_accepts_empty_strings() {
    let server = TestServer::start(MemoryStorage::new()).await;
    let mut empty = body("photo");
    empty["title"] = json!("");

    let response = reqwest::Client::new()
        .post(server.url("/api/captures"))
        .json(&empty)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
}

#[tokio::test]
async fn explicit_null_reports_expected_string() {
    let server = TestServer::start(MemoryStorage::new()).await;
    let mut nulled = body("video");
    nulled["portraitUrl"] = Value::Null;

    let response = reqwest::Client::new()
        .post(server.url("/api/captures"))
        .json(&nulled)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let error: ErrorBody = response.json().await.unwrap();
    assert_eq!(
        error,
        ErrorBody { message: "Expected string, received null".into(), field: Some("portraitUrl".into()) }
    );
}

#[tokio::test]
async fn client_reports_unreachable_service() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = HttpCaptureStore::new(format!("http://{}", addr)).unwrap();
    let err = store.list().await.unwrap_err();
    assert!(matches!(err, CaptureError::PersistenceFailed(_)));
}
