#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use finpal::client::ApiClient;
use finpal::session::{SessionContext, SessionToken};
use serde_json::{json, Value};
use tracing_subscriber::fmt::MakeWriter;

/// One request as seen by the stub backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Value,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    failure: Option<StatusCode>,
}

/// In-process stand-in for the finance backend routes
pub struct StubBackend {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubBackend {
    /// Every route answers 200 with an echo of the request
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(None).await
    }

    /// Every route answers with `status` and a `{"message": "boom"}` body
    pub async fn failing(status: StatusCode) -> Result<Self> {
        Self::spawn_with(Some(status)).await
    }

    async fn spawn_with(failure: Option<StatusCode>) -> Result<Self> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            requests: requests.clone(),
            failure,
        };
        let router = Router::new().fallback(record).with_state(state);
        let base_url = serve(router).await?;
        Ok(Self { base_url, requests })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request, got {:?}", requests);
        requests.into_iter().next().unwrap()
    }
}

async fn record(State(state): State<StubState>, method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        body: body.clone(),
        authorization,
    });

    if let Some(status) = state.failure {
        return (status, Json(json!({ "message": "boom" }))).into_response();
    }

    if uri.path() == "/badges/names" && body["badgeNames"].as_array().map_or(false, |a| a.is_empty()) {
        return Json(json!([])).into_response();
    }

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "body": body,
    }))
    .into_response()
}

/// Serve a router on a free localhost port, returning its base URL
pub async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

pub fn client(base_url: &str, token: Option<&str>) -> ApiClient {
    let session = SessionContext::in_memory(token.and_then(SessionToken::parse));
    ApiClient::new(base_url, Duration::from_secs(5), session).expect("valid test base url")
}

/// Base URL nothing is listening on
pub fn dead_base_url() -> String {
    let port = portpicker::pick_unused_port().expect("free port");
    format!("http://127.0.0.1:{}", port)
}

/// Collects formatted log output for the current thread
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install a thread-local subscriber; `#[tokio::test]` runs on one thread so
/// every log emitted by the test body lands in the capture.
pub fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (capture, guard)
}
