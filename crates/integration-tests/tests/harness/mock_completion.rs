//! Mock text-completion API returning a canned practice paragraph

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

pub const PARAGRAPH: &str = "Sam the seal swam in the sea. He saw a shiny shell. Sam smiled.";

/// Mock completion backend
pub struct MockCompletions {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    fail: bool,
    requests: Mutex<Vec<Value>>,
    authorization: Mutex<Option<String>>,
}

impl MockCompletions {
    /// Start a backend that answers every request with [`PARAGRAPH`]
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(false).await
    }

    /// Start a backend that answers every request with HTTP 500
    pub async fn start_failing() -> anyhow::Result<Self> {
        Self::start_inner(true).await
    }

    async fn start_inner(fail: bool) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            fail,
            requests: Mutex::new(Vec::new()),
            authorization: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/completions", routing::post(handle_completion))
            .with_state(Arc::clone(&state));

        let (addr, shutdown) = super::server::spawn_mock(app).await?;

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL including `/v1`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// `Authorization` header of the last request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.authorization.lock().unwrap().clone()
    }
}

impl Drop for MockCompletions {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_completion(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(body);
    *state.authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    if state.fail {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "message": "The server had an error", "type": "server_error" } })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "cmpl-mock",
            "object": "text_completion",
            "model": "gpt-3.5-turbo-instruct",
            "choices": [{ "text": format!("\n\n{PARAGRAPH}"), "index": 0, "finish_reason": "stop" }],
        })),
    )
}
