//! Mock identity provider and user store

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Form, Json, Router, routing};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Authorization code the mock provider exchanges successfully
pub const GOOD_CODE: &str = "good-code";

/// Mock identity provider (token endpoint) plus a user store on the same port
pub struct MockIdentity {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    claims: Value,
    exchanges: Mutex<Vec<TokenForm>>,
    store_calls: Mutex<Vec<(String, String)>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenForm {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub code: String,
    pub redirect_uri: String,
}

impl MockIdentity {
    /// Start a provider whose identity tokens carry `claims`
    pub async fn start(claims: Value) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            claims,
            exchanges: Mutex::new(Vec::new()),
            store_calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/oauth/token", routing::post(handle_token))
            .route("/api/mutation", routing::post(handle_store))
            .route("/api/query", routing::post(handle_store))
            .with_state(Arc::clone(&state));

        let (addr, shutdown) = super::server::spawn_mock(app).await?;

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Token exchanges received so far
    pub fn exchanges(&self) -> Vec<TokenForm> {
        self.state.exchanges.lock().unwrap().clone()
    }

    /// `(function path, authorization)` of user store calls received so far
    pub fn store_calls(&self) -> Vec<(String, String)> {
        self.state.store_calls.lock().unwrap().clone()
    }
}

impl Drop for MockIdentity {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Identity token in JWT form; the signature is not checked by the server
pub fn id_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT","kid":"mock"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signature = URL_SAFE_NO_PAD.encode(b"mock-signature");

    format!("{header}.{payload}.{signature}")
}

async fn handle_token(State(state): State<Arc<MockState>>, Form(form): Form<TokenForm>) -> impl IntoResponse {
    state.exchanges.lock().unwrap().push(form.clone());

    if form.code != GOOD_CODE || form.client_id != super::config::CLIENT_ID {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "invalid_grant", "error_description": "Invalid authorization code" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "access_token": "mock-access-token",
            "id_token": id_token(&state.claims),
            "scope": "openid profile email",
            "expires_in": 86400,
            "token_type": "Bearer",
        })),
    )
}

async fn handle_store(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let path = body["path"].as_str().unwrap_or_default().to_owned();
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    state.store_calls.lock().unwrap().push((path.clone(), authorization));

    let value = if path.ends_with(":put") {
        json!("j57mock")
    } else {
        json!({ "_id": "j57mock", "name": state.claims["name"] })
    };

    Json(json!({ "status": "success", "value": value, "logLines": [] }))
}
