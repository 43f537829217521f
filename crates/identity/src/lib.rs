#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod claims;
mod client;
mod error;
mod session;
mod user_store;

use std::{sync::Arc, time::Duration};

use axum::{
    Form, Router,
    extract::{Query, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::get,
};
use rand::{Rng, distr::Alphanumeric};
use readaloud_core::UserProfile;
use secrecy::ExposeSecret;
use serde::Deserialize;

pub use client::IdentityClient;
pub use error::{IdentityError, Result};
pub use session::{Session, SessionCookie, SessionStore, SignedInUser, TokenBundle};
pub use user_store::UserStore;

/// Where the browser goes after a successful login
pub const LANDING_PATH: &str = "/listening";

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);
const LOGIN_STATE_LEN: usize = 32;

/// Shared state for login, callback, logout and the session middleware
pub struct IdentityState {
    client: IdentityClient,
    sessions: SessionStore,
    cookie: SessionCookie,
    user_store: Option<Arc<UserStore>>,
    fallback_profile: UserProfile,
    home_url: String,
}

impl IdentityState {
    /// Signed-in user of the session the request belongs to
    pub fn current_user(&self, headers: &HeaderMap) -> Option<SignedInUser> {
        let id = self.cookie.read(headers)?;
        self.sessions.get(&id)?.user.clone()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }
}

/// Build identity state from configuration
pub fn build_state(config: &readaloud_config::Config) -> anyhow::Result<Arc<IdentityState>> {
    let client = IdentityClient::new(
        &config.identity,
        config.server.public_link("/callback"),
        PROVIDER_TIMEOUT,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize identity client: {e}"))?;

    let user_store = config
        .user_store
        .as_ref()
        .map(|store| UserStore::new(store, PROVIDER_TIMEOUT).map(Arc::new))
        .transpose()
        .map_err(|e| anyhow::anyhow!("Failed to initialize user store: {e}"))?;

    let fallback = &config.profile;

    Ok(Arc::new(IdentityState {
        client,
        sessions: SessionStore::new(config.session.ttl(), config.session.capacity),
        cookie: SessionCookie::new(&config.session)
            .map_err(|e| anyhow::anyhow!("Failed to initialize session cookie: {e}"))?,
        user_store,
        fallback_profile: UserProfile::new(&fallback.name, &fallback.age, &fallback.skill_rating),
        home_url: config.server.public_link("/"),
    }))
}

/// Create the login, callback and logout routes
pub fn endpoint_router() -> Router<Arc<IdentityState>> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback_query).post(callback_form))
        .route("/logout", get(logout))
}

/// Attach the signed-in user's [`UserProfile`] and [`SignedInUser`] to the request
pub async fn session_middleware(State(state): State<Arc<IdentityState>>, mut request: Request, next: Next) -> Response {
    if let Some(user) = state.current_user(request.headers()) {
        request.extensions_mut().insert(user.profile.clone());
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn login(State(state): State<Arc<IdentityState>>, headers: HeaderMap) -> Result<Response> {
    let existing = state
        .cookie
        .read(&headers)
        .and_then(|id| state.sessions.get(&id).map(|session| (id, session)));

    let (id, mut session) = match existing {
        Some((id, session)) => (id, (*session).clone()),
        None => (SessionCookie::new_session_id(), Session::default()),
    };

    let login_state: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(LOGIN_STATE_LEN)
        .map(char::from)
        .collect();

    let authorize = state.client.authorize_url(&login_state)?;

    session.login_state = Some(login_state);
    state.sessions.put(&id, session);

    tracing::debug!("Redirecting to identity provider");

    Ok((
        AppendHeaders([(header::SET_COOKIE, state.cookie.issue(&id))]),
        Redirect::to(authorize.as_str()),
    )
        .into_response())
}

async fn callback_query(
    State(state): State<Arc<IdentityState>>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    complete_login(&state, &headers, params).await
}

async fn callback_form(
    State(state): State<Arc<IdentityState>>,
    headers: HeaderMap,
    Form(params): Form<CallbackParams>,
) -> Result<Response> {
    complete_login(&state, &headers, params).await
}

async fn complete_login(state: &IdentityState, headers: &HeaderMap, params: CallbackParams) -> Result<Response> {
    let id = state.cookie.read(headers).ok_or(IdentityError::MissingLoginState)?;
    let session = state.sessions.get(&id).ok_or(IdentityError::MissingLoginState)?;
    let expected = session.login_state.clone().ok_or(IdentityError::MissingLoginState)?;

    if params.state.as_deref() != Some(expected.as_str()) {
        tracing::warn!("Login callback state does not match the session");
        return Err(IdentityError::StateMismatch);
    }

    // The state is single use
    let mut consumed = (*session).clone();
    consumed.login_state = None;
    state.sessions.put(&id, consumed);

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Identity provider refused the login");
        return Err(IdentityError::LoginRejected(params.error_description.unwrap_or(error)));
    }

    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or(IdentityError::MissingCode)?;

    let tokens = state.client.exchange_code(&code).await?;
    let claims = claims::decode(tokens.id_token.expose_secret())?;
    let profile = claims::profile(&claims, &state.fallback_profile);

    if let Some(store) = &state.user_store {
        store.spawn_sync(tokens.id_token.clone());
    }

    tracing::info!(user = %profile.name, "User signed in");

    // Sign-in gets a fresh session id
    state.sessions.remove(&id);
    let id = SessionCookie::new_session_id();
    state.sessions.put(
        &id,
        Session {
            login_state: None,
            user: Some(SignedInUser { tokens, profile, claims }),
        },
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, state.cookie.issue(&id))]),
        Redirect::to(LANDING_PATH),
    )
        .into_response())
}

async fn logout(State(state): State<Arc<IdentityState>>, headers: HeaderMap) -> Result<Response> {
    if let Some(id) = state.cookie.read(&headers) {
        state.sessions.remove(&id);
    }

    let destination = state.client.logout_url(&state.home_url)?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, state.cookie.clear())]),
        Redirect::to(destination.as_str()),
    )
        .into_response())
}
