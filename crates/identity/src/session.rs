use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use http::{HeaderMap, header};
use mini_moka::sync::Cache;
use readaloud_config::SessionConfig;
use readaloud_core::UserProfile;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::IdentityError;

type HmacSha256 = Hmac<Sha256>;

/// Tokens kept for a signed-in user
#[derive(Debug, Clone)]
pub struct TokenBundle {
    pub id_token: SecretString,
    pub access_token: SecretString,
    /// When the access token stops being valid
    pub expires_at: Option<Instant>,
}

impl TokenBundle {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// The signed-in user attached to a session
#[derive(Debug, Clone)]
pub struct SignedInUser {
    pub tokens: TokenBundle,
    pub profile: UserProfile,
    /// Identity token claims, shown on the home page
    pub claims: serde_json::Value,
}

/// Server-side state of one browser session
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// `state` issued by the last login redirect, consumed by the callback
    pub login_state: Option<String>,
    pub user: Option<SignedInUser>,
}

/// In-memory session store keyed by session id
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<String, Arc<Session>>,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .time_to_idle(idle_ttl)
            .max_capacity(capacity)
            .build();

        Self { cache }
    }

    /// Look up a live session
    ///
    /// A session whose token bundle has expired is removed and reported as absent.
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        let session = self.cache.get(&id.to_string())?;

        let expired = session
            .user
            .as_ref()
            .is_some_and(|user| user.tokens.is_expired(Instant::now()));

        if expired {
            tracing::debug!("Session token expired, dropping session");
            self.cache.invalidate(&id.to_string());
            return None;
        }

        Some(session)
    }

    pub fn put(&self, id: &str, session: Session) {
        self.cache.insert(id.to_string(), Arc::new(session));
    }

    pub fn remove(&self, id: &str) {
        self.cache.invalidate(&id.to_string());
    }
}

/// Issues and verifies the signed session cookie
///
/// The cookie value is `{session_id}.{signature}` where the signature is the unpadded base64url
/// HMAC-SHA256 of the id, keyed with the session secret.
pub struct SessionCookie {
    name: String,
    key: HmacSha256,
    secure: bool,
    max_age: u64,
}

impl SessionCookie {
    pub fn new(config: &SessionConfig) -> Result<Self, IdentityError> {
        let key = HmacSha256::new_from_slice(config.secret.expose_secret().as_bytes())
            .map_err(|e| IdentityError::ConfigError(format!("invalid session secret: {e}")))?;

        Ok(Self {
            name: config.cookie_name.clone(),
            key,
            secure: config.secure_cookie,
            max_age: config.ttl_seconds,
        })
    }

    /// Fresh random session id
    pub fn new_session_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// `Set-Cookie` value binding the browser to `id`
    pub fn issue(&self, id: &str) -> String {
        self.attributes(&format!("{id}.{}", self.sign(id)), self.max_age)
    }

    /// `Set-Cookie` value that removes the cookie
    pub fn clear(&self) -> String {
        self.attributes("", 0)
    }

    /// Session id carried by the request, if its signature is valid
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == self.name).then_some(value)
            })?;

        let (id, signature) = value.rsplit_once('.')?;

        let verified = URL_SAFE_NO_PAD
            .decode(signature)
            .is_ok_and(|signature| self.keyed(id).verify_slice(&signature).is_ok());

        if !verified {
            tracing::debug!("Ignoring session cookie with invalid signature");
            return None;
        }

        Some(id.to_string())
    }

    fn attributes(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!("{}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}", self.name);

        if self.secure {
            cookie.push_str("; Secure");
        }

        cookie
    }

    fn sign(&self, id: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.keyed(id).finalize().into_bytes())
    }

    fn keyed(&self, id: &str) -> HmacSha256 {
        let mut mac = self.key.clone();
        mac.update(id.as_bytes());
        mac
    }
}
