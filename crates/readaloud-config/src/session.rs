use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Server-side session configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Secret used to sign session cookies
    pub secret: SecretString,
    /// Name of the session cookie
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Idle lifetime of a session in seconds
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    /// Mark the cookie `Secure` (HTTPS deployments)
    #[serde(default)]
    pub secure_cookie: bool,
    /// Maximum number of live sessions
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl SessionConfig {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

fn default_cookie_name() -> String {
    "readaloud_session".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_ttl_seconds() -> u64 {
    86_400
}

#[allow(clippy::missing_const_for_fn)]
fn default_capacity() -> u64 {
    10_000
}
