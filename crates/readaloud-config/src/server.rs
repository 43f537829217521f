use std::net::SocketAddr;

use serde::Deserialize;
use url::Url;

/// HTTP server configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind (default `0.0.0.0:3000`)
    #[serde(default)]
    pub listen_address: Option<SocketAddr>,
    /// External base URL, used to build login callback and logout return URLs
    pub public_url: Url,
    #[serde(default)]
    pub health: HealthConfig,
}

impl ServerConfig {
    /// Absolute URL for a path under the public base URL
    pub fn public_link(&self, path: &str) -> String {
        format!("{}{path}", self.public_url.as_str().trim_end_matches('/'))
    }
}

/// Health check endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_path(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_path() -> String {
    "/health".to_string()
}
