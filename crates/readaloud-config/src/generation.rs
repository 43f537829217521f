use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Text-completion endpoint used to write practice paragraphs
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Bearer key for the completion API
    pub api_key: SecretString,
    /// API base URL (the `/completions` path is appended)
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl GenerationConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_base_url() -> Url {
    Url::parse("https://api.openai.com/v1").expect("valid default URL")
}

fn default_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_temperature() -> f32 {
    1.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_tokens() -> u32 {
    120
}

#[allow(clippy::missing_const_for_fn)]
fn default_top_p() -> f32 {
    1.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_seconds() -> u64 {
    30
}
