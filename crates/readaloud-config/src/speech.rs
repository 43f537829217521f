use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Speech service configuration shared by assessment, synthesis and token issuing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// Subscription key sent as `Ocp-Apim-Subscription-Key`
    pub subscription_key: SecretString,
    /// Service region, e.g. `eastus`
    #[serde(default = "default_region")]
    pub region: String,
    /// Recognition language for pronunciation assessment
    #[serde(default = "default_language")]
    pub language: String,
    /// Synthesis voice name
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Upper bound for a single outbound call, in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Override for the token issuing endpoint
    #[serde(default)]
    pub token_url: Option<Url>,
    /// Override for the pronunciation assessment endpoint (query string is appended)
    #[serde(default)]
    pub assessment_url: Option<Url>,
    /// Override for the synthesis WebSocket endpoint
    #[serde(default)]
    pub synthesis_url: Option<Url>,
}

impl SpeechConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Endpoint issuing short-lived access tokens
    pub fn token_endpoint(&self) -> String {
        self.token_url.as_ref().map_or_else(
            || format!("https://{}.api.cognitive.microsoft.com/sts/v1.0/issueToken", self.region),
            ToString::to_string,
        )
    }

    /// Region- and language-qualified pronunciation assessment endpoint
    pub fn assessment_endpoint(&self) -> String {
        let base = self.assessment_url.as_ref().map_or_else(
            || {
                format!(
                    "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
                    self.region
                )
            },
            ToString::to_string,
        );

        format!("{base}?language={}&usePipelineVersion=0", self.language)
    }

    /// Synthesis WebSocket endpoint
    pub fn synthesis_endpoint(&self) -> String {
        self.synthesis_url.as_ref().map_or_else(
            || format!("wss://{}.tts.speech.microsoft.com/cognitiveservices/websocket/v1", self.region),
            ToString::to_string,
        )
    }
}

fn default_region() -> String {
    "eastus".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_seconds() -> u64 {
    30
}
