use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use readaloud_config::GenerationConfig;
use readaloud_core::UserProfile;
use url::Url;

use crate::{
    error::{GenerationError, Result},
    protocol::{CompletionRequest, CompletionResponse},
};

/// Instruction sent for every practice paragraph
pub const PRACTICE_PROMPT: &str = "Write a reading comprehension paragraph for child to practice reading. \
Include a range of beginner to intermediate level text. Have 3 full sentences max. \
The story doesn't have to necessarily include them:";

/// Writes short practice paragraphs with a remote text-completion model
pub struct ParagraphGenerator {
    client: Client,
    completions_url: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl ParagraphGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GenerationError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            completions_url: completions_url(&config.base_url),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        })
    }

    /// Generate one paragraph for `profile`
    ///
    /// The profile is accepted but not yet interpolated into the prompt; every
    /// reader currently receives the same instruction.
    pub async fn generate(&self, profile: &UserProfile) -> Result<String> {
        // TODO: interpolate age and skill rating once prompt wording for them is agreed
        tracing::debug!(
            reader = %profile.name,
            age = %profile.age,
            skill_rating = %profile.skill_rating,
            "profile not interpolated into practice prompt"
        );

        let body = CompletionRequest {
            model: &self.model,
            prompt: PRACTICE_PROMPT,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        };

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "completion request failed");
                GenerationError::ConnectionError(format!("Failed to send request to completion API: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("completion API error ({status}): {message}");

            return Err(GenerationError::ProviderApiError {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse completion response");
            GenerationError::MalformedResponse(e.to_string())
        })?;

        completion.into_paragraph().ok_or(GenerationError::EmptyCompletion)
    }
}

fn completions_url(base_url: &Url) -> String {
    format!("{}/completions", base_url.as_str().trim_end_matches('/'))
}
