use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use readaloud_config::SpeechConfig;

use crate::{SUBSCRIPTION_KEY_HEADER, error::TokenError, http_client::http_client};

/// Issues short-lived speech access tokens for direct browser use
pub struct TokenIssuer {
    client: Client,
    endpoint: String,
    subscription_key: SecretString,
}

impl TokenIssuer {
    pub fn new(config: &SpeechConfig) -> Result<Self, TokenError> {
        let client = http_client(config.timeout()).map_err(|e| TokenError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.token_endpoint(),
            subscription_key: config.subscription_key.clone(),
        })
    }

    /// Exchange the subscription key for an access token
    pub async fn issue(&self) -> Result<SecretString, TokenError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(SUBSCRIPTION_KEY_HEADER, self.subscription_key.expose_secret())
            .body("")
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "token request failed");
                TokenError::ConnectionError(format!("Failed to send request to token endpoint: {e}"))
            })?;

        let status = response.status();

        if !status.is_success() {
            tracing::error!(%status, "token endpoint rejected request");
            return Err(TokenError::ProviderApiError { status: status.as_u16() });
        }

        let token = response.text().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read token response");
            TokenError::ConnectionError(format!("Failed to read token response: {e}"))
        })?;

        Ok(SecretString::from(token))
    }
}
