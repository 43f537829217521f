use std::time::{Duration, Instant};

use readaloud_config::IdentityConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::{error::IdentityError, session::TokenBundle};

/// OAuth 2.0 / OpenID Connect client for the identity provider
pub struct IdentityClient {
    http: reqwest::Client,
    base: String,
    client_id: String,
    client_secret: SecretString,
    scope: String,
    redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: Option<String>,
    error_description: Option<String>,
}

impl IdentityClient {
    pub fn new(config: &IdentityConfig, redirect_uri: String, timeout: Duration) -> Result<Self, IdentityError> {
        let base = config
            .endpoint_base()
            .map_err(|e| IdentityError::ConfigError(format!("invalid identity domain: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base: base.as_str().trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
            redirect_uri,
        })
    }

    /// Provider login page for a fresh `state`
    pub fn authorize_url(&self, state: &str) -> Result<Url, IdentityError> {
        Url::parse_with_params(
            &format!("{}/authorize", self.base),
            [
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", self.scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| IdentityError::ConfigError(e.to_string()))
    }

    /// Provider logout page that returns the browser to `return_to`
    pub fn logout_url(&self, return_to: &str) -> Result<Url, IdentityError> {
        Url::parse_with_params(
            &format!("{}/v2/logout", self.base),
            [("returnTo", return_to), ("client_id", self.client_id.as_str())],
        )
        .map_err(|e| IdentityError::ConfigError(e.to_string()))
    }

    /// Exchange an authorization code for the user's tokens
    pub async fn exchange_code(&self, code: &str) -> Result<TokenBundle, IdentityError> {
        let url = format!("{}/oauth/token", self.base);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Token exchange request failed: {e}");
                IdentityError::ConnectionError(e.to_string())
            })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or(body);

            tracing::warn!(status = status.as_u16(), "Identity provider rejected code exchange: {message}");

            return Err(IdentityError::AuthExchangeError {
                status: status.as_u16(),
                message,
            });
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidToken(format!("unreadable token response: {e}")))?;

        let id_token = tokens
            .id_token
            .ok_or_else(|| IdentityError::InvalidToken("token response has no id_token".to_string()))?;

        Ok(TokenBundle {
            id_token: SecretString::from(id_token),
            access_token: SecretString::from(tokens.access_token),
            expires_at: tokens
                .expires_in
                .and_then(|seconds| Instant::now().checked_add(Duration::from_secs(seconds))),
        })
    }
}
