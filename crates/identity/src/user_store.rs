use std::{sync::Arc, time::Duration};

use readaloud_config::UserStoreConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::IdentityError;

/// Document store that records who has signed in
pub struct UserStore {
    http: reqwest::Client,
    base: String,
    put_mutation: String,
    me_query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionResponse {
    status: String,
    #[serde(default)]
    value: Value,
    error_message: Option<String>,
}

impl UserStore {
    pub fn new(config: &UserStoreConfig, timeout: Duration) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdentityError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base: config.url.as_str().trim_end_matches('/').to_string(),
            put_mutation: config.put_mutation.clone(),
            me_query: config.me_query.clone(),
        })
    }

    /// Upsert the token's user, then read the stored record back
    pub async fn sync(&self, id_token: &SecretString) -> Result<Value, IdentityError> {
        let id = self.call("mutation", &self.put_mutation, id_token).await?;
        tracing::debug!(user_id = %id, "User record upserted");

        self.call("query", &self.me_query, id_token).await
    }

    /// Run [`Self::sync`] in the background; failures are only logged
    pub fn spawn_sync(self: &Arc<Self>, id_token: SecretString) {
        let store = Arc::clone(self);

        tokio::spawn(async move {
            match store.sync(&id_token).await {
                Ok(me) => tracing::debug!(user = %me, "User store synchronized"),
                Err(e) => tracing::warn!("User store synchronization failed: {e}"),
            }
        });
    }

    async fn call(&self, kind: &str, path: &str, id_token: &SecretString) -> Result<Value, IdentityError> {
        let response = self
            .http
            .post(format!("{}/api/{kind}", self.base))
            .bearer_auth(id_token.expose_secret())
            .json(&json!({ "path": path, "args": {}, "format": "json" }))
            .send()
            .await
            .map_err(|e| IdentityError::UserStoreError(format!("{path}: {e}")))?;

        let status = response.status();
        let body: FunctionResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::UserStoreError(format!("{path}: HTTP {status}: {e}")))?;

        if body.status != "success" {
            return Err(IdentityError::UserStoreError(format!(
                "{path}: {}",
                body.error_message.unwrap_or(body.status)
            )));
        }

        Ok(body.value)
    }
}
