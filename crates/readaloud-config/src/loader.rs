use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::Config;

const MIN_SESSION_SECRET_LEN: usize = 16;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Expands `{{ env.VAR }}` placeholders before parsing, then validates.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a referenced environment
    /// variable is missing, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if a secret is empty or a numeric setting is out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_server()?;
        self.validate_secrets()?;
        self.validate_speech()?;
        self.validate_generation()?;
        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        let scheme = self.server.public_url.scheme();

        if scheme != "http" && scheme != "https" {
            anyhow::bail!("server.public_url must be an http(s) URL");
        }

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }

    fn validate_secrets(&self) -> anyhow::Result<()> {
        require_secret("session.secret", &self.session.secret)?;

        if self.session.secret.expose_secret().len() < MIN_SESSION_SECRET_LEN {
            anyhow::bail!("session.secret must be at least {MIN_SESSION_SECRET_LEN} bytes");
        }

        if self.session.ttl_seconds == 0 {
            anyhow::bail!("session.ttl_seconds must be greater than 0");
        }

        if self.identity.domain.trim().is_empty() {
            anyhow::bail!("identity.domain must not be empty");
        }

        if self.identity.client_id.trim().is_empty() {
            anyhow::bail!("identity.client_id must not be empty");
        }

        require_secret("identity.client_secret", &self.identity.client_secret)?;
        require_secret("speech.subscription_key", &self.speech.subscription_key)?;
        require_secret("generation.api_key", &self.generation.api_key)?;

        Ok(())
    }

    fn validate_speech(&self) -> anyhow::Result<()> {
        if self.speech.region.trim().is_empty() {
            anyhow::bail!("speech.region must not be empty");
        }

        if self.speech.voice.trim().is_empty() {
            anyhow::bail!("speech.voice must not be empty");
        }

        if self.speech.timeout_seconds == 0 {
            anyhow::bail!("speech.timeout_seconds must be greater than 0");
        }

        Ok(())
    }

    fn validate_generation(&self) -> anyhow::Result<()> {
        let generation = &self.generation;

        if generation.max_tokens == 0 {
            anyhow::bail!("generation.max_tokens must be greater than 0");
        }

        if !(0.0..=2.0).contains(&generation.temperature) {
            anyhow::bail!("generation.temperature must be between 0 and 2");
        }

        if generation.top_p <= 0.0 || generation.top_p > 1.0 {
            anyhow::bail!("generation.top_p must be in (0, 1]");
        }

        if generation.timeout_seconds == 0 {
            anyhow::bail!("generation.timeout_seconds must be greater than 0");
        }

        Ok(())
    }
}

fn require_secret(name: &str, secret: &SecretString) -> anyhow::Result<()> {
    if secret.expose_secret().trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }

    Ok(())
}
