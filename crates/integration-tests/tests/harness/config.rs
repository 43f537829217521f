//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use readaloud_config::{
    Config, GenerationConfig, HealthConfig, IdentityConfig, ProfileConfig, ServerConfig, SessionConfig,
    SpeechConfig, UserStoreConfig,
};
use secrecy::SecretString;
use url::Url;

/// Subscription key the mock speech service accepts
pub const SPEECH_KEY: &str = "test-speech-key";
/// Client id the mock identity provider accepts
pub const CLIENT_ID: &str = "test-client";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with every upstream pointing at an unreachable address
    pub fn new() -> Self {
        let unreachable = "http://127.0.0.1:1";

        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    public_url: Url::parse("http://readaloud.test").expect("valid URL"),
                    health: HealthConfig::default(),
                },
                session: SessionConfig {
                    secret: SecretString::from("integration-test-session-secret"),
                    cookie_name: "readaloud_session".to_owned(),
                    ttl_seconds: 3600,
                    secure_cookie: false,
                    capacity: 100,
                },
                identity: IdentityConfig {
                    domain: "tenant.readaloud.test".to_owned(),
                    client_id: CLIENT_ID.to_owned(),
                    client_secret: SecretString::from("test-client-secret"),
                    scope: "openid profile email".to_owned(),
                    base_url: Some(Url::parse(unreachable).expect("valid URL")),
                },
                user_store: None,
                speech: SpeechConfig {
                    subscription_key: SecretString::from(SPEECH_KEY),
                    region: "eastus".to_owned(),
                    language: "en-US".to_owned(),
                    voice: "en-US-JennyNeural".to_owned(),
                    timeout_seconds: 5,
                    token_url: Some(Url::parse(unreachable).expect("valid URL")),
                    assessment_url: Some(Url::parse(unreachable).expect("valid URL")),
                    synthesis_url: Some(Url::parse("ws://127.0.0.1:1").expect("valid URL")),
                },
                generation: GenerationConfig {
                    api_key: SecretString::from("test-completion-key"),
                    base_url: Url::parse(unreachable).expect("valid URL"),
                    model: "gpt-3.5-turbo-instruct".to_owned(),
                    temperature: 1.0,
                    max_tokens: 120,
                    top_p: 1.0,
                    timeout_seconds: 5,
                },
                profile: ProfileConfig::default(),
                telemetry: None,
            },
        }
    }

    /// Point login and token exchange at a mock identity provider
    pub fn with_identity_provider(mut self, base_url: &str) -> Self {
        self.config.identity.base_url = Some(base_url.parse().expect("valid URL"));
        self
    }

    /// Record sign-ins in a mock user store
    pub fn with_user_store(mut self, base_url: &str) -> Self {
        self.config.user_store = Some(UserStoreConfig {
            url: base_url.parse().expect("valid URL"),
            put_mutation: "addUser:put".to_owned(),
            me_query: "addUser:me".to_owned(),
        });
        self
    }

    /// Point paragraph generation at a mock completion API
    pub fn with_completions(mut self, base_url: &str) -> Self {
        self.config.generation.base_url = base_url.parse().expect("valid URL");
        self
    }

    /// Point tokens, assessment and synthesis at a mock speech service
    pub fn with_speech(mut self, addr: SocketAddr) -> Self {
        let speech = &mut self.config.speech;
        speech.token_url = Some(format!("http://{addr}/sts/v1.0/issueToken").parse().expect("valid URL"));
        speech.assessment_url = Some(
            format!("http://{addr}/speech/recognition/conversation/cognitiveservices/v1")
                .parse()
                .expect("valid URL"),
        );
        speech.synthesis_url = Some(
            format!("ws://{addr}/cognitiveservices/websocket/v1")
                .parse()
                .expect("valid URL"),
        );
        self
    }

    /// Bound every speech call by `seconds`
    pub fn with_speech_timeout(mut self, seconds: u64) -> Self {
        self.config.speech.timeout_seconds = seconds;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
