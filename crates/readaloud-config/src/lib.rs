#![allow(clippy::must_use_candidate)]

mod env;
pub mod generation;
pub mod identity;
mod loader;
pub mod profile;
pub mod server;
pub mod session;
pub mod speech;
pub mod telemetry;

use serde::Deserialize;

pub use generation::*;
pub use identity::*;
pub use profile::*;
pub use server::*;
pub use session::*;
pub use speech::*;
pub use telemetry::*;

/// Top-level readaloud configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Browser session configuration
    pub session: SessionConfig,
    /// Identity provider configuration
    pub identity: IdentityConfig,
    /// Document store that receives the signed-in user's identity
    #[serde(default)]
    pub user_store: Option<UserStoreConfig>,
    /// Speech service configuration (assessment, synthesis, tokens)
    pub speech: SpeechConfig,
    /// Text-completion configuration for practice paragraphs
    pub generation: GenerationConfig,
    /// Fallback reader profile
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
