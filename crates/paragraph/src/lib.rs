#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod error;
mod generator;
mod protocol;

use std::sync::Arc;

use axum::{Extension, Json, Router, extract::State, routing::post};
use readaloud_core::UserProfile;
use serde::Serialize;

pub use error::{GenerationError, Result};
pub use generator::{ParagraphGenerator, PRACTICE_PROMPT};

/// Shared state for the paragraph endpoint
pub struct ParagraphState {
    generator: ParagraphGenerator,
    fallback_profile: UserProfile,
}

/// Build the paragraph generator from configuration
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built
pub fn build_state(config: &readaloud_config::Config) -> anyhow::Result<Arc<ParagraphState>> {
    let generator = ParagraphGenerator::new(&config.generation)
        .map_err(|e| anyhow::anyhow!("Failed to initialize paragraph generator: {e}"))?;

    let fallback = &config.profile;

    Ok(Arc::new(ParagraphState {
        generator,
        fallback_profile: UserProfile::new(&fallback.name, &fallback.age, &fallback.skill_rating),
    }))
}

/// Create the endpoint router for practice paragraphs
pub fn endpoint_router() -> Router<Arc<ParagraphState>> {
    Router::new().route("/gettonguetwister", post(generate))
}

#[derive(Debug, Serialize)]
struct ParagraphResponse {
    tt: String,
}

/// Generate a practice paragraph for the session's reader
async fn generate(
    State(state): State<Arc<ParagraphState>>,
    profile: Option<Extension<UserProfile>>,
) -> Result<Json<ParagraphResponse>> {
    let profile = profile.map_or_else(|| state.fallback_profile.clone(), |Extension(p)| p);

    let paragraph = state.generator.generate(&profile).await?;

    tracing::debug!(chars = paragraph.len(), "practice paragraph generated");

    Ok(Json(ParagraphResponse { tt: paragraph }))
}
