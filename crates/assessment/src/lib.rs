#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod chunks;
mod error;
mod http_client;
mod params;
mod relay;
mod request;
mod token;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::ExposeSecret;
use serde::Serialize;

pub use chunks::{CHUNK_SIZE, ChunkReader};
pub use error::{AssessmentError, Result, TokenError};
pub use params::AssessmentParameters;
pub use relay::{AssessmentRelay, AssessmentReply};
pub use request::ExtractUpload;
pub use token::TokenIssuer;

/// Header carrying the speech subscription key
pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Shared state for the assessment and token endpoints
pub struct AssessmentState {
    relay: AssessmentRelay,
    tokens: TokenIssuer,
}

/// Build the assessment relay and token issuer from configuration
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built
pub fn build_state(config: &readaloud_config::Config) -> anyhow::Result<Arc<AssessmentState>> {
    let relay = AssessmentRelay::new(&config.speech)
        .map_err(|e| anyhow::anyhow!("Failed to initialize assessment relay: {e}"))?;
    let tokens =
        TokenIssuer::new(&config.speech).map_err(|e| anyhow::anyhow!("Failed to initialize token issuer: {e}"))?;

    Ok(Arc::new(AssessmentState { relay, tokens }))
}

/// Create the endpoint router for assessment and speech tokens
pub fn endpoint_router() -> Router<Arc<AssessmentState>> {
    Router::new()
        .route("/ackaud", post(assess).layer(DefaultBodyLimit::max(request::BODY_LIMIT_BYTES)))
        .route("/gettoken", post(issue_token))
}

/// Score an uploaded recording, relaying the service's JSON verbatim
///
/// When `reftext` precedes `audio_data` the recording is relayed straight from the request body.
/// Otherwise the transcript is not known until the recording has been read, so the recording is
/// buffered first.
async fn assess(State(state): State<Arc<AssessmentState>>, ExtractUpload(mut multipart): ExtractUpload) -> Result<Response> {
    let mut reference_text: Option<String> = None;
    let mut buffered = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| request::upload_error(&e))? {
        match field.name() {
            Some(request::REFERENCE_FIELD) => {
                reference_text = Some(field.text().await.map_err(|e| request::upload_error(&e))?);
            }
            Some(request::AUDIO_FIELD) => {
                if let Some(reference) = &reference_text {
                    tracing::debug!("relaying recording as it arrives");

                    let reply = state.relay.assess(request::field_reader(field), reference).await?;
                    return Ok(reply_response(reply));
                }

                buffered = Some(field.bytes().await.map_err(|e| request::upload_error(&e))?);
            }
            _ => {}
        }
    }

    let audio = buffered.ok_or_else(|| {
        AssessmentError::InvalidRequest("Missing required 'audio_data' field in multipart form".to_string())
    })?;
    let reference_text = reference_text.ok_or_else(|| {
        AssessmentError::InvalidRequest("Missing required 'reftext' field in multipart form".to_string())
    })?;

    tracing::debug!(audio_bytes = audio.len(), "relaying buffered recording");

    let reply = state.relay.assess(std::io::Cursor::new(audio), &reference_text).await?;

    Ok(reply_response(reply))
}

fn reply_response(reply: AssessmentReply) -> Response {
    tracing::debug!(status = %reply.status, "assessment complete");

    (reply.status, Json(reply.body)).into_response()
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    at: String,
}

/// Hand the browser a short-lived speech token
async fn issue_token(State(state): State<Arc<AssessmentState>>) -> std::result::Result<Json<TokenResponse>, TokenError> {
    let token = state.tokens.issue().await?;

    Ok(Json(TokenResponse {
        at: token.expose_secret().to_owned(),
    }))
}
