#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod protocol;
mod provider;
mod relay;
mod ssml;
mod types;
mod wav;

use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    http::{HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::post,
};

pub use error::{Result, TtsError};
pub use provider::{BoundarySink, SpeechSynthesizer, azure::AzureSynthesizer, boundary_queue};
pub use relay::SynthesisRelay;
pub use types::{CancellationReason, ParagraphForm, SynthesisOutcome, SynthesisResult, WordBoundary, WordForm};

const OFFSETS_HEADER: HeaderName = HeaderName::from_static("offsets");
const WAV_DISPOSITION: &str = "attachment; filename=sound.wav";

/// Build the synthesis relay from configuration
pub fn build_state(config: &readaloud_config::Config) -> anyhow::Result<Arc<SynthesisRelay>> {
    anyhow::ensure!(
        config.speech.synthesis_endpoint().starts_with("ws"),
        "Speech synthesis endpoint must be a ws:// or wss:// URL"
    );

    let speech = &config.speech;

    let synthesizer = AzureSynthesizer::new(
        speech.synthesis_endpoint(),
        speech.subscription_key.clone(),
        speech.voice.clone(),
        speech.language.clone(),
    );

    Ok(Arc::new(SynthesisRelay::new(Arc::new(synthesizer), speech.timeout())))
}

/// Create the endpoint router for speech synthesis
pub fn endpoint_router() -> Router<Arc<SynthesisRelay>> {
    Router::new()
        .route("/gettts", post(synthesize_paragraph))
        .route("/getttsforword", post(synthesize_word))
}

async fn synthesize_paragraph(
    State(relay): State<Arc<SynthesisRelay>>,
    Form(form): Form<ParagraphForm>,
) -> Result<Response> {
    let result = relay.synthesize(&form.reftext).await?;

    let offsets = HeaderValue::from_str(&result.offsets_header()).map_err(|e| {
        tracing::error!("Offsets are not a valid header value: {e}");
        TtsError::InternalError(None)
    })?;

    let mut response = wav_response(result.audio);
    response.headers_mut().insert(OFFSETS_HEADER, offsets);

    Ok(response)
}

async fn synthesize_word(State(relay): State<Arc<SynthesisRelay>>, Form(form): Form<WordForm>) -> Result<Response> {
    let audio = relay.synthesize_word(&form.word).await?;

    Ok(wav_response(audio))
}

fn wav_response(audio: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (header::CONTENT_DISPOSITION, WAV_DISPOSITION),
        ],
        audio,
    )
        .into_response()
}
