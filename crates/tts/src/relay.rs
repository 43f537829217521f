use std::{sync::Arc, time::Duration};

use crate::{
    error::{Result, TtsError},
    provider::{SpeechSynthesizer, boundary_queue},
    types::{SynthesisOutcome, SynthesisResult},
};

/// Runs synthesis requests against an engine and collects word timing
pub struct SynthesisRelay {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    timeout: Duration,
}

impl SynthesisRelay {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, timeout: Duration) -> Self {
        Self { synthesizer, timeout }
    }

    /// Synthesize a paragraph, returning the audio and the start offset of every spoken word
    ///
    /// Offsets are read only after the engine reports completion. An offset smaller than the one
    /// before it is dropped so the sequence stays non-decreasing.
    pub async fn synthesize(&self, text: &str) -> Result<SynthesisResult> {
        let text = require_text(text, "reftext")?;

        let (sink, mut boundaries) = boundary_queue(text.split_whitespace().count());
        let outcome = self.speak(text, Some(sink)).await?;
        let audio = self.completed_audio(outcome)?;

        let mut word_offsets = Vec::new();
        let mut last_ticks = None;

        while let Ok(boundary) = boundaries.try_recv() {
            if last_ticks.is_some_and(|last| boundary.audio_offset_ticks < last) {
                tracing::warn!(
                    word = %boundary.text,
                    ticks = boundary.audio_offset_ticks,
                    "Dropping out-of-order word boundary"
                );
                continue;
            }

            last_ticks = Some(boundary.audio_offset_ticks);
            word_offsets.push(boundary.offset_ms());
        }

        tracing::debug!(
            audio_len = audio.len(),
            words = word_offsets.len(),
            "Paragraph synthesis complete"
        );

        Ok(SynthesisResult { audio, word_offsets })
    }

    /// Synthesize a single word; no timing is collected
    pub async fn synthesize_word(&self, word: &str) -> Result<Vec<u8>> {
        let word = require_text(word, "word")?;
        let outcome = self.speak(word, None).await?;

        self.completed_audio(outcome)
    }

    async fn speak(&self, text: &str, sink: Option<crate::provider::BoundarySink>) -> Result<SynthesisOutcome> {
        tokio::time::timeout(self.timeout, self.synthesizer.speak(text, sink))
            .await
            .map_err(|_| {
                tracing::error!(
                    engine = self.synthesizer.name(),
                    timeout_ms = self.timeout.as_millis(),
                    "Speech synthesis timed out"
                );
                TtsError::Timeout
            })?
    }

    fn completed_audio(&self, outcome: SynthesisOutcome) -> Result<Vec<u8>> {
        match outcome {
            SynthesisOutcome::Completed { audio } => Ok(audio),
            SynthesisOutcome::Canceled { reason, error_details } => {
                tracing::warn!(engine = self.synthesizer.name(), reason = %reason, "Speech synthesis canceled");

                if let Some(details) = &error_details {
                    tracing::error!(engine = self.synthesizer.name(), "Synthesis error details: {details}");
                }

                Err(TtsError::Canceled { reason, error_details })
            }
            SynthesisOutcome::Unrecognized(status) => {
                tracing::error!(engine = self.synthesizer.name(), status = %status, "Unrecognized synthesis status");
                Err(TtsError::UnrecognizedStatus(status))
            }
        }
    }
}

fn require_text<'a>(text: &'a str, field: &str) -> Result<&'a str> {
    let text = text.trim();

    if text.is_empty() {
        return Err(TtsError::InvalidRequest(format!("{field} must not be empty")));
    }

    Ok(text)
}
