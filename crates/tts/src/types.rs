use serde::Deserialize;

/// Ticks (100 ns units) per millisecond
const TICKS_PER_MILLISECOND: f64 = 10_000.0;

/// Form body of `/gettts`
#[derive(Debug, Deserialize)]
pub struct ParagraphForm {
    #[serde(default)]
    pub reftext: String,
}

/// Form body of `/getttsforword`
#[derive(Debug, Deserialize)]
pub struct WordForm {
    #[serde(default)]
    pub word: String,
}

/// Start of a spoken word in the synthesized audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBoundary {
    /// Offset from the start of the audio, in 100 ns ticks
    pub audio_offset_ticks: u64,
    /// The word as spoken
    pub text: String,
}

impl WordBoundary {
    #[allow(clippy::cast_precision_loss)]
    pub fn offset_ms(&self) -> f64 {
        self.audio_offset_ticks as f64 / TICKS_PER_MILLISECOND
    }
}

/// Why a synthesis was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// The service or the connection reported an error
    Error,
    /// The audio stream ended before synthesis completed
    EndOfStream,
}

impl std::fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => f.write_str("Error"),
            Self::EndOfStream => f.write_str("EndOfStream"),
        }
    }
}

/// Terminal status reported by a synthesis engine
#[derive(Debug)]
pub enum SynthesisOutcome {
    /// Audio fully synthesized (RIFF/WAVE bytes)
    Completed { audio: Vec<u8> },
    /// Synthesis was cancelled
    Canceled {
        reason: CancellationReason,
        error_details: Option<String>,
    },
    /// Any status the relay does not know how to handle
    Unrecognized(String),
}

/// Successful synthesis of a paragraph
#[derive(Debug)]
pub struct SynthesisResult {
    /// RIFF/WAVE audio
    pub audio: Vec<u8>,
    /// Word start offsets in milliseconds, in utterance order
    pub word_offsets: Vec<f64>,
}

impl SynthesisResult {
    /// Value of the `offsets` response header, e.g. `[50.0,512.5]`
    pub fn offsets_header(&self) -> String {
        serde_json::to_string(&self.word_offsets).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_convert_to_milliseconds() {
        let boundary = WordBoundary {
            audio_offset_ticks: 5_125_000,
            text: "world".to_string(),
        };

        assert!((boundary.offset_ms() - 512.5).abs() < f64::EPSILON);
    }

    #[test]
    fn offsets_header_is_a_json_array() {
        let result = SynthesisResult {
            audio: Vec::new(),
            word_offsets: vec![50.0, 512.5],
        };

        assert_eq!(result.offsets_header(), "[50.0,512.5]");
    }
}
