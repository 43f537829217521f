//! Framing of the speech service's synthesis WebSocket.
//!
//! Outgoing messages are text frames: `Name:value` headers separated by CRLF, a blank line, then the
//! body. Incoming audio arrives in binary frames whose first two bytes hold the big-endian length of
//! the header block that precedes the PCM payload.

use serde::Deserialize;
use serde_json::json;

use crate::types::WordBoundary;

/// PCM format requested from the service
pub const OUTPUT_FORMAT: &str = "raw-16khz-16bit-mono-pcm";

/// Message received from the service
#[derive(Debug, PartialEq, Eq)]
pub enum ServiceMessage {
    /// A slice of synthesized PCM
    Audio(Vec<u8>),
    /// Word boundaries reported so far, punctuation excluded
    WordBoundaries(Vec<WordBoundary>),
    /// Synthesis finished
    TurnEnd,
    /// Any other path (`turn.start`, `response`, ...)
    Other(String),
}

/// Malformed service frame
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("binary frame shorter than its header")]
    Truncated,
    #[error("frame has no Path header")]
    MissingPath,
    #[error("invalid audio.metadata body: {0}")]
    InvalidMetadata(String),
}

/// Fresh request id in the form the service expects (32 hex digits, no hyphens)
pub fn request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn speech_config(request_id: &str) -> String {
    let body = json!({
        "context": {
            "system": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "build": "Rust",
                "lang": "Rust",
            },
            "os": {
                "platform": std::env::consts::OS,
                "name": std::env::consts::FAMILY,
                "version": "",
            },
        }
    });

    frame("speech.config", request_id, "application/json", &body.to_string())
}

pub fn synthesis_context(request_id: &str) -> String {
    let body = json!({
        "synthesis": {
            "audio": {
                "metadataOptions": {
                    "wordBoundaryEnabled": true,
                    "sentenceBoundaryEnabled": false,
                    "bookmarkEnabled": false,
                },
                "outputFormat": OUTPUT_FORMAT,
            },
            "language": { "autoDetection": false },
        }
    });

    frame("synthesis.context", request_id, "application/json", &body.to_string())
}

pub fn ssml(request_id: &str, document: &str) -> String {
    frame("ssml", request_id, "application/ssml+xml", document)
}

fn frame(path: &str, request_id: &str, content_type: &str, body: &str) -> String {
    format!(
        "Path:{path}\r\nX-RequestId:{request_id}\r\nX-Timestamp:{}\r\nContent-Type:{content_type}\r\n\r\n{body}",
        jiff::Timestamp::now(),
    )
}

/// Decode a text frame
pub fn parse_text(frame: &str) -> Result<ServiceMessage, FrameError> {
    let (headers, body) = frame.split_once("\r\n\r\n").unwrap_or((frame, ""));
    let path = header(headers, "Path").ok_or(FrameError::MissingPath)?;

    match path {
        "audio.metadata" => parse_metadata(body).map(ServiceMessage::WordBoundaries),
        "turn.end" => Ok(ServiceMessage::TurnEnd),
        other => Ok(ServiceMessage::Other(other.to_string())),
    }
}

/// Decode a binary frame
pub fn parse_binary(frame: &[u8]) -> Result<ServiceMessage, FrameError> {
    let [high, low, rest @ ..] = frame else {
        return Err(FrameError::Truncated);
    };

    let header_len = usize::from(u16::from_be_bytes([*high, *low]));
    if rest.len() < header_len {
        return Err(FrameError::Truncated);
    }

    let (headers, payload) = rest.split_at(header_len);
    let headers = String::from_utf8_lossy(headers);
    let path = header(&headers, "Path").ok_or(FrameError::MissingPath)?;

    if path == "audio" {
        Ok(ServiceMessage::Audio(payload.to_vec()))
    } else {
        Ok(ServiceMessage::Other(path.to_string()))
    }
}

fn header<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    headers.split("\r\n").find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

#[derive(Deserialize)]
struct Metadata {
    #[serde(rename = "Metadata", default)]
    entries: Vec<MetadataEntry>,
}

#[derive(Deserialize)]
struct MetadataEntry {
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Data")]
    data: Option<MetadataData>,
}

#[derive(Deserialize)]
struct MetadataData {
    #[serde(rename = "Offset", default)]
    offset: u64,
    text: Option<MetadataText>,
}

#[derive(Deserialize)]
struct MetadataText {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "BoxType")]
    box_type: Option<String>,
}

fn parse_metadata(body: &str) -> Result<Vec<WordBoundary>, FrameError> {
    let metadata: Metadata =
        serde_json::from_str(body).map_err(|e| FrameError::InvalidMetadata(e.to_string()))?;

    let boundaries = metadata
        .entries
        .into_iter()
        .filter(|entry| entry.kind == "WordBoundary")
        .filter_map(|entry| {
            let data = entry.data?;
            let text = data.text?;

            if text.box_type.as_deref() == Some("Punctuation") {
                return None;
            }

            Some(WordBoundary {
                audio_offset_ticks: data.offset,
                text: text.text,
            })
        })
        .collect();

    Ok(boundaries)
}
