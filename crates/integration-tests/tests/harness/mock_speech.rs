//! Mock speech service: token issuing, pronunciation assessment and the synthesis WebSocket

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use base64::Engine;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::config::SPEECH_KEY;

/// Token handed out by the mock issuer
pub const ACCESS_TOKEN: &str = "mock-speech-access-token";

/// Start offset of the first spoken word, in ticks
pub const FIRST_WORD_TICKS: u64 = 500_000;
/// Distance between word starts, in ticks
pub const WORD_SPACING_TICKS: u64 = 4_625_000;
/// PCM samples emitted per word
pub const SAMPLES_PER_WORD: usize = 1600;

/// How the synthesis WebSocket behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    /// Audio and one boundary per word, then `turn.end`
    Complete,
    /// Some audio, then a close frame before `turn.end`
    CloseEarly,
    /// Accept the request and never answer
    Stall,
}

/// How the assessment endpoint behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentMode {
    /// Score every word
    Score,
    /// Reject with a JSON error body
    Reject,
    /// Fail with a non-JSON body
    Unavailable,
}

/// What the assessment endpoint saw
#[derive(Debug, Clone)]
pub struct AssessmentCall {
    pub audio: Bytes,
    pub parameters: Value,
    pub content_type: String,
    pub query: String,
    pub chunked: bool,
}

/// Mock speech service
pub struct MockSpeech {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    synthesis: SynthesisMode,
    assessment: AssessmentMode,
    assessments: Mutex<Vec<AssessmentCall>>,
    ssml: Mutex<Vec<String>>,
}

impl MockSpeech {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(SynthesisMode::Complete, AssessmentMode::Score).await
    }

    pub async fn start_with(synthesis: SynthesisMode, assessment: AssessmentMode) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            synthesis,
            assessment,
            assessments: Mutex::new(Vec::new()),
            ssml: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/sts/v1.0/issueToken", routing::post(handle_token))
            .route(
                "/speech/recognition/conversation/cognitiveservices/v1",
                routing::post(handle_assessment),
            )
            .route("/cognitiveservices/websocket/v1", routing::get(handle_synthesis))
            .with_state(Arc::clone(&state));

        let (addr, shutdown) = super::server::spawn_mock(app).await?;

        Ok(Self { addr, shutdown, state })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Assessment requests received so far
    pub fn assessments(&self) -> Vec<AssessmentCall> {
        self.state.assessments.lock().unwrap().clone()
    }

    /// SSML documents received so far
    pub fn ssml(&self) -> Vec<String> {
        self.state.ssml.lock().unwrap().clone()
    }
}

impl Drop for MockSpeech {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("Ocp-Apim-Subscription-Key")
        .is_some_and(|key| key.as_bytes() == SPEECH_KEY.as_bytes())
}

async fn handle_token(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    ACCESS_TOKEN.into_response()
}

async fn handle_assessment(
    State(state): State<Arc<MockState>>,
    uri: axum::http::Uri,
    headers: HeaderMap,
    audio: Bytes,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid subscription key" }))).into_response();
    }

    let parameters = headers
        .get("Pronunciation-Assessment")
        .and_then(|v| base64::engine::general_purpose::STANDARD.decode(v.as_bytes()).ok())
        .and_then(|raw| serde_json::from_slice::<Value>(&raw).ok())
        .unwrap_or(Value::Null);

    let reference = parameters["ReferenceText"].as_str().unwrap_or_default().to_owned();

    state.assessments.lock().unwrap().push(AssessmentCall {
        audio,
        parameters,
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned(),
        query: uri.query().unwrap_or_default().to_owned(),
        chunked: headers
            .get("transfer-encoding")
            .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"chunked")),
    });

    match state.assessment {
        AssessmentMode::Score => {
            let words: Vec<Value> = reference
                .split_whitespace()
                .map(|word| json!({ "Word": word, "AccuracyScore": 92.0, "ErrorType": "None" }))
                .collect();

            Json(json!({
                "RecognitionStatus": "Success",
                "DisplayText": reference,
                "NBest": [{
                    "Confidence": 0.97,
                    "Lexical": reference.to_lowercase(),
                    "AccuracyScore": 92.0,
                    "FluencyScore": 88.0,
                    "CompletenessScore": 100.0,
                    "PronScore": 91.4,
                    "Words": words,
                }],
            }))
            .into_response()
        }
        AssessmentMode::Reject => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "RecognitionStatus": "BadRequest", "Message": "Audio format not supported" })),
        )
            .into_response(),
        AssessmentMode::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "upstream maintenance").into_response(),
    }
}

async fn handle_synthesis(ws: WebSocketUpgrade, State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    ws.on_upgrade(move |socket| synthesize(socket, state))
}

async fn synthesize(mut socket: WebSocket, state: Arc<MockState>) {
    let mut ssml = None;

    while let Some(Ok(message)) = socket.recv().await {
        if let Message::Text(text) = message
            && let Some((headers, body)) = text.as_str().split_once("\r\n\r\n")
            && headers.lines().any(|line| line == "Path:ssml")
        {
            ssml = Some(body.to_owned());
            break;
        }
    }

    let Some(ssml) = ssml else {
        return;
    };

    state.ssml.lock().unwrap().push(ssml.clone());

    let _ = socket.send(text_frame("turn.start", "{}")).await;

    match state.synthesis {
        SynthesisMode::Complete => {
            for (index, word) in (0_u64..).zip(spoken_words(&ssml)) {
                let boundary = word_boundary(FIRST_WORD_TICKS + index * WORD_SPACING_TICKS, &word, "Word");
                let _ = socket.send(boundary).await;
                let _ = socket.send(audio_frame(SAMPLES_PER_WORD)).await;
            }

            let _ = socket.send(word_boundary(u64::MAX / 2, ".", "Punctuation")).await;
            let _ = socket.send(text_frame("turn.end", "{}")).await;
        }
        SynthesisMode::CloseEarly => {
            let _ = socket.send(audio_frame(SAMPLES_PER_WORD)).await;
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::ERROR,
                    reason: "Synthesis backend failure".into(),
                })))
                .await;
        }
        SynthesisMode::Stall => tokio::time::sleep(Duration::from_secs(60)).await,
    }
}

/// Words inside the `<voice>` element
fn spoken_words(ssml: &str) -> Vec<String> {
    let start = ssml
        .find("<voice")
        .and_then(|at| ssml[at..].find('>').map(|end| at + end + 1));
    let end = ssml.rfind("</voice>");

    match (start, end) {
        (Some(start), Some(end)) if start <= end => {
            ssml[start..end].split_whitespace().map(str::to_owned).collect()
        }
        _ => Vec::new(),
    }
}

fn text_frame(path: &str, body: &str) -> Message {
    Message::Text(format!("X-RequestId:mock\r\nContent-Type:application/json\r\nPath:{path}\r\n\r\n{body}").into())
}

fn word_boundary(ticks: u64, word: &str, box_type: &str) -> Message {
    let body = json!({
        "Metadata": [{
            "Type": "WordBoundary",
            "Data": {
                "Offset": ticks,
                "Duration": 3_000_000,
                "text": { "Text": word, "Length": word.len(), "BoxType": box_type },
            },
        }],
    });

    text_frame("audio.metadata", &body.to_string())
}

fn audio_frame(samples: usize) -> Message {
    let headers = b"X-RequestId:mock\r\nContent-Type:audio/x-wav\r\nPath:audio\r\n";
    let mut frame = u16::try_from(headers.len()).unwrap().to_be_bytes().to_vec();
    frame.extend_from_slice(headers);

    for i in 0..samples {
        let sample = i16::try_from((i % 100) * 300).unwrap() - 15_000;
        frame.extend_from_slice(&sample.to_le_bytes());
    }

    Message::Binary(frame.into())
}
