use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Message, client::IntoClientRequest, http::HeaderValue},
};

use crate::{
    error::TtsError,
    protocol::{self, ServiceMessage},
    ssml,
    types::{CancellationReason, SynthesisOutcome},
    wav,
};

use super::{BoundarySink, SpeechSynthesizer};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const CONNECTION_ID_HEADER: &str = "X-ConnectionId";

/// Synthesizer backed by the speech service's WebSocket endpoint
pub struct AzureSynthesizer {
    endpoint: String,
    subscription_key: SecretString,
    voice: String,
    language: String,
}

impl AzureSynthesizer {
    pub fn new(endpoint: String, subscription_key: SecretString, voice: String, language: String) -> Self {
        Self {
            endpoint,
            subscription_key,
            voice,
            language,
        }
    }

    fn canceled(details: String) -> SynthesisOutcome {
        SynthesisOutcome::Canceled {
            reason: CancellationReason::Error,
            error_details: Some(details),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSynthesizer {
    async fn speak(&self, text: &str, boundaries: Option<BoundarySink>) -> crate::error::Result<SynthesisOutcome> {
        let connection_id = protocol::request_id();

        let mut request = self.endpoint.as_str().into_client_request().map_err(|e| {
            tracing::error!("Invalid synthesis endpoint: {e}");
            TtsError::InternalError(None)
        })?;

        let key = HeaderValue::from_str(self.subscription_key.expose_secret()).map_err(|_| {
            tracing::error!("Speech subscription key is not a valid header value");
            TtsError::InternalError(None)
        })?;

        let headers = request.headers_mut();
        headers.insert(SUBSCRIPTION_KEY_HEADER, key);
        if let Ok(value) = HeaderValue::from_str(&connection_id) {
            headers.insert(CONNECTION_ID_HEADER, value);
        }

        tracing::debug!(
            connection_id = %connection_id,
            voice = %self.voice,
            input_len = text.len(),
            "Opening synthesis connection"
        );

        let (stream, _) = match connect_async(request).await {
            Ok(connected) => connected,
            Err(e) => return Ok(Self::canceled(format!("Connection to speech service failed: {e}"))),
        };

        let (mut write, read) = stream.split();

        // Reading starts before the request is sent so no early frame is missed
        let reader = ReadTask(tokio::spawn(read_turn(read, boundaries)));

        let request_id = protocol::request_id();
        let document = ssml::speak_document(text, &self.voice, &self.language);
        let messages = [
            protocol::speech_config(&request_id),
            protocol::synthesis_context(&request_id),
            protocol::ssml(&request_id, &document),
        ];

        for message in messages {
            if let Err(e) = write.send(Message::text(message)).await {
                return Ok(Self::canceled(format!("Failed to send synthesis request: {e}")));
            }
        }

        let outcome = reader.join().await?;

        // The service keeps the socket open for further turns
        if let Err(e) = write.close().await {
            tracing::debug!("Closing synthesis connection failed: {e}");
        }

        Ok(outcome)
    }

    fn name(&self) -> &str {
        "azure"
    }
}

/// Read task aborted when the synthesis is abandoned
struct ReadTask(JoinHandle<crate::error::Result<SynthesisOutcome>>);

impl ReadTask {
    async fn join(mut self) -> crate::error::Result<SynthesisOutcome> {
        (&mut self.0).await.map_err(|e| {
            tracing::error!("Synthesis read task failed: {e}");
            TtsError::InternalError(None)
        })?
    }
}

impl Drop for ReadTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn read_turn<S>(mut read: S, boundaries: Option<BoundarySink>) -> crate::error::Result<SynthesisOutcome>
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let mut pcm = Vec::new();

    while let Some(frame) = read.next().await {
        let message = match frame {
            Ok(Message::Text(text)) => protocol::parse_text(text.as_str()),
            Ok(Message::Binary(data)) => protocol::parse_binary(&data),
            Ok(Message::Close(close)) => {
                let details = close.map_or_else(
                    || "Connection closed before synthesis completed".to_string(),
                    |frame| format!("Connection closed ({}): {}", u16::from(frame.code), frame.reason.as_str()),
                );

                return Ok(AzureSynthesizer::canceled(details));
            }
            Ok(_) => continue,
            Err(e) => return Ok(AzureSynthesizer::canceled(format!("Connection to speech service failed: {e}"))),
        };

        match message {
            Ok(ServiceMessage::Audio(chunk)) => pcm.extend_from_slice(&chunk),
            Ok(ServiceMessage::WordBoundaries(found)) => {
                if let Some(sink) = &boundaries {
                    for boundary in found {
                        sink.push(boundary);
                    }
                }
            }
            Ok(ServiceMessage::TurnEnd) => {
                let audio = wav::pcm_to_wav(&pcm).map_err(|e| {
                    tracing::error!("Failed to encode synthesized audio: {e}");
                    TtsError::InternalError(None)
                })?;

                tracing::debug!("Synthesis complete, {} PCM bytes", pcm.len());

                return Ok(SynthesisOutcome::Completed { audio });
            }
            Ok(ServiceMessage::Other(path)) => tracing::trace!(path = %path, "Ignoring synthesis frame"),
            Err(e) => tracing::warn!("Ignoring malformed synthesis frame: {e}"),
        }
    }

    Ok(SynthesisOutcome::Canceled {
        reason: CancellationReason::EndOfStream,
        error_details: None,
    })
}
