use std::future::Future;
use std::io;

use bytes::Bytes;
use http::StatusCode;
use reqwest::Client;
use readaloud_config::SpeechConfig;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;

use crate::{
    SUBSCRIPTION_KEY_HEADER,
    chunks::{ChunkReader, pump},
    error::{AssessmentError, Result},
    http_client::http_client,
    params::AssessmentParameters,
};

const PRONUNCIATION_ASSESSMENT_HEADER: &str = "Pronunciation-Assessment";
const AUDIO_CONTENT_TYPE: &str = "audio/wav; codecs=audio/pcm; samplerate=16000";
const ACCEPT: &str = "application/json;text/xml";

/// Chunks buffered between the audio source and the outbound body
const CHUNK_QUEUE_DEPTH: usize = 4;

/// Score as returned by the assessment endpoint, relayed unmodified
#[derive(Debug)]
pub struct AssessmentReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Streams recordings to the remote pronunciation assessment endpoint
pub struct AssessmentRelay {
    client: Client,
    endpoint: String,
    subscription_key: SecretString,
}

impl AssessmentRelay {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let client = http_client(config.timeout()).map_err(|e| AssessmentError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.assessment_endpoint(),
            subscription_key: config.subscription_key.clone(),
        })
    }

    /// Score `source` against `reference_text`
    ///
    /// The audio is re-streamed with chunked transfer encoding, one
    /// [`CHUNK_SIZE`](crate::CHUNK_SIZE) piece at a time. `source` is dropped
    /// before this returns, whatever the outcome. No retry is attempted.
    pub async fn assess<R>(&self, source: R, reference_text: &str) -> Result<AssessmentReply>
    where
        R: AsyncRead + Unpin + Send,
    {
        let parameters = AssessmentParameters::new(reference_text)
            .to_header_value()
            .map_err(|e| AssessmentError::InvalidRequest(format!("unencodable reference text: {e}")))?;

        let (sink, mut chunks) = mpsc::channel::<io::Result<Bytes>>(CHUNK_QUEUE_DEPTH);
        let body = futures::stream::poll_fn(move |cx| chunks.poll_recv(cx));

        let request = self
            .client
            .post(&self.endpoint)
            .header(http::header::ACCEPT, ACCEPT)
            .header(http::header::CONTENT_TYPE, AUDIO_CONTENT_TYPE)
            .header(SUBSCRIPTION_KEY_HEADER, self.subscription_key.expose_secret())
            .header(PRONUNCIATION_ASSESSMENT_HEADER, parameters)
            .body(reqwest::Body::wrap_stream(body))
            .send();

        tracing::debug!(reference_len = reference_text.len(), "streaming recording to assessment endpoint");

        let (sent, source_failure) = drive(request, pump(ChunkReader::new(source), sink)).await;

        let response = sent.map_err(|e| {
            if let Some(read_error) = source_failure {
                tracing::warn!(error = %read_error, "recording could not be read");

                if read_error.kind() == io::ErrorKind::FileTooLarge {
                    return AssessmentError::PayloadTooLarge(crate::request::BODY_LIMIT_BYTES);
                }

                return AssessmentError::AudioSource(read_error.to_string());
            }

            tracing::error!(error = %e, "assessment request failed");

            if e.is_timeout() {
                AssessmentError::Timeout
            } else {
                AssessmentError::ConnectionError(format!("Failed to send request to assessment endpoint: {e}"))
            }
        })?;

        let status = response.status();

        let raw = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read assessment response body");
            AssessmentError::ConnectionError(format!("Failed to read assessment response: {e}"))
        })?;

        match serde_json::from_slice::<Value>(&raw) {
            Ok(body) => {
                if !status.is_success() {
                    tracing::warn!(%status, "assessment endpoint returned an error body");
                }

                Ok(AssessmentReply { status, body })
            }
            Err(e) => {
                tracing::error!(%status, error = %e, "assessment response is not JSON");

                Err(AssessmentError::ProviderApiError {
                    status: status.as_u16(),
                    message: String::from_utf8_lossy(&raw).into_owned(),
                })
            }
        }
    }
}

/// Poll the outbound request and the audio pump together until the request resolves
///
/// The pump (and the audio source it owns) is dropped when this returns.
async fn drive<S, P, T>(send: S, pump: P) -> (T, Option<io::Error>)
where
    S: Future<Output = T>,
    P: Future<Output = io::Result<usize>>,
{
    tokio::pin!(send);
    tokio::pin!(pump);

    let mut pumping = true;
    let mut failure = None;

    loop {
        tokio::select! {
            outcome = &mut send => return (outcome, failure),
            pumped = &mut pump, if pumping => {
                pumping = false;
                match pumped {
                    Ok(chunks) => tracing::debug!(chunks, "recording fully streamed"),
                    Err(e) => failure = Some(e),
                }
            }
        }
    }
}
