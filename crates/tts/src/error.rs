use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use readaloud_core::HttpError;
use thiserror::Error;

use crate::types::CancellationReason;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Speech synthesis errors
#[derive(Debug, Error)]
pub enum TtsError {
    /// Text to synthesize was missing or blank
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The engine cancelled the synthesis
    #[error("Speech synthesis canceled: {reason}")]
    Canceled {
        reason: CancellationReason,
        error_details: Option<String>,
    },

    /// The engine finished with a status that is neither completed nor canceled
    #[error("Speech synthesis ended with unrecognized status: {0}")]
    UnrecognizedStatus(String),

    /// Synthesis did not finish in time
    #[error("Speech synthesis timed out")]
    Timeout,

    /// Internal server error
    #[error("Internal server error")]
    InternalError(Option<String>),
}

impl HttpError for TtsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Canceled { .. } | Self::UnrecognizedStatus(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Canceled { .. } | Self::UnrecognizedStatus(_) | Self::Timeout => "synthesis_error",
            Self::InternalError(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InternalError(Some(message)) => message.clone(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        if matches!(self, Self::InvalidRequest(_)) {
            return (self.status_code(), Json(readaloud_core::error_body(&self))).into_response();
        }

        // The read-along page only inspects the body of a failed synthesis
        (StatusCode::OK, Json(readaloud_core::failure_body())).into_response()
    }
}
