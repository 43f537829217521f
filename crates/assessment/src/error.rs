use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use readaloud_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssessmentError>;

/// Pronunciation assessment errors
#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Upload was missing a field or malformed
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Upload exceeded the body limit
    #[error("Recording is too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Uploaded recording could not be read
    #[error("Audio source error: {0}")]
    AudioSource(String),

    /// Network failure talking to the assessment endpoint
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Assessment endpoint did not answer in time
    #[error("Assessment endpoint timed out")]
    Timeout,

    /// Assessment endpoint answered with a body that is not JSON
    #[error("Assessment API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Client construction failed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl HttpError for AssessmentError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::AudioSource(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ConnectionError(_) | Self::ProviderApiError { .. } => StatusCode::BAD_GATEWAY,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) | Self::AudioSource(_) | Self::PayloadTooLarge(_) => "invalid_request_error",
            Self::ConnectionError(_) | Self::ProviderApiError { .. } | Self::Timeout => "upstream_error",
            Self::ConfigError(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::ConfigError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AssessmentError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(readaloud_core::error_body(&self))).into_response()
    }
}

/// Speech access token errors
#[derive(Debug, Error)]
pub enum TokenError {
    /// Network failure or timeout talking to the token endpoint
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Token endpoint rejected the subscription key or failed
    #[error("Token API error ({status})")]
    ProviderApiError { status: u16 },

    /// Client construction failed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl HttpError for TokenError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ConnectionError(_) | Self::ProviderApiError { .. } => StatusCode::BAD_GATEWAY,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::ConnectionError(_) | Self::ProviderApiError { .. } => "upstream_error",
            Self::ConfigError(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::ConfigError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(readaloud_core::error_body(&self))).into_response()
    }
}
