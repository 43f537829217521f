use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use readaloud_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Paragraph generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network failure or timeout talking to the completion API
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Completion API answered with a non-success status
    #[error("Completion API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Completion API answered without any usable choice
    #[error("Completion API returned no paragraph")]
    EmptyCompletion,

    /// Response body did not match the completion format
    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    /// Client construction failed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl HttpError for GenerationError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ConnectionError(_)
            | Self::ProviderApiError { .. }
            | Self::EmptyCompletion
            | Self::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::ConnectionError(_) | Self::ProviderApiError { .. } | Self::MalformedResponse(_) => "upstream_error",
            Self::EmptyCompletion => "generation_error",
            Self::ConfigError(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            // Upstream bodies may echo the API key prefix back
            Self::ProviderApiError { status, .. } => format!("Completion API error ({status})"),
            Self::ConfigError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(readaloud_core::error_body(&self))).into_response()
    }
}
