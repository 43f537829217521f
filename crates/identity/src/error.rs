use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use quick_xml::escape::escape;
use readaloud_core::HttpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentityError>;

/// Login, callback and session errors
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Callback arrived without a login in progress for this browser
    #[error("No login in progress for this session")]
    MissingLoginState,

    /// Callback `state` does not match the one issued at login
    #[error("Login state mismatch")]
    StateMismatch,

    /// Callback carried neither a code nor an error
    #[error("Authorization code missing from callback")]
    MissingCode,

    /// The provider refused the login (`error` callback parameter)
    #[error("Login was rejected: {0}")]
    LoginRejected(String),

    /// The provider rejected the code exchange
    #[error("Authorization code exchange failed ({status}): {message}")]
    AuthExchangeError { status: u16, message: String },

    /// The provider could not be reached
    #[error("Failed to reach identity provider: {0}")]
    ConnectionError(String),

    /// Token response or identity token could not be read
    #[error("Invalid token from identity provider: {0}")]
    InvalidToken(String),

    /// The user store call failed
    #[error("User store error: {0}")]
    UserStoreError(String),

    /// Misconfiguration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl HttpError for IdentityError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingLoginState | Self::StateMismatch | Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::LoginRejected(_) | Self::AuthExchangeError { .. } => StatusCode::UNAUTHORIZED,
            Self::ConnectionError(_) | Self::InvalidToken(_) | Self::UserStoreError(_) => StatusCode::BAD_GATEWAY,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::MissingLoginState | Self::StateMismatch | Self::MissingCode => "invalid_request_error",
            Self::LoginRejected(_) | Self::AuthExchangeError { .. } => "authentication_error",
            Self::ConnectionError(_) | Self::InvalidToken(_) | Self::UserStoreError(_) => "upstream_error",
            Self::ConfigError(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::AuthExchangeError { .. } => "The identity provider rejected the login".to_string(),
            Self::ConfigError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::UNAUTHORIZED {
            let page = format!(
                "<!DOCTYPE html><html><head><title>Login failed</title></head><body>\
                 <h1>Login failed</h1><p>{}</p><p><a href=\"/login\">Try again</a></p></body></html>",
                escape(self.client_message().as_str()),
            );

            return (status, Html(page)).into_response();
        }

        (status, Json(readaloud_core::error_body(&self))).into_response()
    }
}
