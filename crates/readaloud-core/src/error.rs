use http::StatusCode;
use serde_json::{Value, json};

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type, keeping domain errors
/// decoupled from axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `upstream_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to the browser
    fn client_message(&self) -> String;
}

/// Error-shaped JSON body returned by every JSON endpoint
///
/// `{"success": false, "error": {"message": ..., "type": ..., "code": ...}}`
pub fn error_body<E: HttpError + ?Sized>(error: &E) -> Value {
    json!({
        "success": false,
        "error": {
            "message": error.client_message(),
            "type": error.error_type(),
            "code": error.status_code().as_u16(),
        }
    })
}

/// Bare failure flag understood by the read-along page
pub fn failure_body() -> Value {
    json!({ "success": false })
}
