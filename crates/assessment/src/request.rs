use std::io;

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, multipart::Field, multipart::MultipartError},
    response::{IntoResponse, Response},
};
use futures::TryStreamExt;
use http::StatusCode;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::error::AssessmentError;

/// Multipart field carrying the recording
pub(crate) const AUDIO_FIELD: &str = "audio_data";
/// Multipart field carrying the reference transcript
pub(crate) const REFERENCE_FIELD: &str = "reftext";

/// Body limit for recordings (32 MiB)
pub(crate) const BODY_LIMIT_BYTES: usize = 32 << 20;

/// Extractor for the `audio_data` + `reftext` multipart upload
///
/// The body is not read here; fields are pulled one at a time by the handler so the recording
/// can be relayed while it is still arriving.
pub struct ExtractUpload(pub Multipart);

impl<S> FromRequest<S> for ExtractUpload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("multipart/form-data") {
            return Err((
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Content-Type, expected: 'Content-Type: multipart/form-data'",
            )
                .into_response());
        }

        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Self(multipart))
    }
}

/// Reader over a multipart field's bytes as they arrive
pub(crate) fn field_reader(field: Field<'_>) -> impl AsyncRead + Unpin + Send + '_ {
    StreamReader::new(Box::pin(field.map_err(field_io_error)))
}

/// Map a failed upload read to the error reported to the browser
pub(crate) fn upload_error(error: &MultipartError) -> AssessmentError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AssessmentError::PayloadTooLarge(BODY_LIMIT_BYTES)
    } else {
        AssessmentError::InvalidRequest(format!("Malformed multipart form: {}", error.body_text()))
    }
}

fn field_io_error(error: MultipartError) -> io::Error {
    let kind = if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::ErrorKind::FileTooLarge
    } else {
        io::ErrorKind::InvalidData
    };

    io::Error::new(kind, error)
}
