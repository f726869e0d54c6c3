//! Request errors and their HTTP mapping.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use citra_image::ImageError;
use thiserror::Error;

/// Everything that can end a request early.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A required form field was not sent
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    /// The request is not a readable multipart form
    #[error("Invalid form: {0}")]
    Form(#[from] MultipartRejection),

    /// The multipart body broke off or exceeded the upload limit
    #[error("Invalid form data: {0}")]
    Multipart(#[from] MultipartError),

    /// Decode, transform or encode failure
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The blocking worker panicked or was cancelled
    #[error("Image worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ServiceError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::Form(_) => StatusCode::BAD_REQUEST,
            Self::Multipart(e) => e.status(),
            Self::Image(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Image(_) | Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ServiceError::MissingField("image").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Image(ImageError::Decode).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Image(ImageError::InvalidDimension { width: 0, height: 0 }).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ServiceError::MissingField("image").to_string(),
            "Missing form field: image"
        );
        assert_eq!(ServiceError::Image(ImageError::Decode).to_string(), "Invalid image");
    }
}
