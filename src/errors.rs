use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Payload too large.")]
    PayloadTooLarge,
    #[error("Invalid request.")]
    InvalidRequest,
    #[error("Missing required fields.")]
    MissingFields,
    #[error("Invalid name fields.")]
    InvalidNameFields,
    #[error("Invalid image format.")]
    InvalidImageFormat,
    /// The detail is for the log only; clients see the generic message.
    #[error("Failed to save image.")]
    StorageFailure(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

impl UploadError {
    pub fn code(&self) -> &'static str {
        match self {
            UploadError::PayloadTooLarge => "PayloadTooLarge",
            UploadError::InvalidRequest => "InvalidRequest",
            UploadError::MissingFields => "MissingFields",
            UploadError::InvalidNameFields => "InvalidNameFields",
            UploadError::InvalidImageFormat => "InvalidImageFormat",
            UploadError::StorageFailure(_) => "StorageFailure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::InvalidRequest
            | UploadError::MissingFields
            | UploadError::InvalidNameFields
            | UploadError::InvalidImageFormat => StatusCode::BAD_REQUEST,
            UploadError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UploadResult<T> = Result<T, UploadError>;

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        (self.status(), Json(ErrorBody { error: &message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(UploadError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(UploadError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(UploadError::InvalidImageFormat.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            UploadError::StorageFailure("disk full".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_detail_stays_out_of_message() {
        let err = UploadError::StorageFailure("/var/secret: permission denied".into());
        assert_eq!(err.to_string(), "Failed to save image.");
        assert_eq!(err.code(), "StorageFailure");
    }
}
