//! Error types for the OCR server

use axum::{
    extract::{multipart::MultipartError, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::OcrError;
use crate::upload::{ALLOWED_EXTENSIONS, MAX_FILE_SIZE_LABEL};

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No file provided")]
    NoFile,

    #[error("No file selected")]
    NoFileSelected,

    #[error("File type not supported")]
    UnsupportedFileType,

    #[error("URL is required")]
    UrlRequired,

    #[error("File too large. Maximum size is {}", MAX_FILE_SIZE_LABEL)]
    PayloadTooLarge,

    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to download image: {0}")]
    Download(#[from] reqwest::Error),

    #[error("Processing failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Processing failed: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFile
            | Self::NoFileSelected
            | Self::UnsupportedFileType
            | Self::UrlRequired
            | Self::BadRequest(_)
            | Self::Download(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Ocr(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(format!("Failed to read upload: {}", err.body_text()))
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BadRequest(rejection.body_text())
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    supported_types: Option<&'static [&'static str]>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Error processing request: {}", self);
        } else {
            tracing::debug!("Rejected request ({}): {}", status, self);
        }

        let supported_types = matches!(self, Self::UnsupportedFileType)
            .then_some(ALLOWED_EXTENSIONS.as_slice());

        let body = Json(ErrorResponse {
            error: self.to_string(),
            supported_types,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_errors_are_bad_request() {
        let (status, body) = body_json(AppError::NoFile).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "No file provided" }));

        let (status, body) = body_json(AppError::NoFileSelected).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file selected");
    }

    #[tokio::test]
    async fn test_unsupported_type_lists_extensions() {
        let (status, body) = body_json(AppError::UnsupportedFileType).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File type not supported");
        assert_eq!(
            body["supported_types"],
            serde_json::json!(["png", "jpg", "jpeg", "gif", "bmp", "tiff", "pdf"])
        );
    }

    #[tokio::test]
    async fn test_payload_too_large() {
        let (status, body) = body_json(AppError::PayloadTooLarge).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], "File too large. Maximum size is 16MB");
    }

    #[tokio::test]
    async fn test_ocr_errors_are_internal() {
        let err = AppError::from(OcrError::ProcessingError("tesseract exited".to_string()));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Processing failed: OCR processing failed: tesseract exited");
        assert!(body.get("supported_types").is_none());
    }
}
