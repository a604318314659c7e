use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use crate::nutrition::dates::DateRangeError;

/// Request-level failures. Every variant is terminal for the request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid file type {0:?}: only image uploads are accepted")]
    InvalidFileType(String),
    #[error("missing form field `{0}`")]
    MissingField(&'static str),
    #[error("malformed multipart body: {0}")]
    Multipart(String),
    #[error("upload too large: {0}")]
    TooLarge(String),
    #[error("malformed form body: {message}")]
    Form { status: StatusCode, message: String },
    #[error(transparent)]
    InvalidDateRange(#[from] DateRangeError),
    #[error("blob storage error: {0}")]
    Storage(String),
    #[error("document store error: {0}")]
    Database(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::MissingField(_) | ApiError::Multipart(_) | ApiError::InvalidDateRange(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Form { status, .. } => *status,
            ApiError::Storage(_) | ApiError::Database(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn storage(e: anyhow::Error) -> Self {
        ApiError::Storage(format!("{:#}", e))
    }

    pub fn database(e: anyhow::Error) -> Self {
        ApiError::Database(format!("{:#}", e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(%status, error = %msg, "request failed");
        } else {
            warn!(%status, error = %msg, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": msg }))).into_response()
    }
}
