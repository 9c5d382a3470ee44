use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pinhole_core::ShortenerError;
use tracing::{error, warn};

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Shortener(ShortenerError),
    /// Create did not finish within the configured timeout.
    Timeout,
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        Self::Shortener(value)
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Shortener(e) => match e {
                ShortenerError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "invalid_url"),
                ShortenerError::InvalidKeyFormat(_) => {
                    (StatusCode::BAD_REQUEST, "invalid_key_format")
                }
                ShortenerError::KeyTaken(_) => (StatusCode::CONFLICT, "key_taken"),
                ShortenerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                ShortenerError::CorruptRecord { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "corrupt_record")
                }
                ShortenerError::AllocationExhausted { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "allocation_exhausted")
                }
                ShortenerError::StoreUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
                }
            },
            AppError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Shortener(e) => e.to_string(),
            AppError::Timeout => "request timed out".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            error!(status = status.as_u16(), code, %message, "request failed");
        } else if status != StatusCode::NOT_FOUND {
            warn!(status = status.as_u16(), code, %message, "request rejected");
        }

        let body = ErrorResponse {
            error: code,
            message,
        };
        (status, Json(body)).into_response()
    }
}
