//! JSON error responses for the HTTP handlers.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use textlift_core::TextliftError;
use tracing::error;

pub const DEBUG_HELP: &str = "Please check /debug endpoint for details";

/// Body message for failures whose detail stays in the logs.
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub help: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            help: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.help {
            Some(help) => json!({ "error": self.message, "help": help }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<TextliftError> for ApiError {
    fn from(err: TextliftError) -> Self {
        match err {
            TextliftError::TesseractNotFound => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                    .with_help(DEBUG_HELP)
            }
            TextliftError::InvalidRequest(_) | TextliftError::InvalidImage(_) => {
                ApiError::bad_request(err.to_string())
            }
            TextliftError::NotFound(_) => ApiError::not_found(err.to_string()),
            TextliftError::OcrTimeout(_) => {
                error!(error = %err, "OCR timed out");
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, err.to_string())
            }
            TextliftError::Io(_) | TextliftError::Other(_) => {
                error!(error = %err, "Internal error");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
            other => {
                error!(error = %other, "Request failed");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::new(err.status(), err.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_statuses() {
        let cases = [
            (TextliftError::TesseractNotFound, StatusCode::INTERNAL_SERVER_ERROR),
            (TextliftError::InvalidImage("x".into()), StatusCode::BAD_REQUEST),
            (TextliftError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (TextliftError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (TextliftError::OcrTimeout(60), StatusCode::GATEWAY_TIMEOUT),
            (TextliftError::OcrFailed("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn internal_details_stay_out_of_the_body() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/uploads/x.png");
        let err = ApiError::from(TextliftError::Io(io));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, INTERNAL_ERROR);

        let err = ApiError::from(TextliftError::Other(anyhow::anyhow!("task 3 panicked")));
        assert_eq!(err.message, INTERNAL_ERROR);
    }

    #[test]
    fn only_missing_tesseract_carries_help() {
        assert_eq!(
            ApiError::from(TextliftError::TesseractNotFound).help,
            Some(DEBUG_HELP)
        );
        assert_eq!(ApiError::from(TextliftError::OcrFailed("x".into())).help, None);
    }
}
