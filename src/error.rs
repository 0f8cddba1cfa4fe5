// src/error.rs
//! HTTP error type. Every failure leaving a handler is turned into a JSON
//! body of the form `{"error": kind, "message": text}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::ValidationError;
use crate::poll::PollError;

#[derive(Debug)]
pub enum ApiError {
    /// Bad or missing input (400)
    Validation(ValidationError),

    /// Body could not be read as JSON (400)
    MalformedBody(String),

    /// Option does not belong to the poll (400)
    InvalidVote { poll_id: i64, option_id: i64 },

    /// Poll id does not resolve (404)
    NotFound { id: i64 },

    /// Storage failure (500, logged)
    Storage(sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
            Self::MalformedBody(reason) => (StatusCode::BAD_REQUEST, "malformed_body", reason),
            Self::InvalidVote { poll_id, option_id } => (
                StatusCode::BAD_REQUEST,
                "invalid_vote",
                format!("option {} is not a valid choice for poll {}", option_id, poll_id),
            ),
            Self::NotFound { id } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("poll {} not found", id),
            ),
            Self::Storage(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "an internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<PollError> for ApiError {
    fn from(e: PollError) -> Self {
        match e {
            PollError::Validation(e) => Self::Validation(e),
            PollError::NotFound(id) => Self::NotFound { id },
            PollError::InvalidVote { poll_id, option_id } => Self::InvalidVote { poll_id, option_id },
            PollError::Storage(e) => Self::Storage(e),
        }
    }
}
