//! Error type for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Authentication errors rendered as JSON responses
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing, invalid, expired or revoked credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Malformed or invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Too many login attempts
    #[error("Too many requests")]
    TooManyRequests,

    /// Storage or signing failure; details are logged at the call site
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AuthError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many login attempts, try again later".to_string(),
            ),
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
