//! Custom error types for the game service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::session::SessionError;

/// Custom error type for the game service
#[derive(Error, Debug)]
pub enum GameError {
    /// Malformed or missing input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad credentials or no authenticated session
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The request body is not JSON
    #[error("Request must be JSON")]
    UnsupportedMediaType,

    /// Unexpected failure, the message is safe to show to clients
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Session store error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Password hashing error
    #[error("Password hash error: {0}")]
    PasswordHash(argon2::password_hash::Error),
}

impl From<argon2::password_hash::Error> for GameError {
    fn from(err: argon2::password_hash::Error) -> Self {
        GameError::PasswordHash(err)
    }
}

impl GameError {
    /// Status code this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            GameError::Validation(_) | GameError::Conflict(_) => StatusCode::BAD_REQUEST,
            GameError::Authentication(_) => StatusCode::UNAUTHORIZED,
            GameError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            GameError::Internal(_)
            | GameError::Database(_)
            | GameError::Session(_)
            | GameError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            GameError::Validation(msg)
            | GameError::Conflict(msg)
            | GameError::Authentication(msg)
            | GameError::Internal(msg) => msg,
            GameError::UnsupportedMediaType => "Request must be JSON".to_string(),
            GameError::Database(e) => {
                error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            GameError::Session(e) => {
                error!("Session store error: {}", e);
                "Internal server error".to_string()
            }
            GameError::PasswordHash(e) => {
                error!("Password hash error: {}", e);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for game service results
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: GameError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (status, body) = body_of(GameError::Conflict("Username already exists".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Username already exists");

        let (status, _) = body_of(GameError::UnsupportedMediaType).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let (status, _) = body_of(GameError::Authentication("Not logged in".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_infrastructure_errors_are_not_leaked() {
        let err = GameError::Database(DatabaseError::Migration("table users is locked".into()));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
