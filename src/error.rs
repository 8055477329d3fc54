//! Error handler for accountd.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use sqlx::Error as SqlError;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("missing or invalid 'Authorization' header")]
    Unauthorized,

    #[error("token is invalid")]
    InvalidToken,

    #[error("token has expired")]
    Expired,

    #[error("user not found")]
    NotFound,

    #[error("username '{username}' is already taken")]
    Conflict { username: String },

    #[error("password hashing failed")]
    Hashing(#[from] crate::crypto::CryptoError),

    #[error("token signing failed")]
    Signing(jsonwebtoken::errors::Error),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SqlError),
}

/// Error envelope returned on every failure.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseError {
    pub status_code: u16,
    pub message: String,
}

impl ResponseError {
    /// Create a new [`ResponseError`] envelope.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| match &issue.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: invalid value"),
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, validation_message(errors))
            },

            ServerError::Json(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            },

            ServerError::Query(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            },

            ServerError::Path(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            },

            ServerError::InvalidCredentials
            | ServerError::Unauthorized
            | ServerError::InvalidToken
            | ServerError::Expired => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            },

            ServerError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),

            ServerError::Conflict { .. } => {
                (StatusCode::CONFLICT, self.to_string())
            },

            ServerError::Hashing(err) => {
                tracing::error!(error = %err, "password hashing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            },

            ServerError::Signing(err) => {
                tracing::error!(error = %err, "token signing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            },

            ServerError::Sql(err) => {
                tracing::error!(error = %err, "SQL request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            },
        };

        ResponseError::new(status, message).into_response()
    }
}
