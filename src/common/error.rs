// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use utoipa::ToSchema;

// Every layer returns this; only handlers/extractors turn it into HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authorization token required with format Bearer <token>")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid organisation")]
    InvalidOrganisation,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// The JSON error body every failed request receives.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Invalid or expired token")]
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

// HTTP-facing form of an AppError.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "One or more fields are invalid".into(),
                    details: Some(json!(details)),
                }
            }
            AppError::BadRequest(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            e @ (AppError::MissingToken
            | AppError::InvalidToken
            | AppError::InvalidApiKey
            | AppError::InvalidCredentials
            | AppError::InvalidOrganisation) => {
                ApiError::new(StatusCode::UNAUTHORIZED, e.to_string())
            }
            AppError::Unauthenticated(msg) => ApiError::new(StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => ApiError::new(StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => ApiError::new(StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, msg),

            // Database, hashing, signing and anything unexpected: log the
            // detail, hand the client a generic message.
            ref e => {
                tracing::error!("Internal server error: {:?}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { error: self.error, details: self.details };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

/// Maps a Postgres unique violation to `Conflict`, everything else to a database error.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::Conflict(message());
        }
    }
    AppError::DatabaseError(err)
}
