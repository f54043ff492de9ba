use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::warn;

use crate::db::RecordKind;

#[derive(Debug, ThisError)]
pub enum QuotebookError {
    /// Missing required attribute, empty update, malformed field value.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Store-level constraint violation (e.g. duplicate author name).
    #[error("{0}")]
    Conflict(String),

    /// Request could not be decoded (body syntax, content type, query string).
    #[error("{0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration {version} failed: {message}")]
    MigrationError { version: i64, message: String },

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl QuotebookError {
    pub fn not_found(kind: RecordKind, id: i64) -> Self {
        QuotebookError::NotFound(format!("{kind} with id={id} not found"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            QuotebookError::NotFound(_) => StatusCode::NOT_FOUND,
            // Everything else, including store and actor failures, is reported as a
            // rejected request carrying the underlying message.
            QuotebookError::Validation(_)
            | QuotebookError::Conflict(_)
            | QuotebookError::BadRequest(_)
            | QuotebookError::DatabaseError(_)
            | QuotebookError::MigrationError { .. }
            | QuotebookError::RactorError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for QuotebookError {
    fn from(rejection: JsonRejection) -> Self {
        QuotebookError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for QuotebookError {
    fn from(rejection: QueryRejection) -> Self {
        QuotebookError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for QuotebookError {
    /// A path segment that does not parse as an id cannot name a record.
    fn from(_: PathRejection) -> Self {
        QuotebookError::NotFound("Not Found".to_string())
    }
}

impl IntoResponse for QuotebookError {
    fn into_response(self) -> axum::response::Response {
        if matches!(
            self,
            QuotebookError::DatabaseError(_)
                | QuotebookError::RactorError(_)
                | QuotebookError::MigrationError { .. }
        ) {
            warn!(error = %self, "request failed in the record store");
        }
        let status = self.status();
        let body = ApiErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Error response payload: `{"message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
}
