use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{ActiveEnum, DbErr, SqlErr};
use tracing::field::display;

use super::response::Envelope;
use crate::entities::tool::TransitionError;

/// Every way a request can fail. Rendered with the same envelope as
/// successful responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },
    #[error("{message}")]
    Precondition { message: String, errors: Vec<String> },
    #[error("database error: {0}")]
    Database(DbErr),
    #[error("{message}")]
    Unexpected { message: String, errors: Vec<String> },
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{what} not found"))
    }

    pub fn validation(message: impl Into<String>, error: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            errors: vec![error.into()],
        }
    }

    /// Wraps a database failure raised while computing a read-only view.
    pub fn unexpected(message: impl Into<String>, err: DbErr) -> Self {
        ApiError::Unexpected {
            message: message.into(),
            errors: vec![err.to_string()],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation { .. } | ApiError::Precondition { .. } => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Unexpected { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => ApiError::Validation {
                message: "Duplicate value for a unique field".to_string(),
                errors: vec![detail],
            },
            _ => ApiError::Database(err),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        ApiError::Precondition {
            message: err.to_string(),
            errors: vec![format!("Tool status must be {}", err.required().to_value())],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        tracing::Span::current().record("error", display(&self));

        let (message, errors) = match self {
            ApiError::NotFound(message) => (message.clone(), vec![message]),
            ApiError::Validation { message, errors }
            | ApiError::Precondition { message, errors }
            | ApiError::Unexpected { message, errors } => (message, errors),
            ApiError::Database(err) => ("Database error".to_string(), vec![err.to_string()]),
        };

        (status, Envelope::<()>::failure(message, errors)).into_response()
    }
}
