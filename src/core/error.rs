use crate::entities::InvitationStatus;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by the invitation state machine and the scoring engine.
///
/// Every variant is a deterministic consequence of caller input (or of the
/// store being unavailable): none of them is retried automatically.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A uniqueness or structural invariant of the schema was broken.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    /// The caller is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    /// Illegal state machine input.
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: InvitationStatus,
        to: InvitationStatus,
    },
    /// Answer references a question or choice outside the attempt.
    #[error("invalid answer: {0}")]
    InvalidAnswer(&'static str),
    /// The question was already answered in this attempt.
    #[error("question {question_id} already answered in attempt {attempt_id}")]
    DuplicateAnswer { attempt_id: i64, question_id: i64 },
    /// Referenced entity is missing.
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CoreError::NotFound("resource"),
            sqlx::Error::Database(ref db_err)
                if db_err.is_unique_violation()
                    || db_err.is_check_violation()
                    || db_err.is_foreign_key_violation() =>
            {
                CoreError::ConstraintViolation(db_err.message().to_string())
            }
            other => CoreError::Database(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let details = err.to_string();
        let app_error = match err {
            CoreError::ConstraintViolation(_) => Self::conflict("Constraint violation"),
            CoreError::DuplicateAnswer { .. } => Self::conflict("Question already answered"),
            CoreError::Forbidden(message) => Self::forbidden(message),
            CoreError::InvalidTransition { .. } => Self::bad_request("Invalid transition"),
            CoreError::InvalidAnswer(message) => Self::bad_request(message),
            CoreError::NotFound(_) => Self::not_found("Resource not found"),
            CoreError::Database(inner) => Self::from(inner),
        };
        app_error.with_details(details)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),

            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::conflict("Constraint violation").with_details(db_err.message().to_string())
            }

            sqlx::Error::Database(_) => Self::bad_request("Database error"),

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::service_unavailable("Database unavailable")
            }

            _ => Self::internal_server_error("Internal server error"),
        }
    }
}

impl From<axum::Error> for AppError {
    fn from(err: axum::Error) -> Self {
        Self::internal_server_error("Internal server error").with_details(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request("Validation error").with_details(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_client_statuses() {
        let cases = [
            (
                CoreError::ConstraintViolation("UNIQUE".into()),
                StatusCode::CONFLICT,
            ),
            (
                CoreError::DuplicateAnswer {
                    attempt_id: 1,
                    question_id: 2,
                },
                StatusCode::CONFLICT,
            ),
            (CoreError::Forbidden("nope"), StatusCode::FORBIDDEN),
            (
                CoreError::InvalidTransition {
                    from: InvitationStatus::Accepted,
                    to: InvitationStatus::Declined,
                },
                StatusCode::BAD_REQUEST,
            ),
            (CoreError::InvalidAnswer("bad"), StatusCode::BAD_REQUEST),
            (CoreError::NotFound("invitation"), StatusCode::NOT_FOUND),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(matches!(
            CoreError::from(sqlx::Error::RowNotFound),
            CoreError::NotFound(_)
        ));
        assert_eq!(
            AppError::from(sqlx::Error::PoolTimedOut).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
