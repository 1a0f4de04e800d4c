use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use licensing_core::error::CoreError;
use serde_json::json;

/// Error type returned by every fallible handler.
///
/// Renders as `{"error": <message>, "code": <CODE>}`. Internal failures are
/// logged and replaced by a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request body was not the JSON the handler expects. Always a 422,
    /// whatever the extractor's own status.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),
}

pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(CoreError::LicenceNotFound(code)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Licence {code} not found"),
            ),
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Core(CoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "CONFLICT", msg.clone())
            }
            AppError::Core(CoreError::Unauthorized(msg)) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
            }
            AppError::Core(CoreError::Internal(msg)) => {
                tracing::error!(error = %msg, "Internal core error");
                internal()
            }
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Json(rejection) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_BODY",
                rejection.body_text(),
            ),
            AppError::Query(rejection) => {
                (StatusCode::BAD_REQUEST, "INVALID_QUERY", rejection.body_text())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

/// `RowNotFound` is a 404 and a `uq_*` unique violation a 409. Anything else
/// is logged and hidden behind a 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let sqlx::Error::RowNotFound = err {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }
    if let sqlx::Error::Database(db_err) = err {
        if let Some(constraint) = unique_violation(&**db_err).filter(|c| c.starts_with("uq_")) {
            return (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Duplicate value violates unique constraint: {constraint}"),
            );
        }
    }
    tracing::error!(error = %err, "Database error");
    internal()
}

/// Name of the violated constraint when `err` is a PostgreSQL unique
/// violation (SQLSTATE 23505).
pub fn unique_violation(err: &dyn sqlx::error::DatabaseError) -> Option<&str> {
    if err.code().as_deref() == Some("23505") {
        Some(err.constraint().unwrap_or("unknown"))
    } else {
        None
    }
}
