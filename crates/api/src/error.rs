use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use greenview_client::GatewayError;
use greenview_core::error::CoreError;
use greenview_sync::{CacheError, SyncError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps the error enums of the lower crates and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent
/// `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::MalformedSplat(msg) => {
                    (StatusCode::BAD_GATEWAY, "REMOTE_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => internal(msg),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Integration errors ---
            AppError::Gateway(err) => {
                let status = match err {
                    GatewayError::Disabled => StatusCode::SERVICE_UNAVAILABLE,
                    GatewayError::MissingCredential => StatusCode::BAD_REQUEST,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, err.kind().as_str(), err.to_string())
            }
            AppError::Sync(err) => match err {
                SyncError::EmptyCatalog => {
                    (StatusCode::BAD_GATEWAY, err.kind().as_str(), err.to_string())
                }
                SyncError::Store(db) => classify_sqlx_error(db),
            },
            AppError::Cache(err) => match err {
                CacheError::NoSource { .. } => {
                    (StatusCode::NOT_FOUND, err.kind().as_str(), err.to_string())
                }
                CacheError::Download { .. } | CacheError::EmptyBody { .. } => {
                    (StatusCode::BAD_GATEWAY, err.kind().as_str(), err.to_string())
                }
                CacheError::Io(io) => internal(&io.to_string()),
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => internal(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal(detail: &str) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            internal(&db_err.to_string())
        }
        other => internal(&other.to_string()),
    }
}
