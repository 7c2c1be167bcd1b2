//! Route definitions for the `/config` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::config;
use crate::state::AppState;

/// Routes mounted at `/config`.
///
/// ```text
/// GET    /status      -> status
/// POST   /validate    -> validate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(config::status))
        .route("/validate", post(config::validate))
}
