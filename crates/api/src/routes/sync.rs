//! Route definitions for the `/sync` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sync;
use crate::state::AppState;

/// Routes mounted at `/sync`.
///
/// ```text
/// POST   /          -> trigger
/// GET    /last      -> last_sync
/// GET    /status    -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(sync::trigger))
        .route("/last", get(sync::last_sync))
        .route("/status", get(sync::status))
}
