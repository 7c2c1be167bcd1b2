//! Route definitions for the `/cache` resource.

use axum::routing::delete;
use axum::Router;

use crate::handlers::cache;
use crate::state::AppState;

/// Routes mounted at `/cache`.
///
/// ```text
/// DELETE /          -> clear_all
/// DELETE /{id}      -> clear_one
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", delete(cache::clear_all))
        .route("/{id}", delete(cache::clear_one))
}
