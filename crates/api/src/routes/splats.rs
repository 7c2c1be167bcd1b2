//! Route definitions for the `/splats` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::splats;
use crate::state::AppState;

/// Routes mounted at `/splats`.
///
/// ```text
/// GET    /                     -> list
/// GET    /by-slug/{slug}       -> get_by_slug
/// GET    /{id}                 -> get_by_id
/// GET    /{id}/cached-url      -> cached_url
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(splats::list))
        .route("/by-slug/{slug}", get(splats::get_by_slug))
        .route("/{id}", get(splats::get_by_id))
        .route("/{id}/cached-url", get(splats::cached_url))
}
