pub mod cache;
pub mod config;
pub mod health;
pub mod logs;
pub mod splats;
pub mod sync;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /sync                          trigger sync (POST)
/// /sync/last                     last successful sync time
/// /sync/status                   current synchronizer state
///
/// /splats                        list local catalog
/// /splats/by-slug/{slug}         lookup by slug (local, then remote)
/// /splats/{id}                   lookup by id (local, then remote)
/// /splats/{id}/cached-url        local URL of the cached binary
///
/// /cache                         clear all cached binaries (DELETE)
/// /cache/{id}                    clear one splat's binaries (DELETE)
///
/// /logs                          list, clear diagnostic log
///
/// /config/status                 integration settings and company info
/// /config/validate               validate a token (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sync", sync::router())
        .nest("/splats", splats::router())
        .nest("/cache", cache::router())
        .nest("/logs", logs::router())
        .nest("/config", config::router())
}
