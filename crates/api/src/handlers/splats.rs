//! Handlers for the `/splats` resource.
//!
//! Single-splat reads go through [`SplatLookup`](greenview_sync::SplatLookup):
//! the local catalog first, the integration API second.

use axum::extract::{Path, Query, State};
use axum::Json;
use greenview_core::error::CoreError;
use greenview_db::models::splat::{Splat, SplatListParams};
use greenview_db::repositories::SplatRepo;
use greenview_sync::{CacheSource, CachedFile};
use serde_json::Value;

use crate::error::AppResult;
use crate::extract::CallerOrigin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

/// GET /api/v1/splats
///
/// List the active local catalog, ordered by name.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Page<Splat>>>> {
    params.validate()?;
    let params = SplatListParams {
        limit: params.limit,
        offset: params.offset,
    };
    let items = SplatRepo::list(&state.pool, &params).await?;
    let total = SplatRepo::count(&state.pool).await?;
    Ok(Json(DataResponse {
        data: Page { items, total },
    }))
}

/// GET /api/v1/splats/by-slug/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    CallerOrigin(origin): CallerOrigin,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Value>>> {
    let data = find(&state, origin, &slug, false).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/splats/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    CallerOrigin(origin): CallerOrigin,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Value>>> {
    let data = find(&state, origin, &id, true).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/splats/{id}/cached-url
///
/// Resolve the splat binary through the file cache, downloading it on a
/// miss, and return its public URL.
pub async fn cached_url(
    State(state): State<AppState>,
    CallerOrigin(origin): CallerOrigin,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<CachedFile>>> {
    let payload = find(&state, origin, &id, true).await?;
    let file = state
        .file_cache
        .resolve(&CacheSource::from_payload(&payload))
        .await?;
    Ok(Json(DataResponse { data: file }))
}

async fn find(
    state: &AppState,
    origin: greenview_core::diagnostics::RequestOrigin,
    identifier: &str,
    by_id: bool,
) -> AppResult<Value> {
    state
        .lookup_for(origin)
        .get_splat_data(identifier, by_id)
        .await
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Splat",
                key: identifier.to_string(),
            }
            .into()
        })
}
