//! Handlers for the `/logs` resource (diagnostic log of failed API calls).

use axum::extract::{Query, State};
use axum::Json;
use greenview_db::models::api_log::ApiLog;
use greenview_db::repositories::ApiLogRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

/// GET /api/v1/logs
///
/// Newest entries first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Page<ApiLog>>>> {
    params.validate()?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);

    let items = ApiLogRepo::list(&state.pool, limit, offset).await?;
    let total = ApiLogRepo::count(&state.pool).await?;
    Ok(Json(DataResponse {
        data: Page { items, total },
    }))
}

/// DELETE /api/v1/logs
pub async fn clear(State(state): State<AppState>) -> AppResult<Json<DataResponse<Deleted>>> {
    let deleted = ApiLogRepo::clear_all(&state.pool).await?;
    tracing::info!(deleted, "Cleared diagnostic log");
    Ok(Json(DataResponse {
        data: Deleted { deleted },
    }))
}
