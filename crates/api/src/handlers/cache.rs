//! Handlers for the `/cache` resource.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Cleared {
    pub removed: usize,
}

/// DELETE /api/v1/cache
pub async fn clear_all(State(state): State<AppState>) -> AppResult<Json<DataResponse<Cleared>>> {
    let removed = state.file_cache.clear(None).await?;
    Ok(Json(DataResponse {
        data: Cleared { removed },
    }))
}

/// DELETE /api/v1/cache/{id}
pub async fn clear_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Cleared>>> {
    let removed = state.file_cache.clear(Some(&id)).await?;
    Ok(Json(DataResponse {
        data: Cleared { removed },
    }))
}
