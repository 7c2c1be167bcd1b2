//! Handlers for the `/sync` resource.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use greenview_db::repositories::SettingRepo;
use greenview_sync::{SyncReport, SyncState};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LastSync {
    /// Unix seconds of the last published catalog, if any.
    pub timestamp: Option<i64>,
}

/// POST /api/v1/sync
///
/// Mirror the remote catalog. Waits for a run already in progress.
///
/// The run is spawned so that a timed-out or disconnected request does not
/// cut it short.
pub async fn trigger(State(state): State<AppState>) -> AppResult<Json<DataResponse<SyncReport>>> {
    let synchronizer = Arc::clone(&state.synchronizer);
    let report = tokio::spawn(async move { synchronizer.run().await })
        .await
        .map_err(|e| AppError::InternalError(format!("Sync task failed: {e}")))??;
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/v1/sync/last
pub async fn last_sync(State(state): State<AppState>) -> AppResult<Json<DataResponse<LastSync>>> {
    let timestamp = SettingRepo::last_sync_time(&state.pool).await?;
    Ok(Json(DataResponse {
        data: LastSync { timestamp },
    }))
}

/// GET /api/v1/sync/status
pub async fn status(State(state): State<AppState>) -> Json<DataResponse<SyncState>> {
    Json(DataResponse {
        data: state.synchronizer.state(),
    })
}
