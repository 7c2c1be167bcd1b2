//! Key/value settings rows.

use greenview_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// Settings key holding the unix time of the last successful sync.
pub const KEY_LAST_SYNC_TIME: &str = "sync.last_sync_time";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: Timestamp,
}
