//! Splat catalog models (`splats`, `catalog_generations`).

use greenview_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the active generation of the `splats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Splat {
    pub id: String,
    pub slug: Option<String>,
    pub name: String,
    pub description: String,
    pub file_type: String,
    pub file_url: String,
    pub file_ar_url: String,
    pub thumbnail_url: String,
    pub ar_short_link: String,
    pub viewer_short_link: String,
    pub ar_enabled: bool,
    pub plugin_config: Option<serde_json::Value>,
    /// Complete remote payload as received during sync.
    pub data_json: serde_json::Value,
    pub remote_created_at: Option<String>,
    pub remote_updated_at: Option<String>,
    pub synced_at: Timestamp,
}

/// A row from the `catalog_generations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogGeneration {
    pub id: DbId,
    pub is_active: bool,
    pub item_count: i32,
    pub created_at: Timestamp,
    pub published_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Query params
// ---------------------------------------------------------------------------

/// Pagination for catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SplatListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
