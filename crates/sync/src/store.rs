//! Local catalog seam and its PostgreSQL implementation.

use async_trait::async_trait;
use greenview_core::splat::NewSplat;
use greenview_core::types::DbId;
use greenview_db::repositories::{SettingRepo, SplatRepo};
use greenview_db::DbPool;
use serde_json::Value;

/// Staged write access plus point reads on the local catalog.
///
/// Writes go into a staging generation that becomes visible only once
/// [`CatalogStore::publish`] succeeds.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Drop staging generations left behind by an interrupted run.
    async fn purge_unpublished(&self) -> Result<u64, sqlx::Error>;

    async fn open_generation(&self) -> Result<DbId, sqlx::Error>;

    /// Upsert one item (by id) into a staging generation.
    async fn stage(&self, generation: DbId, splat: &NewSplat) -> Result<(), sqlx::Error>;

    /// Make `generation` the active catalog and drop all others.
    /// Returns the number of items in the published generation.
    async fn publish(&self, generation: DbId) -> Result<i64, sqlx::Error>;

    async fn discard(&self, generation: DbId) -> Result<(), sqlx::Error>;

    async fn record_sync_time(&self, unix_secs: i64) -> Result<(), sqlx::Error>;

    /// Stored raw payload of an active splat, looked up by id or slug.
    async fn find_payload(&self, identifier: &str, by_id: bool)
        -> Result<Option<Value>, sqlx::Error>;
}

/// [`CatalogStore`] backed by the `splats` / `catalog_generations` tables.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn purge_unpublished(&self) -> Result<u64, sqlx::Error> {
        SplatRepo::purge_unpublished(&self.pool).await
    }

    async fn open_generation(&self) -> Result<DbId, sqlx::Error> {
        SplatRepo::open_generation(&self.pool).await
    }

    async fn stage(&self, generation: DbId, splat: &NewSplat) -> Result<(), sqlx::Error> {
        SplatRepo::stage(&self.pool, generation, splat).await
    }

    async fn publish(&self, generation: DbId) -> Result<i64, sqlx::Error> {
        SplatRepo::publish(&self.pool, generation).await
    }

    async fn discard(&self, generation: DbId) -> Result<(), sqlx::Error> {
        SplatRepo::discard(&self.pool, generation).await.map(|_| ())
    }

    async fn record_sync_time(&self, unix_secs: i64) -> Result<(), sqlx::Error> {
        SettingRepo::record_sync_time(&self.pool, unix_secs).await
    }

    async fn find_payload(
        &self,
        identifier: &str,
        by_id: bool,
    ) -> Result<Option<Value>, sqlx::Error> {
        let row = if by_id {
            SplatRepo::find_by_id(&self.pool, identifier).await?
        } else {
            SplatRepo::find_by_slug(&self.pool, identifier).await?
        };
        Ok(row.map(|splat| splat.data_json))
    }
}
