//! Repository for the `splats` and `catalog_generations` tables.
//!
//! The catalog is double-buffered. A sync run opens a staging generation,
//! upserts every item into it, then [`SplatRepo::publish`] flips the active
//! pointer and drops older generations in one transaction. All reads go
//! through the active generation, so readers never observe a half-written
//! catalog.

use greenview_core::splat::NewSplat;
use greenview_core::types::DbId;
use sqlx::PgPool;

use crate::models::splat::{CatalogGeneration, Splat, SplatListParams};

/// Column list for `splats` queries (alias `s`).
const COLUMNS: &str = "\
    s.id, s.slug, s.name, s.description, s.file_type, s.file_url, \
    s.file_ar_url, s.thumbnail_url, s.ar_short_link, s.viewer_short_link, \
    s.ar_enabled, s.plugin_config, s.data_json, \
    s.remote_created_at, s.remote_updated_at, s.synced_at";

/// Column list for `catalog_generations` queries.
const GENERATION_COLUMNS: &str = "id, is_active, item_count, created_at, published_at";

/// Join restricting `splats` rows to the active generation.
const ACTIVE_JOIN: &str = "\
    FROM splats s \
    JOIN catalog_generations g ON g.id = s.generation_id AND g.is_active";

/// Default page size for catalog listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for catalog listing.
const MAX_LIMIT: i64 = 200;

/// Provides staged replacement and point lookups for the splat catalog.
pub struct SplatRepo;

impl SplatRepo {
    // -----------------------------------------------------------------------
    // Staged replacement
    // -----------------------------------------------------------------------

    /// Delete generations that were staged but never published.
    ///
    /// Leftovers only exist when a previous run died before publishing.
    pub async fn purge_unpublished(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM catalog_generations WHERE NOT is_active AND published_at IS NULL",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Open a new, inactive generation to stage a sync run into.
    pub async fn open_generation(pool: &PgPool) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) =
            sqlx::query_as("INSERT INTO catalog_generations DEFAULT VALUES RETURNING id")
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Write one item into a staging generation, keyed by remote id.
    ///
    /// A repeated id within the same generation overwrites the earlier row.
    /// A slug already used by another id in the generation fails with a
    /// unique violation on `uq_splats_generation_slug`.
    pub async fn stage(
        pool: &PgPool,
        generation_id: DbId,
        splat: &NewSplat,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO splats (\
                generation_id, id, slug, name, description, file_type, file_url, \
                file_ar_url, thumbnail_url, ar_short_link, viewer_short_link, \
                ar_enabled, plugin_config, data_json, remote_created_at, remote_updated_at\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             ON CONFLICT (generation_id, id) DO UPDATE SET \
                slug = EXCLUDED.slug, \
                name = EXCLUDED.name, \
                description = EXCLUDED.description, \
                file_type = EXCLUDED.file_type, \
                file_url = EXCLUDED.file_url, \
                file_ar_url = EXCLUDED.file_ar_url, \
                thumbnail_url = EXCLUDED.thumbnail_url, \
                ar_short_link = EXCLUDED.ar_short_link, \
                viewer_short_link = EXCLUDED.viewer_short_link, \
                ar_enabled = EXCLUDED.ar_enabled, \
                plugin_config = EXCLUDED.plugin_config, \
                data_json = EXCLUDED.data_json, \
                remote_created_at = EXCLUDED.remote_created_at, \
                remote_updated_at = EXCLUDED.remote_updated_at, \
                synced_at = now()",
        )
        .bind(generation_id)
        .bind(&splat.id)
        .bind(splat.slug.as_deref())
        .bind(&splat.name)
        .bind(&splat.description)
        .bind(&splat.file_type)
        .bind(&splat.file_url)
        .bind(&splat.file_ar_url)
        .bind(&splat.thumbnail_url)
        .bind(&splat.ar_short_link)
        .bind(&splat.viewer_short_link)
        .bind(splat.ar_enabled)
        .bind(splat.plugin_config.as_ref())
        .bind(&splat.raw_payload)
        .bind(splat.remote_created_at.as_deref())
        .bind(splat.remote_updated_at.as_deref())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Make `generation_id` the active catalog and drop every other
    /// generation. Returns the number of rows in the published generation.
    pub async fn publish(pool: &PgPool, generation_id: DbId) -> Result<i64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE catalog_generations SET is_active = false WHERE is_active")
            .execute(&mut *tx)
            .await?;

        let row: (i64,) = sqlx::query_as(
            "UPDATE catalog_generations SET \
                is_active = true, \
                published_at = now(), \
                item_count = (SELECT COUNT(*) FROM splats WHERE generation_id = $1) \
             WHERE id = $1 \
             RETURNING item_count::bigint",
        )
        .bind(generation_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM catalog_generations WHERE id <> $1")
            .bind(generation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.0)
    }

    /// Drop a staging generation without publishing it.
    pub async fn discard(pool: &PgPool, generation_id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM catalog_generations WHERE id = $1 AND NOT is_active")
                .bind(generation_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The currently published generation, if any sync has completed.
    pub async fn active_generation(
        pool: &PgPool,
    ) -> Result<Option<CatalogGeneration>, sqlx::Error> {
        let query = format!(
            "SELECT {GENERATION_COLUMNS} FROM catalog_generations WHERE is_active"
        );
        sqlx::query_as::<_, CatalogGeneration>(&query)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Reads (active generation only)
    // -----------------------------------------------------------------------

    /// Find a splat by its remote id.
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Splat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} {ACTIVE_JOIN} WHERE s.id = $1");
        sqlx::query_as::<_, Splat>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a splat by its slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Splat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} {ACTIVE_JOIN} WHERE s.slug = $1");
        sqlx::query_as::<_, Splat>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List splats ordered by name.
    pub async fn list(pool: &PgPool, params: &SplatListParams) -> Result<Vec<Splat>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} {ACTIVE_JOIN} \
             ORDER BY s.name, s.id \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Splat>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count splats in the active generation.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) {ACTIVE_JOIN}");
        let row: (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
        Ok(row.0)
    }

    /// All `(id, slug)` pairs of the active generation, ordered by id.
    pub async fn list_keys(pool: &PgPool) -> Result<Vec<(String, Option<String>)>, sqlx::Error> {
        let query = format!("SELECT s.id, s.slug {ACTIVE_JOIN} ORDER BY s.id");
        sqlx::query_as(&query).fetch_all(pool).await
    }
}
