//! Repository for the `settings` key/value table.

use sqlx::PgPool;

use crate::models::setting::{Setting, KEY_LAST_SYNC_TIME};

/// Provides get/set access to service-owned scalars.
pub struct SettingRepo;

impl SettingRepo {
    /// Fetch a setting by key.
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<Setting>, sqlx::Error> {
        sqlx::query_as::<_, Setting>("SELECT key, value, updated_at FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Insert or overwrite a setting.
    pub async fn set(pool: &PgPool, key: &str, value: &str) -> Result<Setting, sqlx::Error> {
        sqlx::query_as::<_, Setting>(
            "INSERT INTO settings (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now() \
             RETURNING key, value, updated_at",
        )
        .bind(key)
        .bind(value)
        .fetch_one(pool)
        .await
    }

    /// Unix time of the last successful sync. Unparseable values read as
    /// absent.
    pub async fn last_sync_time(pool: &PgPool) -> Result<Option<i64>, sqlx::Error> {
        let setting = Self::get(pool, KEY_LAST_SYNC_TIME).await?;
        Ok(setting.and_then(|s| s.value.parse().ok()))
    }

    /// Record the unix time of a successful sync.
    pub async fn record_sync_time(pool: &PgPool, unix_secs: i64) -> Result<(), sqlx::Error> {
        Self::set(pool, KEY_LAST_SYNC_TIME, &unix_secs.to_string()).await?;
        Ok(())
    }
}
