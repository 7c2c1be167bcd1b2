//! Repository for the append-only `api_logs` table.

use greenview_core::diagnostics::NewApiLog;
use sqlx::PgPool;

use crate::models::api_log::ApiLog;

/// Column list for api_logs queries.
const COLUMNS: &str = "id, operation, url, error_message, response_code, \
    response_body_preview, user_ip, user_agent, created_at";

/// Provides append, listing, and bulk-clear for diagnostic log entries.
pub struct ApiLogRepo;

impl ApiLogRepo {
    /// Append one entry.
    pub async fn create(pool: &PgPool, input: &NewApiLog) -> Result<ApiLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO api_logs
                (operation, url, error_message, response_code,
                 response_body_preview, user_ip, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApiLog>(&query)
            .bind(&input.operation)
            .bind(&input.url)
            .bind(&input.error_message)
            .bind(input.response_code)
            .bind(&input.response_body_preview)
            .bind(&input.client_ip)
            .bind(&input.user_agent)
            .fetch_one(pool)
            .await
    }

    /// List entries, newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<ApiLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM api_logs
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ApiLog>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count all entries.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM api_logs")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Delete every entry. Returns the number of rows removed.
    pub async fn clear_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM api_logs").execute(pool).await?;
        Ok(result.rows_affected())
    }
}
