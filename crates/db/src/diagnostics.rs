//! Database-backed [`DiagnosticSink`].

use async_trait::async_trait;
use greenview_core::diagnostics::{DiagnosticSink, NewApiLog};
use greenview_core::error::CoreError;

use crate::repositories::ApiLogRepo;
use crate::DbPool;

/// Appends gateway failures to the `api_logs` table.
#[derive(Clone)]
pub struct PgDiagnosticSink {
    pool: DbPool,
}

impl PgDiagnosticSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiagnosticSink for PgDiagnosticSink {
    async fn record(&self, entry: NewApiLog) -> Result<(), CoreError> {
        ApiLogRepo::create(&self.pool, &entry)
            .await
            .map(|_| ())
            .map_err(|e| CoreError::Internal(format!("failed to save API log: {e}")))
    }
}
