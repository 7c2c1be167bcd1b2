//! Diagnostic log rows (`api_logs`).

use greenview_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One failed integration call, as recorded by the gateway.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApiLog {
    pub id: DbId,
    pub operation: String,
    pub url: Option<String>,
    pub error_message: String,
    pub response_code: Option<i32>,
    pub response_body_preview: Option<String>,
    pub user_ip: String,
    pub user_agent: String,
    pub created_at: Timestamp,
}
