//! Shared query parameter types for API handlers.

use serde::Deserialize;

use crate::error::AppError;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Large limits are clamped in the repository layer.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Reject a non-positive `limit` or a negative `offset`.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(limit) = self.limit.filter(|l| *l < 1) {
            return Err(AppError::BadRequest(format!(
                "limit must be at least 1, got {limit}"
            )));
        }
        if let Some(offset) = self.offset.filter(|o| *o < 0) {
            return Err(AppError::BadRequest(format!(
                "offset must not be negative, got {offset}"
            )));
        }
        Ok(())
    }
}
