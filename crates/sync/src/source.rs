//! Remote seams used by the synchronizer and the lookup service.
//!
//! Both are implemented by [`GreenViewApi`]; tests substitute in-memory
//! fakes.

use async_trait::async_trait;
use greenview_client::{GatewayError, GreenViewApi};
use greenview_core::envelope::SplatPage;
use serde_json::Value;

/// Paged access to the remote splat catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<SplatPage, GatewayError>;
}

/// Single-splat access to the remote catalog.
#[async_trait]
pub trait SplatSource: Send + Sync {
    async fn fetch_by_id(&self, id: &str) -> Result<Value, GatewayError>;
    async fn fetch_by_slug(&self, slug: &str) -> Result<Value, GatewayError>;
}

#[async_trait]
impl CatalogSource for GreenViewApi {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<SplatPage, GatewayError> {
        self.get_splats(page, limit).await
    }
}

#[async_trait]
impl SplatSource for GreenViewApi {
    async fn fetch_by_id(&self, id: &str) -> Result<Value, GatewayError> {
        self.get_splat_by_id(id).await
    }

    async fn fetch_by_slug(&self, slug: &str) -> Result<Value, GatewayError> {
        self.get_splat_by_slug(slug).await
    }
}
