//! Single-splat lookup: local catalog first, remote API second.

use std::sync::Arc;

use serde_json::Value;

use crate::source::SplatSource;
use crate::store::CatalogStore;

#[derive(Clone)]
pub struct SplatLookup {
    store: Arc<dyn CatalogStore>,
    remote: Arc<dyn SplatSource>,
}

impl SplatLookup {
    pub fn new(store: Arc<dyn CatalogStore>, remote: Arc<dyn SplatSource>) -> Self {
        Self { store, remote }
    }

    /// Use a different remote, keeping the local store.
    pub fn with_remote(&self, remote: Arc<dyn SplatSource>) -> Self {
        Self {
            store: self.store.clone(),
            remote,
        }
    }

    /// Raw payload of the splat identified by id (`by_id`) or slug.
    ///
    /// A local store error is logged and treated as a miss. Remote failures
    /// are already recorded by the gateway and yield `None`.
    pub async fn get_splat_data(&self, identifier: &str, by_id: bool) -> Option<Value> {
        match self.store.find_payload(identifier, by_id).await {
            Ok(Some(payload)) => return Some(payload),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(identifier, by_id, error = %e, "Local splat lookup failed");
            }
        }

        let remote = if by_id {
            self.remote.fetch_by_id(identifier).await
        } else {
            self.remote.fetch_by_slug(identifier).await
        };

        match remote {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::debug!(identifier, by_id, error = %e, "Remote splat lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use greenview_client::GatewayError;
    use greenview_core::splat::NewSplat;
    use greenview_core::types::DbId;
    use serde_json::json;

    use super::*;

    struct LocalOnly {
        payload: Option<Value>,
        fail: bool,
    }

    #[async_trait]
    impl CatalogStore for LocalOnly {
        async fn purge_unpublished(&self) -> Result<u64, sqlx::Error> {
            Ok(0)
        }
        async fn open_generation(&self) -> Result<DbId, sqlx::Error> {
            Ok(1)
        }
        async fn stage(&self, _: DbId, _: &NewSplat) -> Result<(), sqlx::Error> {
            Ok(())
        }
        async fn publish(&self, _: DbId) -> Result<i64, sqlx::Error> {
            Ok(0)
        }
        async fn discard(&self, _: DbId) -> Result<(), sqlx::Error> {
            Ok(())
        }
        async fn record_sync_time(&self, _: i64) -> Result<(), sqlx::Error> {
            Ok(())
        }
        async fn find_payload(&self, _: &str, _: bool) -> Result<Option<Value>, sqlx::Error> {
            if self.fail {
                return Err(sqlx::Error::PoolTimedOut);
            }
            Ok(self.payload.clone())
        }
    }

    #[derive(Default)]
    struct Remote {
        calls: Mutex<Vec<String>>,
        missing: bool,
    }

    impl Remote {
        fn answer(&self, call: String) -> Result<Value, GatewayError> {
            self.calls.lock().unwrap().push(call);
            if self.missing {
                Err(GatewayError::Status {
                    url: "mock://splats".into(),
                    status: 404,
                    body_preview: String::new(),
                })
            } else {
                Ok(json!({"id": "remote"}))
            }
        }
    }

    #[async_trait]
    impl SplatSource for Remote {
        async fn fetch_by_id(&self, id: &str) -> Result<Value, GatewayError> {
            self.answer(format!("id:{id}"))
        }
        async fn fetch_by_slug(&self, slug: &str) -> Result<Value, GatewayError> {
            self.answer(format!("slug:{slug}"))
        }
    }

    #[tokio::test]
    async fn local_hit_skips_remote() {
        let remote = Arc::new(Remote::default());
        let lookup = SplatLookup::new(
            Arc::new(LocalOnly {
                payload: Some(json!({"id": "local"})),
                fail: false,
            }),
            remote.clone(),
        );

        let found = lookup.get_splat_data("chair", false).await.unwrap();
        assert_eq!(found["id"], "local");
        assert!(remote.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn local_miss_falls_back_by_kind() {
        let remote = Arc::new(Remote::default());
        let lookup = SplatLookup::new(
            Arc::new(LocalOnly {
                payload: None,
                fail: false,
            }),
            remote.clone(),
        );

        assert!(lookup.get_splat_data("chair", false).await.is_some());
        assert!(lookup.get_splat_data("42", true).await.is_some());
        assert_eq!(*remote.calls.lock().unwrap(), vec!["slug:chair", "id:42"]);
    }

    #[tokio::test]
    async fn store_error_falls_back_and_remote_miss_is_none() {
        let remote = Arc::new(Remote {
            missing: true,
            ..Remote::default()
        });
        let lookup = SplatLookup::new(
            Arc::new(LocalOnly {
                payload: None,
                fail: true,
            }),
            remote.clone(),
        );

        assert_eq!(lookup.get_splat_data("42", true).await, None);
        assert_eq!(remote.calls.lock().unwrap().len(), 1);
    }
}
