use std::sync::Arc;

use greenview_client::GreenViewApi;
use greenview_core::config::ViewerConfig;
use greenview_core::diagnostics::{DiagnosticSink, RequestOrigin};
use greenview_db::diagnostics::PgDiagnosticSink;
use greenview_sync::{FileCache, PgCatalogStore, SplatLookup, Synchronizer};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: greenview_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Integration settings, fixed at startup.
    pub viewer: Arc<ViewerConfig>,
    /// Gateway to the integration API. Failures land in `api_logs`.
    pub api: GreenViewApi,
    pub synchronizer: Arc<Synchronizer>,
    pub file_cache: Arc<FileCache>,
    pub lookup: SplatLookup,
}

impl AppState {
    /// Wire the gateway, synchronizer, lookup, and file cache around `pool`.
    pub fn new(
        pool: greenview_db::DbPool,
        config: ServerConfig,
        viewer: ViewerConfig,
    ) -> Result<Self, reqwest::Error> {
        let sink: Arc<dyn DiagnosticSink> = Arc::new(PgDiagnosticSink::new(pool.clone()));
        let api = GreenViewApi::new(&viewer, sink)?;
        let store = Arc::new(PgCatalogStore::new(pool.clone()));

        let synchronizer = Arc::new(Synchronizer::new(Arc::new(api.clone()), store.clone()));
        let lookup = SplatLookup::new(store, Arc::new(api.clone()));
        let file_cache = Arc::new(FileCache::new(&viewer)?);

        Ok(Self {
            pool,
            config: Arc::new(config),
            viewer: Arc::new(viewer),
            api,
            synchronizer,
            file_cache,
            lookup,
        })
    }

    /// Gateway stamping diagnostic entries with the given caller.
    pub fn api_for(&self, origin: RequestOrigin) -> GreenViewApi {
        self.api.with_origin(origin)
    }

    /// Lookup whose remote fallback is attributed to the given caller.
    pub fn lookup_for(&self, origin: RequestOrigin) -> SplatLookup {
        self.lookup.with_remote(Arc::new(self.api_for(origin)))
    }
}
