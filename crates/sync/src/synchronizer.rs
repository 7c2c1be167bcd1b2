//! Catalog synchronizer.
//!
//! Mirrors the remote catalog into the local store:
//!
//! 1. Fetch every page (size [`SYNC_PAGE_SIZE`]) until the remote reports
//!    the last page, a page fails, or [`MAX_PAGES`] is reached.
//! 2. Stage every item into a fresh generation, skipping malformed items.
//! 3. Publish the generation, which replaces the previous catalog in one
//!    transaction.
//!
//! Runs are serialized by a single lock held for the whole run.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use greenview_core::splat::{NewSplat, SYNC_PAGE_SIZE};
use greenview_core::types::DbId;
use serde::Serialize;
use serde_json::Value;

use crate::error::SyncError;
use crate::source::CatalogSource;
use crate::store::CatalogStore;

/// Upper bound on pages fetched in one run.
pub const MAX_PAGES: u32 = 10_000;

/// Observable phase of the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Fetching { page: u32 },
    Replacing,
    /// The last run failed. Cleared when the next run starts.
    Failed,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Items in the published catalog.
    pub count: i64,
    /// Items received from the remote, before normalization.
    pub fetched: usize,
    /// Items dropped as malformed or rejected by the store.
    pub skipped: usize,
    pub pages: u32,
    /// Unix seconds at which the catalog was published.
    pub synced_at: i64,
}

pub struct Synchronizer {
    source: Arc<dyn CatalogSource>,
    store: Arc<dyn CatalogStore>,
    max_pages: u32,
    run_lock: tokio::sync::Mutex<()>,
    state: Mutex<SyncState>,
}

impl Synchronizer {
    pub fn new(source: Arc<dyn CatalogSource>, store: Arc<dyn CatalogStore>) -> Self {
        Self {
            source,
            store,
            max_pages: MAX_PAGES,
            run_lock: tokio::sync::Mutex::new(()),
            state: Mutex::new(SyncState::Idle),
        }
    }

    /// Override the page bound.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `true` while a run holds the lock.
    pub fn is_running(&self) -> bool {
        self.run_lock.try_lock().is_err()
    }

    /// Run one full synchronization. Waits for any run already in progress.
    ///
    /// If this future is dropped mid-run the state ends as
    /// [`SyncState::Failed`].
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let _guard = self.run_lock.lock().await;
        let mut state = StateGuard::new(&self.state);
        let started = Instant::now();
        tracing::info!("Catalog sync started");

        let result = self.run_locked().await;
        match &result {
            Ok(report) => {
                state.finish(SyncState::Idle);
                tracing::info!(
                    count = report.count,
                    fetched = report.fetched,
                    skipped = report.skipped,
                    pages = report.pages,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Catalog sync completed",
                );
            }
            Err(e) => {
                state.finish(SyncState::Failed);
                tracing::error!(error = %e, "Catalog sync failed");
            }
        }
        result
    }

    async fn run_locked(&self) -> Result<SyncReport, SyncError> {
        let (items, pages) = self.fetch_all().await;
        if items.is_empty() {
            return Err(SyncError::EmptyCatalog);
        }

        self.set_state(SyncState::Replacing);

        let purged = self.store.purge_unpublished().await?;
        if purged > 0 {
            tracing::warn!(purged, "Removed unpublished catalog generations");
        }

        let generation = self.store.open_generation().await?;
        let skipped = self.stage_all(generation, &items).await;

        let count = match self.store.publish(generation).await {
            Ok(count) => count,
            Err(e) => {
                if let Err(discard_err) = self.store.discard(generation).await {
                    tracing::warn!(
                        generation,
                        error = %discard_err,
                        "Failed to discard staging generation",
                    );
                }
                return Err(e.into());
            }
        };

        let synced_at = chrono::Utc::now().timestamp();
        if let Err(e) = self.store.record_sync_time(synced_at).await {
            tracing::error!(error = %e, "Failed to record last sync time");
        }

        Ok(SyncReport {
            count,
            fetched: items.len(),
            skipped,
            pages,
            synced_at,
        })
    }

    /// Accumulate items across pages. Returns the items and pages fetched.
    async fn fetch_all(&self) -> (Vec<Value>, u32) {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            self.set_state(SyncState::Fetching { page });

            let batch = match self.source.fetch_page(page, SYNC_PAGE_SIZE).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!(page, error = %e, "No more catalog data");
                    return (items, page - 1);
                }
            };

            let has_more = batch.meta.as_ref().is_some_and(|m| m.has_more(page));
            tracing::debug!(page, items = batch.items.len(), has_more, "Fetched catalog page");
            items.extend(batch.items);

            if !has_more {
                return (items, page);
            }
            if page >= self.max_pages {
                tracing::warn!(max_pages = self.max_pages, "Catalog page limit reached");
                return (items, page);
            }
            page += 1;
        }
    }

    /// Stage every item; returns how many were skipped.
    async fn stage_all(&self, generation: DbId, items: &[Value]) -> usize {
        let mut skipped = 0;
        for item in items {
            let splat = match NewSplat::from_payload(item) {
                Ok(splat) => splat,
                Err(e) => {
                    tracing::warn!(error = %e, payload = %item, "Skipping malformed splat");
                    skipped += 1;
                    continue;
                }
            };

            if let Err(e) = self.store.stage(generation, &splat).await {
                tracing::warn!(
                    splat_id = %splat.id,
                    error = %e,
                    payload = %item,
                    "Failed to store splat",
                );
                skipped += 1;
            }
        }
        skipped
    }

    fn set_state(&self, state: SyncState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

/// Leaves the state at [`SyncState::Failed`] unless the run reports its own
/// outcome.
struct StateGuard<'a> {
    state: &'a Mutex<SyncState>,
    finished: bool,
}

impl<'a> StateGuard<'a> {
    fn new(state: &'a Mutex<SyncState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(&mut self, outcome: SyncState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = outcome;
        self.finished = true;
    }
}

impl Drop for StateGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("Catalog sync interrupted");
            *self.state.lock().unwrap_or_else(|e| e.into_inner()) = SyncState::Failed;
        }
    }
}
