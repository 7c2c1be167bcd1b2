//! Catalog synchronization, splat lookup, and the local binary cache.
//!
//! The [`Synchronizer`] mirrors the remote catalog into the local store,
//! [`SplatLookup`] answers single-splat queries local-first, and
//! [`FileCache`] keeps downloaded splat binaries on disk.

pub mod error;
pub mod file_cache;
pub mod lookup;
pub mod source;
pub mod store;
pub mod synchronizer;

pub use error::{CacheError, SyncError};
pub use file_cache::{CacheSource, CachedFile, FileCache};
pub use lookup::SplatLookup;
pub use source::{CatalogSource, SplatSource};
pub use store::{CatalogStore, PgCatalogStore};
pub use synchronizer::{SyncReport, SyncState, Synchronizer};
