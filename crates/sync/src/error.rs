use greenview_core::error::ErrorKind;

/// Errors from a catalog synchronization run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The remote returned no items at all; the local catalog was left as is.
    #[error("No splats received from the GreenView API")]
    EmptyCatalog,

    /// The local store failed outside of per-item staging.
    #[error("Catalog store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::EmptyCatalog => ErrorKind::EmptyCatalog,
            SyncError::Store(_) => ErrorKind::PersistenceError,
        }
    }
}

/// Errors from resolving a splat binary through the file cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The asset has no `fileUrl` to download from.
    #[error("Splat {id} has no file URL")]
    NoSource { id: String },

    /// The download request failed or returned a non-success status.
    #[error("Download of {url} failed: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered with zero bytes.
    #[error("Download of {url} returned an empty body")]
    EmptyBody { url: String },

    /// Reading or writing the cache directory failed.
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CacheError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::NoSource { .. }
            | CacheError::Download { .. }
            | CacheError::EmptyBody { .. } => ErrorKind::DownloadError,
            CacheError::Io(_) => ErrorKind::PersistenceError,
        }
    }
}
