use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with key {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Malformed splat payload: {0}")]
    MalformedSplat(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse failure classes surfaced to operators and recorded in logs.
///
/// Each crate keeps its own detailed error enum; this is the shared
/// vocabulary they all map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The integration is switched off and no override token was given.
    Disabled,
    /// No company token configured. Terminal, never retried.
    MissingCredential,
    /// Non-200 response, transport failure, or malformed envelope.
    RemoteError,
    /// A sync run found nothing on its first page.
    EmptyCatalog,
    /// A single catalog item could not be persisted.
    PersistenceError,
    /// A cache fill could not download the remote binary.
    DownloadError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Disabled => "DISABLED",
            ErrorKind::MissingCredential => "MISSING_CREDENTIAL",
            ErrorKind::RemoteError => "REMOTE_ERROR",
            ErrorKind::EmptyCatalog => "EMPTY_CATALOG",
            ErrorKind::PersistenceError => "PERSISTENCE_ERROR",
            ErrorKind::DownloadError => "DOWNLOAD_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
