//! On-disk cache for splat binaries.
//!
//! Files live in `{media_dir}/greenview-splats/splat_{id}.{ext}` and are
//! served from `{media_base_url}/greenview-splats/`. A file is fresh while
//! its mtime is younger than the configured lifetime (`0` = never expires).
//!
//! Concurrent misses for the same file share one download: each cache file
//! name maps to an async mutex, and the freshness check is repeated once the
//! mutex is held. A table entry lives as long as some caller holds a
//! fill slot for it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use greenview_core::config::ViewerConfig;
use greenview_core::splat::DEFAULT_FILE_TYPE;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;

use crate::error::CacheError;

/// Timeout for downloading one binary.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Prefix of every cache file name.
const FILE_PREFIX: &str = "splat_";

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// The fields of a splat the cache needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheSource {
    pub id: String,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub file_name: Option<String>,
}

impl CacheSource {
    /// Extract from a raw remote payload. Numeric ids are accepted.
    pub fn from_payload(payload: &Value) -> Self {
        let text = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let id = match payload.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        Self {
            id,
            file_url: text("fileUrl"),
            file_type: text("fileType"),
            file_name: text("fileName"),
        }
    }
}

/// A cache file ready to be served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedFile {
    pub file_name: String,
    #[serde(skip)]
    pub path: PathBuf,
    pub url: String,
    /// `true` if this call downloaded the file.
    pub downloaded: bool,
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

pub struct FileCache {
    dir: PathBuf,
    base_url: String,
    lifetime_secs: u64,
    client: reqwest::Client,
    inflight: InflightTable,
}

type InflightTable = Mutex<HashMap<String, Inflight>>;

/// Per-file fill lock and the number of callers holding a slot on it.
struct Inflight {
    lock: Arc<tokio::sync::Mutex<()>>,
    holders: usize,
}

impl FileCache {
    /// Cache rooted at the configured media directory.
    pub fn new(config: &ViewerConfig) -> Result<Self, reqwest::Error> {
        Self::with_settings(
            config.cache_dir(),
            config.cache_base_url(),
            config.cache_lifetime_secs,
        )
    }

    /// Cache rooted at an explicit directory and public URL.
    pub fn with_settings(
        dir: impl Into<PathBuf>,
        base_url: impl Into<String>,
        lifetime_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;
        Ok(Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            lifetime_secs,
            client,
            inflight: Mutex::new(HashMap::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `splat_{id}.{ext}` for this asset.
    pub fn file_name(source: &CacheSource) -> String {
        format!(
            "{FILE_PREFIX}{}.{}",
            sanitize_id(&source.id),
            resolve_extension(source)
        )
    }

    /// Public URL of the cached binary, downloading it on a miss.
    ///
    /// `None` when the asset has no file URL or the download fails.
    pub async fn cached_url(&self, source: &CacheSource) -> Option<String> {
        match self.resolve(source).await {
            Ok(file) => Some(file.url),
            Err(e) => {
                tracing::warn!(splat_id = %source.id, error = %e, "Splat binary not cached");
                None
            }
        }
    }

    /// Return the cache file for `source`, downloading it if missing or
    /// stale.
    pub async fn resolve(&self, source: &CacheSource) -> Result<CachedFile, CacheError> {
        let remote = source
            .file_url
            .as_deref()
            .ok_or_else(|| CacheError::NoSource {
                id: source.id.clone(),
            })?;

        let file_name = Self::file_name(source);
        let path = self.dir.join(&file_name);

        if self.is_cached(&path).await {
            return Ok(self.cached_file(file_name, path, false));
        }

        let slot = FillSlot::acquire(&self.inflight, &file_name);
        let _fill = slot.lock.lock().await;

        if self.is_cached(&path).await {
            return Ok(self.cached_file(file_name, path, false));
        }
        self.download(remote, &file_name, &path).await?;
        Ok(self.cached_file(file_name, path, true))
    }

    /// Remove cached files.
    ///
    /// With an id, every `splat_{id}.*` variant is removed. Without one, the
    /// whole cache directory is removed. Returns how many files were deleted.
    pub async fn clear(&self, id: Option<&str>) -> Result<usize, CacheError> {
        let prefix = id.map(|id| format!("{FILE_PREFIX}{}.", sanitize_id(id)));

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            match &prefix {
                Some(prefix) if name.starts_with(prefix.as_str()) => {
                    tokio::fs::remove_file(entry.path()).await?;
                    removed += 1;
                }
                Some(_) => {}
                None => removed += 1,
            }
        }

        if prefix.is_none() {
            tokio::fs::remove_dir_all(&self.dir).await?;
        }

        tracing::info!(splat_id = id.unwrap_or("*"), removed, "Cleared splat cache");
        Ok(removed)
    }

    // ---- private helpers ----

    async fn is_cached(&self, path: &Path) -> bool {
        let Ok(meta) = tokio::fs::metadata(path).await else {
            return false;
        };
        if !meta.is_file() {
            return false;
        }
        let age = meta
            .modified()
            .ok()
            .map(|mtime| SystemTime::now().duration_since(mtime).unwrap_or_default());
        is_fresh(age, self.lifetime_secs)
    }

    async fn download(&self, url: &str, file_name: &str, path: &Path) -> Result<(), CacheError> {
        let download_err = |source| CacheError::Download {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(download_err)?;
        let bytes = response.bytes().await.map_err(download_err)?;

        if bytes.is_empty() {
            return Err(CacheError::EmptyBody {
                url: url.to_string(),
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let mut partial = PartialFile::new(self.dir.join(format!(".{file_name}.part")));
        tokio::fs::write(&partial.path, &bytes).await?;
        tokio::fs::rename(&partial.path, path).await?;
        partial.committed = true;

        tracing::info!(url, file_name, bytes = bytes.len(), "Cached splat binary");
        Ok(())
    }

    fn cached_file(&self, file_name: String, path: PathBuf, downloaded: bool) -> CachedFile {
        CachedFile {
            url: format!("{}/{}", self.base_url, file_name),
            file_name,
            path,
            downloaded,
        }
    }
}

// ---------------------------------------------------------------------------
// Fill guards
// ---------------------------------------------------------------------------

/// A caller's claim on the fill lock for one cache file.
///
/// Dropping the last slot for a file removes its table entry, including when
/// the owning future is cancelled.
struct FillSlot<'a> {
    table: &'a InflightTable,
    file_name: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl<'a> FillSlot<'a> {
    fn acquire(table: &'a InflightTable, file_name: &str) -> Self {
        let mut inflight = table.lock().unwrap_or_else(|e| e.into_inner());
        let entry = inflight
            .entry(file_name.to_string())
            .or_insert_with(|| Inflight {
                lock: Arc::new(tokio::sync::Mutex::new(())),
                holders: 0,
            });
        entry.holders += 1;
        Self {
            table,
            file_name: file_name.to_string(),
            lock: Arc::clone(&entry.lock),
        }
    }
}

impl Drop for FillSlot<'_> {
    fn drop(&mut self) {
        let mut inflight = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = inflight.get_mut(&self.file_name) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                inflight.remove(&self.file_name);
            }
        }
    }
}

/// Temporary download target, removed on drop unless committed.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

// ---------------------------------------------------------------------------
// Naming and freshness rules
// ---------------------------------------------------------------------------

/// Keep only `[A-Za-z0-9_-]`.
pub fn sanitize_id(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Extension for the cache file: explicit file type, then the extension of
/// `fileName`, then the extension of the URL path, then `"splat"`.
pub fn resolve_extension(source: &CacheSource) -> String {
    source
        .file_type
        .as_deref()
        .and_then(clean_extension)
        .or_else(|| {
            source
                .file_name
                .as_deref()
                .and_then(extension_of)
                .and_then(clean_extension)
        })
        .or_else(|| {
            source
                .file_url
                .as_deref()
                .and_then(|u| Url::parse(u).ok())
                .and_then(|u| extension_of(u.path()).map(str::to_string))
                .and_then(|ext| clean_extension(&ext))
        })
        .unwrap_or_else(|| DEFAULT_FILE_TYPE.to_string())
}

/// Fresh if the lifetime is `0` or the file is younger than the lifetime.
/// A file whose age cannot be determined is treated as stale.
pub fn is_fresh(age: Option<Duration>, lifetime_secs: u64) -> bool {
    if lifetime_secs == 0 {
        return true;
    }
    age.is_some_and(|age| age < Duration::from_secs(lifetime_secs))
}

fn extension_of(name: &str) -> Option<&str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.rsplit_once('.').map(|(_, ext)| ext)
}

fn clean_extension(raw: &str) -> Option<String> {
    let ext: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!ext.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn source(file_type: Option<&str>, file_name: Option<&str>, url: Option<&str>) -> CacheSource {
        CacheSource {
            id: "42".into(),
            file_url: url.map(Into::into),
            file_type: file_type.map(Into::into),
            file_name: file_name.map(Into::into),
        }
    }

    #[test]
    fn explicit_file_type_wins() {
        let s = source(Some("GLB"), Some("model.ksplat"), Some("https://cdn/x/model.ply"));
        assert_eq!(resolve_extension(&s), "glb");
    }

    #[test]
    fn file_name_beats_url() {
        let s = source(None, Some("garden.KSplat"), Some("https://cdn/x/model.ply"));
        assert_eq!(resolve_extension(&s), "ksplat");
    }

    #[test]
    fn url_path_extension_ignores_query() {
        let s = source(None, None, Some("https://cdn.example/a.b/model.ply?sig=abc.def"));
        assert_eq!(resolve_extension(&s), "ply");
    }

    #[test]
    fn falls_back_to_splat() {
        assert_eq!(resolve_extension(&source(None, None, Some("https://cdn/x/model"))), "splat");
        assert_eq!(resolve_extension(&source(Some("."), None, None)), "splat");
    }

    #[test]
    fn file_name_is_sanitized() {
        let mut s = source(Some("ply"), None, None);
        s.id = "../etc/pass wd".into();
        assert_eq!(FileCache::file_name(&s), "splat_etcpasswd.ply");
    }

    #[test]
    fn freshness_boundary() {
        assert!(is_fresh(Some(Duration::from_secs(3599)), 3600));
        assert!(!is_fresh(Some(Duration::from_secs(3600)), 3600));
        assert!(!is_fresh(Some(Duration::from_secs(3601)), 3600));
        assert!(is_fresh(Some(Duration::from_secs(10 * 365 * 86_400)), 0));
        assert!(!is_fresh(None, 3600));
    }

    #[test]
    fn source_from_payload_accepts_numeric_id() {
        let s = CacheSource::from_payload(&json!({
            "id": 7,
            "fileUrl": "https://cdn/x.ply",
            "fileType": "",
        }));
        assert_eq!(s.id, "7");
        assert_eq!(s.file_url.as_deref(), Some("https://cdn/x.ply"));
        assert_eq!(s.file_type, None);
    }

    fn inflight_len(cache: &FileCache) -> usize {
        cache.inflight.lock().unwrap().len()
    }

    #[tokio::test]
    async fn cancelled_fill_releases_its_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.ply"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"ply".to_vec())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let cache = FileCache::with_settings(dir.path(), "http://local/media", 3600).unwrap();
        let src = source(Some("ply"), None, Some(&format!("{}/slow.ply", server.uri())));

        let outcome = tokio::time::timeout(Duration::from_millis(50), cache.resolve(&src)).await;

        assert!(outcome.is_err());
        assert_eq!(inflight_len(&cache), 0);
    }

    #[tokio::test]
    async fn slots_are_released_after_concurrent_fills() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/model.ply"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"ply".to_vec())
                    .set_delay(Duration::from_millis(20)),
            )
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let cache = FileCache::with_settings(dir.path(), "http://local/media", 3600).unwrap();
        let src = source(Some("ply"), None, Some(&format!("{}/model.ply", server.uri())));

        let (a, b, c) = tokio::join!(cache.resolve(&src), cache.resolve(&src), cache.resolve(&src));

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(inflight_len(&cache), 0);
    }

    #[test]
    fn uncommitted_partial_file_is_removed() {
        let dir = TempDir::new().unwrap();
        let kept = dir.path().join(".kept.part");
        let dropped = dir.path().join(".dropped.part");
        std::fs::write(&kept, b"x").unwrap();
        std::fs::write(&dropped, b"x").unwrap();

        let mut partial = PartialFile::new(kept.clone());
        partial.committed = true;
        drop(partial);
        drop(PartialFile::new(dropped.clone()));

        assert!(kept.exists());
        assert!(!dropped.exists());
    }
}
