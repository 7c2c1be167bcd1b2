//! Integration configuration (enabled flag, token, sandbox, cache).
//!
//! Loaded once at startup and threaded through constructors. No component
//! reads the environment on its own after that.

use std::path::PathBuf;

/// Production integration endpoint.
pub const PRODUCTION_API_URL: &str = "https://api.green-view.nl/integration";

/// Sandbox (staging) integration endpoint.
pub const SANDBOX_API_URL: &str = "https://api-stg.green-view.nl/integration";

/// Default cache lifetime: 24 hours.
pub const DEFAULT_CACHE_LIFETIME_SECS: u64 = 86_400;

/// Sub-directory of the media root holding cached splat binaries.
pub const CACHE_DIR_NAME: &str = "greenview-splats";

/// Immutable settings for the gateway, synchronizer, and file cache.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Master switch for outbound API calls.
    pub enabled: bool,
    /// Bearer secret sent as `x-company-token`. Empty means not configured.
    pub company_token: String,
    /// Use the staging API host instead of production.
    pub sandbox_mode: bool,
    /// Base URL of the integration API. Derived from `sandbox_mode` unless
    /// explicitly overridden.
    pub api_base_url: String,
    /// Cache TTL in seconds. `0` means cached files never expire.
    pub cache_lifetime_secs: u64,
    /// Local media root; cached files live in `{media_dir}/greenview-splats`.
    pub media_dir: PathBuf,
    /// Public URL prefix under which `media_dir` is served.
    pub media_base_url: String,
}

impl ViewerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                        |
    /// |----------------------------|--------------------------------|
    /// | `GREENVIEW_ENABLED`        | `false`                        |
    /// | `GREENVIEW_COMPANY_TOKEN`  | empty                          |
    /// | `GREENVIEW_SANDBOX_MODE`   | `false`                        |
    /// | `GREENVIEW_API_BASE_URL`   | production or sandbox URL      |
    /// | `GREENVIEW_CACHE_LIFETIME` | `86400`                        |
    /// | `MEDIA_DIR`                | `./media`                      |
    /// | `MEDIA_BASE_URL`           | `http://localhost:3000/media`  |
    pub fn from_env() -> Self {
        let enabled = env_flag("GREENVIEW_ENABLED");
        let company_token = std::env::var("GREENVIEW_COMPANY_TOKEN")
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        let sandbox_mode = env_flag("GREENVIEW_SANDBOX_MODE");

        let api_base_url = std::env::var("GREENVIEW_API_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| default_api_url(sandbox_mode).to_string());

        let cache_lifetime_secs: u64 = std::env::var("GREENVIEW_CACHE_LIFETIME")
            .unwrap_or_else(|_| DEFAULT_CACHE_LIFETIME_SECS.to_string())
            .parse()
            .expect("GREENVIEW_CACHE_LIFETIME must be a valid u64");

        let media_dir = std::env::var("MEDIA_DIR")
            .unwrap_or_else(|_| "./media".into())
            .into();
        let media_base_url =
            std::env::var("MEDIA_BASE_URL").unwrap_or_else(|_| "http://localhost:3000/media".into());

        Self {
            enabled,
            company_token,
            sandbox_mode,
            api_base_url: trim_trailing_slash(&api_base_url),
            cache_lifetime_secs,
            media_dir,
            media_base_url: trim_trailing_slash(&media_base_url),
        }
    }

    /// Whether a company token is configured.
    pub fn has_token(&self) -> bool {
        !self.company_token.is_empty()
    }

    /// Absolute location of the splat cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.media_dir.join(CACHE_DIR_NAME)
    }

    /// Public URL prefix of the splat cache directory.
    pub fn cache_base_url(&self) -> String {
        format!("{}/{CACHE_DIR_NAME}", self.media_base_url)
    }
}

/// Pick the API host for the given sandbox setting.
pub fn default_api_url(sandbox_mode: bool) -> &'static str {
    if sandbox_mode {
        SANDBOX_API_URL
    } else {
        PRODUCTION_API_URL
    }
}

/// Interpret a config flag the way the admin settings store them.
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn trim_trailing_slash(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ViewerConfig {
        ViewerConfig {
            enabled: true,
            company_token: "tok".into(),
            sandbox_mode: false,
            api_base_url: PRODUCTION_API_URL.into(),
            cache_lifetime_secs: DEFAULT_CACHE_LIFETIME_SECS,
            media_dir: PathBuf::from("/srv/media"),
            media_base_url: "https://shop.example/media".into(),
        }
    }

    #[test]
    fn sandbox_flag_selects_staging_host() {
        assert_eq!(default_api_url(true), SANDBOX_API_URL);
        assert_eq!(default_api_url(false), PRODUCTION_API_URL);
    }

    #[test]
    fn flags_accept_common_truthy_spellings() {
        for raw in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(parse_flag(raw), "{raw} should be truthy");
        }
        for raw in ["0", "false", "", "off", "nope"] {
            assert!(!parse_flag(raw), "{raw} should be falsy");
        }
    }

    #[test]
    fn cache_locations_derive_from_media_root() {
        let config = sample();
        assert_eq!(config.cache_dir(), PathBuf::from("/srv/media/greenview-splats"));
        assert_eq!(
            config.cache_base_url(),
            "https://shop.example/media/greenview-splats"
        );
    }

    #[test]
    fn empty_token_is_not_configured() {
        let mut config = sample();
        assert!(config.has_token());
        config.company_token.clear();
        assert!(!config.has_token());
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        assert_eq!(trim_trailing_slash("https://a.b/media/ "), "https://a.b/media");
    }
}
