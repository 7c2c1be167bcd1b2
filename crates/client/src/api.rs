//! HTTP gateway for the GreenView integration endpoints.
//!
//! Every call goes through [`GreenViewApi::call`] (or its traced variant),
//! which checks the enabled flag and credential, attaches the
//! `x-company-token` header, and turns anything other than a 200 JSON
//! response into a [`GatewayError`]. Call-level failures are appended to the
//! diagnostic sink on the way out.

use std::sync::Arc;
use std::time::Duration;

use greenview_core::config::ViewerConfig;
use greenview_core::diagnostics::{truncate_preview, DiagnosticSink, NewApiLog, RequestOrigin};
use greenview_core::envelope::{self, SplatPage};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;

/// Timeout for integration API calls.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the company bearer token.
pub const TOKEN_HEADER: &str = "x-company-token";

/// Client identity sent with every call.
pub const USER_AGENT: &str = concat!("GreenView-Splat-Service/", env!("CARGO_PKG_VERSION"));

/// Operation name recorded in the diagnostic log.
const OPERATION: &str = "make_request";

/// Number of token characters shown in debug traces.
const TOKEN_HINT_CHARS: usize = 10;

/// Debug record of a single exchange, returned to the caller instead of
/// being stashed on the client.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CallTrace {
    pub url: Option<String>,
    pub status_code: Option<u16>,
    /// First characters of the token that was sent, followed by `...`.
    pub token_hint: Option<String>,
    pub user_agent: Option<&'static str>,
    pub response_preview: Option<String>,
    pub error: Option<String>,
}

/// Where a request goes, relative to the API base URL.
enum Endpoint<'a> {
    /// A pre-formatted path (and optional query) appended verbatim.
    Raw(&'a str),
    /// Path segments, each percent-encoded, plus query pairs.
    Segments {
        segments: &'a [&'a str],
        query: &'a [(&'a str, String)],
    },
}

/// HTTP client for the GreenView integration API.
///
/// Cheap to clone; derived clients from [`GreenViewApi::with_token_override`]
/// and [`GreenViewApi::with_origin`] share the connection pool.
#[derive(Clone)]
pub struct GreenViewApi {
    client: reqwest::Client,
    base_url: String,
    enabled: bool,
    token: String,
    token_override: Option<String>,
    origin: RequestOrigin,
    sink: Arc<dyn DiagnosticSink>,
}

impl GreenViewApi {
    /// Create a gateway from the service configuration.
    pub fn new(
        config: &ViewerConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, config, sink))
    }

    /// Create a gateway reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        config: &ViewerConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            enabled: config.enabled,
            token: config.company_token.clone(),
            token_override: None,
            origin: RequestOrigin::cli(),
            sink,
        }
    }

    /// A client that authenticates with `token` instead of the configured
    /// one, even when the integration is disabled. Used to validate a token
    /// before it is saved.
    pub fn with_token_override(&self, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token_override: Some(token).filter(|t| !t.trim().is_empty()),
            ..self.clone()
        }
    }

    /// A client that stamps `origin` onto diagnostic log entries.
    pub fn with_origin(&self, origin: RequestOrigin) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a token (configured or override) is available.
    pub fn has_token(&self) -> bool {
        self.token_override.is_some() || !self.token.is_empty()
    }

    // ---- generic call ----

    /// Perform a request against `{base}{endpoint}`.
    ///
    /// `params` are sent as a form body for `POST` and ignored otherwise.
    pub async fn call(
        &self,
        endpoint: &str,
        method: Method,
        params: &[(&str, &str)],
    ) -> Result<Value, GatewayError> {
        self.call_traced(endpoint, method, params).await.0
    }

    /// Same as [`GreenViewApi::call`], also returning the debug trace.
    pub async fn call_traced(
        &self,
        endpoint: &str,
        method: Method,
        params: &[(&str, &str)],
    ) -> (Result<Value, GatewayError>, CallTrace) {
        self.exchange(Endpoint::Raw(endpoint), method, params).await
    }

    // ---- derived operations ----

    /// Check the token against `GET /validate`.
    ///
    /// Succeeds only when the envelope reports `status == "success"`.
    pub async fn check_token(&self) -> Result<(), GatewayError> {
        self.check_token_detailed().await.0
    }

    /// [`GreenViewApi::check_token`] plus the debug trace of the exchange.
    pub async fn check_token_detailed(&self) -> (Result<(), GatewayError>, CallTrace) {
        let (result, mut trace) = self.get(&["validate"], &[]).await;
        let result = result.and_then(|body| {
            if envelope::is_success(&body) {
                Ok(())
            } else {
                Err(envelope_error(&trace, "status is not 'success'"))
            }
        });
        if let Err(e) = &result {
            trace.error.get_or_insert_with(|| e.to_string());
        }
        (result, trace)
    }

    /// `true` iff the API confirms the token. Never fails.
    pub async fn validate_token(&self) -> bool {
        self.check_token().await.is_ok()
    }

    /// `GET /company`, unwrapped from its `data` envelope.
    pub async fn get_company_info(&self) -> Result<Value, GatewayError> {
        let (result, trace) = self.get(&["company"], &[]).await;
        envelope::data(result?).ok_or_else(|| envelope_error(&trace, "missing 'data'"))
    }

    /// `GET /splats?page={page}&limit={limit}`.
    pub async fn get_splats(&self, page: u32, limit: u32) -> Result<SplatPage, GatewayError> {
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        let (result, trace) = self.get(&["splats"], &query).await;
        envelope::splat_page(result?)
            .ok_or_else(|| envelope_error(&trace, "missing 'data' array"))
    }

    /// `GET /splats/by-slug/{slug}`, unwrapped from its `data` envelope.
    pub async fn get_splat_by_slug(&self, slug: &str) -> Result<Value, GatewayError> {
        let (result, trace) = self.get(&["splats", "by-slug", slug], &[]).await;
        envelope::data(result?).ok_or_else(|| envelope_error(&trace, "missing 'data'"))
    }

    /// `GET /splats/{id}`, unwrapped from its `data` envelope.
    pub async fn get_splat_by_id(&self, id: &str) -> Result<Value, GatewayError> {
        let (result, trace) = self.get(&["splats", id], &[]).await;
        envelope::data(result?).ok_or_else(|| envelope_error(&trace, "missing 'data'"))
    }

    // ---- private helpers ----

    async fn get(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> (Result<Value, GatewayError>, CallTrace) {
        self.exchange(Endpoint::Segments { segments, query }, Method::GET, &[])
            .await
    }

    /// Run one request and record any call-level failure.
    async fn exchange(
        &self,
        endpoint: Endpoint<'_>,
        method: Method,
        params: &[(&str, &str)],
    ) -> (Result<Value, GatewayError>, CallTrace) {
        let mut trace = CallTrace::default();
        let result = self.try_exchange(endpoint, method, params, &mut trace).await;

        if let Err(e) = &result {
            trace.error = Some(e.to_string());
            if !matches!(e, GatewayError::Disabled) {
                self.record_failure(e).await;
            }
        }
        (result, trace)
    }

    async fn try_exchange(
        &self,
        endpoint: Endpoint<'_>,
        method: Method,
        params: &[(&str, &str)],
        trace: &mut CallTrace,
    ) -> Result<Value, GatewayError> {
        let token = self.credential()?;
        let url = self.resolve(endpoint)?;
        let url_str = url.to_string();

        trace.url = Some(url_str.clone());
        trace.token_hint = Some(token_hint(token));
        trace.user_agent = Some(USER_AGENT);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(TOKEN_HEADER, token);
        if method == Method::POST {
            request = request.form(params);
        }

        let response = request.send().await.map_err(|source| GatewayError::Transport {
            url: url_str.clone(),
            source,
        })?;

        let status = response.status().as_u16();
        trace.status_code = Some(status);

        let body = response.text().await.map_err(|source| GatewayError::Transport {
            url: url_str.clone(),
            source,
        })?;
        let body_preview = truncate_preview(&body);
        trace.response_preview = Some(body_preview.clone());

        if status != 200 {
            return Err(GatewayError::Status {
                url: url_str,
                status,
                body_preview,
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::MalformedBody {
            url: url_str,
            message: e.to_string(),
            body_preview,
        })
    }

    /// Pick the token to send, enforcing the enabled flag.
    fn credential(&self) -> Result<&str, GatewayError> {
        if let Some(token) = self.token_override.as_deref() {
            return Ok(token);
        }
        if !self.enabled {
            return Err(GatewayError::Disabled);
        }
        if self.token.is_empty() {
            return Err(GatewayError::MissingCredential);
        }
        Ok(&self.token)
    }

    fn resolve(&self, endpoint: Endpoint<'_>) -> Result<Url, GatewayError> {
        match endpoint {
            Endpoint::Raw(path) => {
                let raw = format!("{}{}", self.base_url, path);
                Url::parse(&raw).map_err(|e| GatewayError::InvalidUrl {
                    url: raw,
                    message: e.to_string(),
                })
            }
            Endpoint::Segments { segments, query } => {
                let mut url = Url::parse(&self.base_url).map_err(|e| GatewayError::InvalidUrl {
                    url: self.base_url.clone(),
                    message: e.to_string(),
                })?;
                url.path_segments_mut()
                    .map_err(|()| GatewayError::InvalidUrl {
                        url: self.base_url.clone(),
                        message: "base URL cannot carry a path".into(),
                    })?
                    .pop_if_empty()
                    .extend(segments);
                if !query.is_empty() {
                    let mut pairs = url.query_pairs_mut();
                    for (key, value) in query {
                        pairs.append_pair(key, value);
                    }
                }
                Ok(url)
            }
        }
    }

    async fn record_failure(&self, err: &GatewayError) {
        tracing::error!(
            operation = OPERATION,
            url = err.url().unwrap_or("-"),
            response_code = ?err.status_code(),
            error = %err,
            "GreenView API error",
        );

        let entry = NewApiLog::new(
            OPERATION,
            err.url(),
            err.to_string(),
            err.status_code(),
            err.body_preview(),
            &self.origin,
        );
        if let Err(e) = self.sink.record(entry).await {
            tracing::error!(error = %e, "Failed to save API log");
        }
    }
}

fn envelope_error(trace: &CallTrace, reason: &'static str) -> GatewayError {
    GatewayError::Envelope {
        url: trace.url.clone().unwrap_or_default(),
        reason,
    }
}

fn token_hint(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_HINT_CHARS).collect();
    format!("{prefix}...")
}
