//! Handlers for the `/config` resource.
//!
//! Reports the integration settings fixed at startup and validates company
//! tokens against the integration API.

use axum::extract::State;
use axum::Json;
use greenview_client::CallTrace;
use greenview_core::error::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::CallerOrigin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    /// Candidate token to check instead of the configured one.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Validation {
    pub valid: bool,
    pub company_name: Option<String>,
    pub error: Option<String>,
    pub code: Option<ErrorKind>,
    /// Exchange details, present only when validation failed.
    pub debug: Option<CallTrace>,
}

#[derive(Debug, Serialize)]
pub struct ConfigStatus {
    pub enabled: bool,
    pub sandbox_mode: bool,
    pub api_base_url: String,
    pub token_configured: bool,
    pub cache_lifetime_secs: u64,
    pub cache_base_url: String,
    /// Company record, fetched only when the integration is usable.
    pub company: Option<Value>,
}

/// POST /api/v1/config/validate
///
/// Check the configured token, or the one in the body. Always answers 200;
/// the outcome is in `valid`, with the call trace attached on failure.
pub async fn validate(
    State(state): State<AppState>,
    CallerOrigin(origin): CallerOrigin,
    Json(body): Json<ValidateRequest>,
) -> Json<DataResponse<Validation>> {
    let mut api = state.api_for(origin);
    if let Some(token) = body.token {
        api = api.with_token_override(token);
    }

    let (result, trace) = api.check_token_detailed().await;
    let data = match result {
        Ok(()) => {
            let company_name = api
                .get_company_info()
                .await
                .ok()
                .and_then(|c| c.get("name").and_then(Value::as_str).map(str::to_string));
            Validation {
                valid: true,
                company_name,
                error: None,
                code: None,
                debug: None,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token validation failed");
            Validation {
                valid: false,
                company_name: None,
                error: Some(e.to_string()),
                code: Some(e.kind()),
                debug: Some(trace),
            }
        }
    };

    Json(DataResponse { data })
}

/// GET /api/v1/config/status
pub async fn status(
    State(state): State<AppState>,
    CallerOrigin(origin): CallerOrigin,
) -> Json<DataResponse<ConfigStatus>> {
    let viewer = &state.viewer;
    let company = if viewer.enabled && viewer.has_token() {
        state.api_for(origin).get_company_info().await.ok()
    } else {
        None
    };

    Json(DataResponse {
        data: ConfigStatus {
            enabled: viewer.enabled,
            sandbox_mode: viewer.sandbox_mode,
            api_base_url: viewer.api_base_url.clone(),
            token_configured: viewer.has_token(),
            cache_lifetime_secs: viewer.cache_lifetime_secs,
            cache_base_url: viewer.cache_base_url(),
            company,
        },
    })
}
