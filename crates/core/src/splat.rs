//! Splat payload normalization.
//!
//! Turns one item of the remote catalog into the column set the local store
//! persists. The raw item is kept verbatim next to the normalized fields.

use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// File type assumed when the remote omits `fileType`.
pub const DEFAULT_FILE_TYPE: &str = "splat";

/// Page size requested from the remote catalog.
pub const SYNC_PAGE_SIZE: u32 = 50;

/// A normalized catalog item ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSplat {
    pub id: String,
    pub slug: Option<String>,
    pub name: String,
    pub description: String,
    pub file_type: String,
    pub file_url: String,
    pub file_ar_url: String,
    pub thumbnail_url: String,
    pub ar_short_link: String,
    pub viewer_short_link: String,
    pub ar_enabled: bool,
    pub plugin_config: Option<Value>,
    pub remote_created_at: Option<String>,
    pub remote_updated_at: Option<String>,
    pub raw_payload: Value,
}

impl NewSplat {
    /// Normalize one remote item.
    ///
    /// Fails with [`CoreError::MalformedSplat`] when the item is not an
    /// object, has no usable `id`, or has no string `name`.
    pub fn from_payload(payload: &Value) -> Result<Self, CoreError> {
        let obj = payload
            .as_object()
            .ok_or_else(|| CoreError::MalformedSplat("item is not a JSON object".into()))?;

        let id = obj
            .get("id")
            .and_then(identifier)
            .ok_or_else(|| CoreError::MalformedSplat("missing or invalid 'id'".into()))?;

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::MalformedSplat(format!("splat {id} has no 'name'")))?
            .to_string();

        let text = |key: &str| -> String {
            obj.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let optional_text = |key: &str| -> Option<String> {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            id,
            slug: optional_text("slug"),
            name,
            description: text("description"),
            file_type: optional_text("fileType").unwrap_or_else(|| DEFAULT_FILE_TYPE.to_string()),
            file_url: text("fileUrl"),
            file_ar_url: text("fileARUrl"),
            thumbnail_url: text("thumbnailUrl"),
            ar_short_link: text("arShortLink"),
            viewer_short_link: text("viewerShortLink"),
            ar_enabled: obj.get("arEnabled").map(truthy).unwrap_or(true),
            plugin_config: obj.get("pluginConfig").filter(|v| !v.is_null()).cloned(),
            remote_created_at: optional_text("createdAt"),
            remote_updated_at: optional_text("updatedAt"),
            raw_payload: payload.clone(),
        })
    }
}

/// Read an opaque identifier that may arrive as a string or a number.
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}
