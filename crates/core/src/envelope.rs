//! Helpers for the integration API's response envelopes.
//!
//! Responses come as `{ "status": ..., "data": ... }` or
//! `{ "data": [...], "meta": { "currentPage", "lastPage", ... } }`.

use serde::Deserialize;
use serde_json::Value;

/// Status string the API uses for a successful call.
pub const STATUS_SUCCESS: &str = "success";

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub current_page: Option<u32>,
    pub last_page: u32,
}

impl PageMeta {
    /// Whether pages after `requested_page` exist.
    ///
    /// Trusts the reported `currentPage` and falls back to the page number
    /// that was requested.
    pub fn has_more(&self, requested_page: u32) -> bool {
        self.current_page.unwrap_or(requested_page) < self.last_page
    }
}

/// One page of the remote catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SplatPage {
    pub items: Vec<Value>,
    pub meta: Option<PageMeta>,
}

/// `true` iff the envelope reports `status == "success"`.
pub fn is_success(envelope: &Value) -> bool {
    envelope.get("status").and_then(Value::as_str) == Some(STATUS_SUCCESS)
}

/// Extract a non-null `data` member.
pub fn data(envelope: Value) -> Option<Value> {
    match envelope {
        Value::Object(mut map) => map.remove("data").filter(|d| !d.is_null()),
        _ => None,
    }
}

/// Parse a list response. `None` when there is no `data` array.
///
/// A malformed `meta` block is treated as absent (no further pages).
pub fn splat_page(envelope: Value) -> Option<SplatPage> {
    let Value::Object(mut map) = envelope else {
        return None;
    };
    let items = match map.remove("data") {
        Some(Value::Array(items)) => items,
        _ => return None,
    };
    let meta = map
        .remove("meta")
        .and_then(|m| serde_json::from_value::<PageMeta>(m).ok());
    Some(SplatPage { items, meta })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_status_detected() {
        assert!(is_success(&json!({"status": "success"})));
        assert!(!is_success(&json!({"status": "error"})));
        assert!(!is_success(&json!({"data": {}})));
        assert!(!is_success(&json!([1, 2])));
    }

    #[test]
    fn data_unwraps_object_member() {
        assert_eq!(data(json!({"data": {"name": "Acme"}})), Some(json!({"name": "Acme"})));
        assert_eq!(data(json!({"data": null})), None);
        assert_eq!(data(json!({"status": "success"})), None);
        assert_eq!(data(json!("data")), None);
    }

    #[test]
    fn page_parses_items_and_meta() {
        let page = splat_page(json!({
            "data": [{"id": "a"}, {"id": "b"}],
            "meta": {"currentPage": 1, "lastPage": 2, "total": 3}
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        let meta = page.meta.unwrap();
        assert_eq!(meta.last_page, 2);
        assert!(meta.has_more(1));
    }

    #[test]
    fn page_without_data_array_is_none() {
        assert!(splat_page(json!({"data": {"id": "a"}})).is_none());
        assert!(splat_page(json!({"meta": {"lastPage": 1}})).is_none());
    }

    #[test]
    fn missing_current_page_falls_back_to_requested() {
        let meta = PageMeta {
            current_page: None,
            last_page: 3,
        };
        assert!(meta.has_more(2));
        assert!(!meta.has_more(3));
    }

    #[test]
    fn malformed_meta_is_ignored() {
        let page = splat_page(json!({"data": [], "meta": {"lastPage": "two"}})).unwrap();
        assert!(page.meta.is_none());
    }
}
