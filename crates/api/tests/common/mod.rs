#![allow(dead_code)]

use std::path::Path;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use greenview_api::config::ServerConfig;
use greenview_api::router::build_app_router;
use greenview_api::state::AppState;
use greenview_core::config::ViewerConfig;

pub const TOKEN: &str = "test-company-token";
pub const MEDIA_BASE_URL: &str = "http://localhost:3000/media";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Integration settings pointing at a mock API and a temporary media dir.
pub fn viewer_config(server: &MockServer, media_dir: &Path) -> ViewerConfig {
    ViewerConfig {
        enabled: true,
        company_token: TOKEN.to_string(),
        sandbox_mode: false,
        api_base_url: format!("{}/integration", server.uri()),
        cache_lifetime_secs: 3600,
        media_dir: media_dir.to_path_buf(),
        media_base_url: MEDIA_BASE_URL.to_string(),
    }
}

/// Build the full application router, with the same middleware stack as
/// the binary.
pub fn build_test_app(pool: PgPool, viewer: ViewerConfig) -> Router {
    let state = AppState::new(pool, test_config(), viewer).unwrap();
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Mock integration API
// ---------------------------------------------------------------------------

/// Serve `pages` from `GET /integration/splats?page=N`.
pub async fn mount_catalog(server: &MockServer, pages: &[Vec<Value>]) {
    let last_page = pages.len().max(1);
    for (i, items) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/integration/splats"))
            .and(query_param("page", (i + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": items,
                "meta": {"currentPage": i + 1, "lastPage": last_page}
            })))
            .mount(server)
            .await;
    }
}

/// Answer `GET /integration/validate` with the given envelope status.
pub async fn mount_validate(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/integration/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": status})))
        .mount(server)
        .await;
}

pub async fn mount_company(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path("/integration/company"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": {"name": name}})),
        )
        .mount(server)
        .await;
}

pub fn splat(id: &str, slug: &str, name: &str, file_url: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "name": name,
        "fileUrl": file_url,
        "fileType": "ply",
        "pluginConfig": {"autoRotate": false},
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
