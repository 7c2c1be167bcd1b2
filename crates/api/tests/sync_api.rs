//! HTTP-level tests for `/api/v1/sync`.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, mount_catalog, post_json, splat, viewer_config};
use greenview_db::repositories::{ApiLogRepo, SplatRepo};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[sqlx::test(migrations = "../../db/migrations")]
async fn sync_mirrors_catalog_and_records_time(pool: PgPool) {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        &[
            vec![
                splat("a", "alpha", "Alpha", "https://cdn.example/a.ply"),
                splat("b", "beta", "Beta", "https://cdn.example/b.ply"),
            ],
            vec![splat("c", "gamma", "Gamma", "https://cdn.example/c.ply")],
        ],
    )
    .await;
    let media = TempDir::new().unwrap();
    let app = build_test_app(pool.clone(), viewer_config(&server, media.path()));

    let before = body_json(get(app.clone(), "/api/v1/sync/last").await).await;
    assert_eq!(before["data"]["timestamp"], serde_json::Value::Null);

    let response = post_json(app.clone(), "/api/v1/sync", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 3);
    assert_eq!(json["data"]["pages"], 2);

    assert_eq!(SplatRepo::count(&pool).await.unwrap(), 3);

    let last = body_json(get(app.clone(), "/api/v1/sync/last").await).await;
    assert_eq!(last["data"]["timestamp"], json["data"]["synced_at"]);

    let status = body_json(get(app, "/api/v1/sync/status").await).await;
    assert_eq!(status["data"]["state"], "idle");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_remote_is_readable_error(pool: PgPool) {
    let server = MockServer::start().await;
    mount_catalog(&server, &[vec![]]).await;
    let media = TempDir::new().unwrap();
    let app = build_test_app(pool, viewer_config(&server, media.path()));

    let response = post_json(app.clone(), "/api/v1/sync", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(response).await;
    assert_eq!(json["code"], "EMPTY_CATALOG");
    assert_eq!(json["error"], "No splats received from the GreenView API");

    let status = body_json(get(app, "/api/v1/sync/status").await).await;
    assert_eq!(status["data"]["state"], "failed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_logs_and_keeps_catalog(pool: PgPool) {
    let server = MockServer::start().await;
    let media = TempDir::new().unwrap();
    let mut viewer = viewer_config(&server, media.path());
    viewer.company_token.clear();
    let app = build_test_app(pool.clone(), viewer);

    let response = post_json(app, "/api/v1/sync", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    assert!(server.received_requests().await.unwrap().is_empty());
    let logs = ApiLogRepo::list(&pool, 10, 0).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].error_message, "No API token configured");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn abandoned_request_does_not_cancel_sync(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/integration/splats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "data": [splat("a", "alpha", "Alpha", "https://cdn.example/a.ply")],
                    "meta": {"currentPage": 1, "lastPage": 1}
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    let media = TempDir::new().unwrap();
    let app = build_test_app(pool.clone(), viewer_config(&server, media.path()));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        post_json(app.clone(), "/api/v1/sync", json!({})),
    )
    .await;
    assert!(abandoned.is_err());

    let mut state = serde_json::Value::Null;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let status = body_json(get(app.clone(), "/api/v1/sync/status").await).await;
        state = status["data"]["state"].clone();
        if state == "idle" {
            break;
        }
    }

    assert_eq!(state, "idle");
    assert_eq!(SplatRepo::count(&pool).await.unwrap(), 1);
}
