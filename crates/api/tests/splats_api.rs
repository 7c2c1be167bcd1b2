//! HTTP-level tests for `/api/v1/splats` and `/api/v1/cache`.

mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, build_test_app, delete, get, mount_catalog, post_json, splat,
    viewer_config, MEDIA_BASE_URL,
};
use serde_json::json;
use sqlx::PgPool;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn synced_app(pool: PgPool, server: &MockServer, media: &TempDir) -> axum::Router {
    let file_url = format!("{}/files/alpha.bin", server.uri());
    mount_catalog(
        server,
        &[vec![
            splat("a", "alpha", "Alpha", &file_url),
            splat("b", "beta", "Beta", ""),
        ]],
    )
    .await;
    let app = build_test_app(pool, viewer_config(server, media.path()));
    let response = post_json(app.clone(), "/api/v1/sync", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    app
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_returns_local_catalog(pool: PgPool) {
    let server = MockServer::start().await;
    let media = TempDir::new().unwrap();
    let app = synced_app(pool, &server, &media).await;

    let json = body_json(get(app, "/api/v1/splats?limit=1&offset=1").await).await;
    assert_eq!(json["data"]["total"], 2);
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Beta");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_pagination_is_400(pool: PgPool) {
    let server = MockServer::start().await;
    let media = TempDir::new().unwrap();
    let app = build_test_app(pool, viewer_config(&server, media.path()));

    let response = get(app.clone(), "/api/v1/splats?limit=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");

    let response = get(app, "/api/v1/logs?offset=-5").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn slug_lookup_is_served_locally(pool: PgPool) {
    let server = MockServer::start().await;
    let media = TempDir::new().unwrap();
    let app = synced_app(pool, &server, &media).await;

    let response = get(app, "/api/v1/splats/by-slug/alpha").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "a");
    assert_eq!(json["data"]["pluginConfig"]["autoRotate"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn id_lookup_falls_back_to_remote(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/integration/splats/remote-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {"id": "remote-7", "name": "Remote"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let media = TempDir::new().unwrap();
    let app = synced_app(pool, &server, &media).await;

    let json = body_json(get(app, "/api/v1/splats/remote-7").await).await;
    assert_eq!(json["data"]["name"], "Remote");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_splat_is_404(pool: PgPool) {
    let server = MockServer::start().await;
    let media = TempDir::new().unwrap();
    let app = synced_app(pool, &server, &media).await;

    let response = get(app, "/api/v1/splats/by-slug/nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cached_url_downloads_and_serves_binary(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/alpha.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"splat-bytes".as_slice()))
        .expect(1)
        .mount(&server)
        .await;
    let media = TempDir::new().unwrap();
    let app = synced_app(pool, &server, &media).await;

    let first = body_json(get(app.clone(), "/api/v1/splats/a/cached-url").await).await;
    assert_eq!(
        first["data"]["url"],
        format!("{MEDIA_BASE_URL}/greenview-splats/splat_a.ply")
    );
    assert_eq!(first["data"]["downloaded"], true);

    let second = body_json(get(app.clone(), "/api/v1/splats/a/cached-url").await).await;
    assert_eq!(second["data"]["downloaded"], false);

    let served = get(app, "/media/greenview-splats/splat_a.ply").await;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(body_bytes(served).await, b"splat-bytes");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cached_url_without_file_is_404(pool: PgPool) {
    let server = MockServer::start().await;
    let media = TempDir::new().unwrap();
    let app = synced_app(pool, &server, &media).await;

    let response = get(app, "/api/v1/splats/b/cached-url").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "DOWNLOAD_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cache_can_be_cleared(pool: PgPool) {
    let server = MockServer::start().await;
    let media = TempDir::new().unwrap();
    let app = synced_app(pool, &server, &media).await;

    let dir = media.path().join("greenview-splats");
    std::fs::create_dir_all(&dir).unwrap();
    for name in ["splat_a.ply", "splat_a.glb", "splat_b.splat"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }

    let one = body_json(delete(app.clone(), "/api/v1/cache/a").await).await;
    assert_eq!(one["data"]["removed"], 2);

    let all = body_json(delete(app, "/api/v1/cache").await).await;
    assert_eq!(all["data"]["removed"], 1);
    assert!(!dir.exists());
}
