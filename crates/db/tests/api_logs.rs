//! Integration tests for the diagnostic log and settings tables.

use greenview_core::diagnostics::{DiagnosticSink, NewApiLog, RequestOrigin};
use greenview_db::diagnostics::PgDiagnosticSink;
use greenview_db::repositories::{ApiLogRepo, SettingRepo};
use sqlx::PgPool;

fn entry(message: &str) -> NewApiLog {
    NewApiLog::new(
        "make_request",
        Some("https://api.example/integration/splats"),
        message,
        Some(500),
        Some("upstream exploded"),
        &RequestOrigin::new("10.0.0.7", "Mozilla/5.0"),
    )
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn entries_are_listed_newest_first(pool: PgPool) {
    ApiLogRepo::create(&pool, &entry("first")).await.unwrap();
    ApiLogRepo::create(&pool, &entry("second")).await.unwrap();

    let logs = ApiLogRepo::list(&pool, 10, 0).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].error_message, "second");
    assert_eq!(logs[0].response_code, Some(500));
    assert_eq!(logs[0].user_ip, "10.0.0.7");
    assert_eq!(logs[0].response_body_preview.as_deref(), Some("upstream exploded"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn clear_all_reports_deleted_rows(pool: PgPool) {
    for i in 0..3 {
        ApiLogRepo::create(&pool, &entry(&format!("failure {i}")))
            .await
            .unwrap();
    }

    assert_eq!(ApiLogRepo::clear_all(&pool).await.unwrap(), 3);
    assert_eq!(ApiLogRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sink_appends_entries(pool: PgPool) {
    let sink = PgDiagnosticSink::new(pool.clone());
    sink.record(entry("via sink")).await.unwrap();

    assert_eq!(ApiLogRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn last_sync_time_round_trips(pool: PgPool) {
    assert_eq!(SettingRepo::last_sync_time(&pool).await.unwrap(), None);

    SettingRepo::record_sync_time(&pool, 1_717_000_000).await.unwrap();
    SettingRepo::record_sync_time(&pool, 1_717_000_600).await.unwrap();

    assert_eq!(
        SettingRepo::last_sync_time(&pool).await.unwrap(),
        Some(1_717_000_600)
    );
}
