// Integration tests: HTTP endpoints

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::Utc;
use common::{TEST_CONFIG, report};
use insights::config::AppConfig;
use insights::report_repo::ReportRepo;
use insights::routes;
use std::sync::Arc;
use tempfile::TempDir;

fn real_ip() -> HeaderName {
    HeaderName::from_static("x-real-ip")
}

struct TestApp {
    server: TestServer,
    repo: Arc<ReportRepo>,
    dir: TempDir,
}

async fn test_app_with(edit: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    config.database.path = dir.path().join("insights.db").to_string_lossy().into_owned();
    config.charts.output_dir = dir.path().join("web").to_string_lossy().into_owned();
    edit(&mut config);

    let repo = Arc::new(
        ReportRepo::connect(&config.database.path, config.database.max_pool_size)
            .await
            .unwrap(),
    );
    repo.init().await.unwrap();
    let server = TestServer::new(routes::app(repo.clone(), config).unwrap());
    TestApp { server, repo, dir }
}

async fn test_app() -> TestApp {
    test_app_with(|_| {}).await
}

fn write_charts(dir: &TempDir) {
    let web = dir.path().join("web");
    std::fs::create_dir_all(&web).unwrap();
    std::fs::write(web.join("charts.json"), br#"{"totalInstances":1,"charts":[]}"#).unwrap();
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = test_app().await;
    let response = app.server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("insights"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_collect_stores_report() {
    let app = test_app().await;
    let response = app
        .server
        .post("/collect")
        .add_header(real_ip(), HeaderValue::from_static("10.0.0.1"))
        .json(&report("abc", "0.54.2"))
        .await;
    response.assert_status_ok();
    assert_eq!(app.repo.count_day(Utc::now().date_naive()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_collect_rate_limited_per_ip() {
    let app = test_app().await;
    let send = |ip: &'static str| {
        app.server
            .post("/collect")
            .add_header(real_ip(), HeaderValue::from_static(ip))
            .json(&report("abc", "0.54.2"))
    };
    send("10.0.0.1").await.assert_status_ok();
    send("10.0.0.1")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
    send("10.0.0.2").await.assert_status_ok();
}

#[tokio::test]
async fn test_collect_uses_first_forwarded_for_entry() {
    let app = test_app().await;
    let forwarded = HeaderName::from_static("x-forwarded-for");
    app.server
        .post("/collect")
        .add_header(forwarded.clone(), HeaderValue::from_static("10.1.1.1, 172.16.0.1"))
        .json(&report("a", "1"))
        .await
        .assert_status_ok();
    app.server
        .post("/collect")
        .add_header(forwarded, HeaderValue::from_static("10.1.1.1"))
        .json(&report("b", "1"))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_collect_rejects_malformed_json() {
    let app = test_app().await;
    let response = app
        .server
        .post("/collect")
        .add_header(real_ip(), HeaderValue::from_static("10.0.0.3"))
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_charts_not_found_before_export() {
    let app = test_app().await;
    app.server
        .get("/api/charts")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_charts_served_without_key() {
    let app = test_app().await;
    write_charts(&app.dir);
    let response = app.server.get("/api/charts").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json["totalInstances"], 1);
}

#[tokio::test]
async fn test_charts_require_api_key_when_configured() {
    let app = test_app_with(|c| c.server.api_key = Some("secret".into())).await;
    write_charts(&app.dir);

    app.server
        .get("/api/charts")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .get("/api/charts")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer wrong"),
        )
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .get("/api/charts")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer secret"),
        )
        .await
        .assert_status_ok();
    app.server
        .get("/api/charts")
        .add_query_param("api_key", "secret")
        .await
        .assert_status_ok();
}
