use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use wx_api::{build_app, set_ready, StaticTokenAuth};
use wx_db::DbClient;

async fn test_app() -> (tempfile::TempDir, axum::Router, Arc<wx_api::AppState>) {
    let dir = tempfile::tempdir().unwrap();
    let db = DbClient::open_file(dir.path().join("wx.db")).await.unwrap();
    db.init_schema().await.unwrap();
    let auth = Arc::new(StaticTokenAuth::new(["secret".to_string()]));
    let (app, state) = build_app(db, auth);
    (dir, app, state)
}

#[tokio::test]
async fn health_ready_metrics_endpoints() {
    let (_dir, app, state) = test_app().await;

    // /healthz is unauthenticated and bumps the request counter
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // /readyz reports 503 until startup flips the flag
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    set_ready(&state, true);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/readyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // /metrics exposes the prometheus text format with our counter in it
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ct = res.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/plain"));
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("wx_requests_total"));
}
