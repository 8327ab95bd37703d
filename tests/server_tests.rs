//! HTTP surface tests: parameter handling and response shapes.

#![cfg(feature = "server")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use fuzzystore::prelude::*;
use fuzzystore::server::{router, AppState};

fn app_state() -> Arc<AppState> {
    let engine = QueryEngine::new(Arc::new(StoreRegistry::new()), EngineConfig::default());
    Arc::new(AppState {
        engine,
        wordlist: None,
        default_store: "demostore".to_string(),
    })
}

#[tokio::test]
async fn add_accepts_query_parameters() {
    let state = app_state();
    let app = router(Arc::clone(&state));

    let request = Request::builder()
        .method("PUT")
        .uri("/add?store=demostore&key=cat&value=feline")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        state.engine.exact("demostore", "cat").unwrap(),
        Some("feline".to_string())
    );
}

#[tokio::test]
async fn add_accepts_form_body() {
    let state = app_state();
    let app = router(Arc::clone(&state));

    let request = Request::builder()
        .method("PUT")
        .uri("/add?store=demostore")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("key=cat&value=feline"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        state.engine.exact("demostore", "cat").unwrap(),
        Some("feline".to_string())
    );
}

#[tokio::test]
async fn add_form_body_overrides_query_parameters() {
    let state = app_state();
    let app = router(Arc::clone(&state));

    let request = Request::builder()
        .method("PUT")
        .uri("/add?store=demostore&key=cat&value=stale")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("value=fresh"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        state.engine.exact("demostore", "cat").unwrap(),
        Some("fresh".to_string())
    );
}

#[tokio::test]
async fn add_without_key_is_rejected() {
    let state = app_state();
    let app = router(state);

    let request = Request::builder()
        .method("PUT")
        .uri("/add?store=demostore&value=feline")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_returns_matching_keys_as_json() {
    let state = app_state();
    for key in ["hello", "help", "helm"] {
        state.engine.add("demostore", key, "v").unwrap();
    }
    let app = router(state);

    let request = Request::builder()
        .uri("/query?store=demostore&key=hell&distance=1&results=5")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let keys: Vec<String> = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(keys, vec!["hello", "helm", "help"]);
}

#[tokio::test]
async fn query_with_non_numeric_distance_is_rejected() {
    let app = router(app_state());

    let request = Request::builder()
        .uri("/query?store=demostore&key=hell&distance=two&results=5")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exact_miss_is_an_empty_body_not_an_error() {
    let app = router(app_state());

    let request = Request::builder()
        .uri("/exact?store=demostore&key=absent")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_endpoint_reports_numeric_fields() {
    let state = app_state();
    for i in 0..100 {
        state
            .engine
            .add("demostore", &format!("dictionary{i:03}"), "v")
            .unwrap();
    }
    let app = router(state);

    let request = Request::builder()
        .uri("/test?store=demostore&distance=1&results=5&keys=20&seed=42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let report: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report["distance"], 1);
    assert_eq!(report["keys"], 20);
    assert_eq!(report["results"], 5);
    assert!(report["accuracy"].is_number());
    assert!(report["time"].is_number());
}
