use super::*;
use crate::queue::test_helpers::{
    StubOutcome, create_test_queue, create_test_queue_with, wait_for_completion,
};
use crate::types::TaskId;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;


/// Router over a fresh queue, using the queue's own config
fn router_for(queue: &MediaQueue) -> Router {
    create_router(queue.clone(), queue.get_config())
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_api_server_serves_until_shutdown() {
    let (queue, _fetcher, _temp_dir) = create_test_queue().await;

    let mut config = (*queue.get_config()).clone();
    // Port 0 = OS assigns a free port
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(serve_with_shutdown(
        queue,
        Arc::new(config),
        async move {
            rx.await.ok();
        },
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished(), "server exited early");

    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_authentication_required_when_key_configured() {
    let (queue, _fetcher, _temp_dir) = create_test_queue().await;

    let mut config = (*queue.get_config()).clone();
    config.server.api.api_key = Some("secret".to_string());
    let app = create_router(queue, Arc::new(config));

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        Request::builder()
            .uri("/health")
            .header("X-Api-Key", "secret")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_headers_present_when_enabled() {
    let (queue, _fetcher, _temp_dir) = create_test_queue().await;
    let app = router_for(&queue);

    let response = send(
        &app,
        Request::builder()
            .uri("/health")
            .header("Origin", "http://example.com")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[test]
fn test_cors_layer_specific_origins() {
    // Invalid origins are skipped rather than panicking
    let _layer = build_cors_layer(&[
        "http://localhost:3000".to_string(),
        "not a header\nvalue".to_string(),
    ]);
}
