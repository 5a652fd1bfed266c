// Integration tests for the WebSocket identity pre-check
//
// The pre-check is a tower middleware that runs BEFORE WebSocket upgrade
// extraction, so a taken or malformed `?identity=` gets a plain HTTP status.
//
// Note: tests use tower::ServiceExt::oneshot. When the pre-check passes, the
// request reaches the WebSocketUpgrade extractor, which returns 426 (no hyper
// OnUpgrade extension in test requests). The tests verify the pre-check
// decision, not the upgrade itself.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use pixelhub::{
    api::{create_ws_router, WsAppState},
    config::HubConfig,
    gateway::SessionGateway,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

fn make_router(gateway: Arc<SessionGateway>) -> Router {
    create_ws_router(Arc::new(WsAppState { gateway }))
}

fn upgrade_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("connection", "upgrade")
        .header("upgrade", "websocket")
        .header("sec-websocket-version", "13")
        .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==")
        .body(Body::empty())
        .unwrap()
}

fn gateway_with(identity: &str) -> Arc<SessionGateway> {
    let gateway = Arc::new(SessionGateway::new(HubConfig::default()));
    // Presence does not depend on the mailbox staying open
    let (tx, _rx) = mpsc::unbounded_channel();
    gateway
        .join(identity, Uuid::new_v4(), tx, Instant::now())
        .unwrap();
    gateway
}

// ── no identity: join happens over the socket ────────────────────────────────

#[tokio::test]
async fn test_no_identity_passes_precheck() {
    let app = make_router(Arc::new(SessionGateway::new(HubConfig::default())));
    let resp = app.oneshot(upgrade_request("/api/ws")).await.unwrap();
    assert_ne!(resp.status(), StatusCode::CONFLICT);
    assert_ne!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── free identity passes ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_free_identity_passes_precheck() {
    let app = make_router(gateway_with("alice"));
    let resp = app
        .oneshot(upgrade_request("/api/ws?identity=bob"))
        .await
        .unwrap();
    assert_ne!(resp.status(), StatusCode::CONFLICT);
    assert_ne!(resp.status(), StatusCode::BAD_REQUEST);
}

// ── taken identity → 409 ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_taken_identity_returns_409() {
    let app = make_router(gateway_with("alice"));
    let resp = app
        .oneshot(upgrade_request("/api/ws?identity=alice"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_taken_identity_with_padding_returns_409() {
    let app = make_router(gateway_with("alice"));
    let resp = app
        .oneshot(upgrade_request("/api/ws?identity=%20alice%20"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

// ── malformed identity → 400 ─────────────────────────────────────────────────

#[tokio::test]
async fn test_blank_identity_returns_400() {
    let app = make_router(Arc::new(SessionGateway::new(HubConfig::default())));
    let resp = app
        .oneshot(upgrade_request("/api/ws?identity=%20%20"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_overlong_identity_returns_400() {
    let app = make_router(Arc::new(SessionGateway::new(HubConfig::default())));
    let uri = format!("/api/ws?identity={}", "x".repeat(40));
    let resp = app.oneshot(upgrade_request(&uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
