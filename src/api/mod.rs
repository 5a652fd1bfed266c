// HTTP and WebSocket APIs

pub mod query;
pub mod websocket;

pub use query::{create_query_router, QueryAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use crate::gateway::SessionGateway;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Full application router: WebSocket gateway plus the read-only API
pub fn create_app(gateway: Arc<SessionGateway>) -> Router {
    let ws_state = Arc::new(WsAppState {
        gateway: Arc::clone(&gateway),
    });
    let query_state = Arc::new(QueryAppState { gateway });

    Router::new()
        .merge(create_ws_router(ws_state))
        .merge(create_query_router(query_state))
        .layer(CorsLayer::permissive())
}
