use crate::gateway::{ConnectionManager, SessionGateway};
use crate::presence::PresenceRegistry;
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        Query, Request, State,
    },
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Query parameters for WebSocket upgrade
#[derive(Deserialize)]
pub struct WsQuery {
    pub identity: Option<String>,
}

/// Shared application state for WebSocket handler
#[derive(Clone)]
pub struct WsAppState {
    pub gateway: Arc<SessionGateway>,
}

/// Identity pre-check: rejects a malformed or taken `?identity=` before the
/// upgrade, so the client gets a plain HTTP status instead of a socket that
/// immediately reports an error.
///
/// The join after upgrade is still authoritative; this check can race with a
/// concurrent join of the same name.
async fn ws_identity_check(
    State(state): State<Arc<WsAppState>>,
    Query(params): Query<WsQuery>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(ref requested) = params.identity {
        let max_len = state.gateway.config().chat.max_identity_len;
        match PresenceRegistry::validate_identity(requested, max_len) {
            Ok(identity) => {
                if state.gateway.is_present(&identity) {
                    return (StatusCode::CONFLICT, "Identity already in use").into_response();
                }
            }
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        }
    }
    next.run(req).await
}

/// GET /api/ws - WebSocket upgrade handler (identity checked by middleware)
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsAppState>>,
    Query(params): Query<WsQuery>,
) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(move |socket| handle_socket(socket, state, params.identity))
}

/// Create WebSocket router with the identity pre-check applied
pub fn create_ws_router(state: Arc<WsAppState>) -> Router {
    Router::new()
        .route("/api/ws", get(ws_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            ws_identity_check,
        ))
        .with_state(state)
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<WsAppState>, identity: Option<String>) {
    let manager = ConnectionManager::new(Arc::clone(&state.gateway));
    manager.handle(socket, identity).await;
}
