use crate::bus::Message;
use crate::canvas::{PaletteColor, PALETTE};
use crate::gateway::{CanvasView, HubStats, SessionGateway};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for the read-only API
pub struct QueryAppState {
    pub gateway: Arc<SessionGateway>,
}

/// Query parameters for a single pixel lookup
#[derive(Deserialize)]
pub struct PixelQueryParams {
    pub x: i64,
    pub y: i64,
}

/// Single pixel with audit fields
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelResponse {
    pub x: i64,
    pub y: i64,
    pub color: String,
    pub last_writer: String,
    pub placed_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub online_users: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create read-only API router
pub fn create_query_router(state: Arc<QueryAppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/canvas", get(get_canvas))
        .route("/api/canvas/pixel", get(get_pixel))
        .route("/api/presence", get(get_presence))
        .route("/api/palette", get(get_palette))
        .route("/api/messages", get(get_messages))
        .route("/api/stats", get(get_stats))
        .with_state(state)
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /api/canvas - All painted pixels
async fn get_canvas(State(state): State<Arc<QueryAppState>>) -> Json<CanvasView> {
    Json(state.gateway.canvas())
}

/// GET /api/canvas/pixel?x=..&y=.. - One pixel and who placed it
async fn get_pixel(
    State(state): State<Arc<QueryAppState>>,
    Query(params): Query<PixelQueryParams>,
) -> Result<Json<PixelResponse>, QueryError> {
    let (pixel, last_writer, placed_at) = state
        .gateway
        .pixel(params.x, params.y)
        .ok_or(QueryError::NotFound)?;

    Ok(Json(PixelResponse {
        x: pixel.x,
        y: pixel.y,
        color: pixel.color.to_string(),
        last_writer,
        placed_at: placed_at.to_rfc3339(),
    }))
}

/// GET /api/presence - Online users in join order
async fn get_presence(State(state): State<Arc<QueryAppState>>) -> Json<PresenceResponse> {
    Json(PresenceResponse {
        online_users: state.gateway.online_users(),
    })
}

/// GET /api/palette
async fn get_palette() -> Json<Vec<PaletteColor>> {
    Json(PALETTE.to_vec())
}

/// GET /api/messages - Recent public chat
async fn get_messages(State(state): State<Arc<QueryAppState>>) -> Json<Vec<Message>> {
    Json(state.gateway.recent_messages())
}

/// GET /api/stats
async fn get_stats(State(state): State<Arc<QueryAppState>>) -> Json<HubStats> {
    Json(state.gateway.stats())
}

/// Query error types
#[derive(Debug)]
enum QueryError {
    NotFound,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            QueryError::NotFound => (StatusCode::NOT_FOUND, "Pixel not painted"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use std::time::Instant;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn create_test_state() -> Arc<QueryAppState> {
        Arc::new(QueryAppState {
            gateway: Arc::new(SessionGateway::new(HubConfig::default())),
        })
    }

    fn join(state: &QueryAppState, identity: &str) -> mpsc::UnboundedReceiver<crate::gateway::ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        state
            .gateway
            .join(identity, Uuid::new_v4(), tx, Instant::now())
            .unwrap();
        rx
    }

    #[tokio::test]
    async fn test_get_canvas() {
        let state = create_test_state();
        let _rx = join(&state, "alice");
        state
            .gateway
            .draw("alice", 3, 4, "#FF0000", Instant::now())
            .unwrap();

        let canvas = get_canvas(State(state)).await;
        assert_eq!(canvas.0.width, 800);
        assert_eq!(canvas.0.pixels.len(), 1);
    }

    #[tokio::test]
    async fn test_get_pixel_found() {
        let state = create_test_state();
        let _rx = join(&state, "alice");
        state
            .gateway
            .draw("alice", 3, 4, "#00ff00", Instant::now())
            .unwrap();

        let params = PixelQueryParams { x: 3, y: 4 };
        let result = get_pixel(State(state), Query(params)).await.unwrap();
        assert_eq!(result.0.color, "#00FF00");
        assert_eq!(result.0.last_writer, "alice");
    }

    #[tokio::test]
    async fn test_get_pixel_not_found() {
        let state = create_test_state();
        let params = PixelQueryParams { x: 1, y: 1 };
        let result = get_pixel(State(state), Query(params)).await;
        assert!(matches!(result, Err(QueryError::NotFound)));
    }

    #[tokio::test]
    async fn test_get_presence_in_join_order() {
        let state = create_test_state();
        let _b = join(&state, "bob");
        let _a = join(&state, "alice");

        let presence = get_presence(State(state)).await;
        assert_eq!(presence.0.online_users, vec!["bob", "alice"]);
    }

    #[tokio::test]
    async fn test_get_palette() {
        let palette = get_palette().await;
        assert_eq!(palette.0.len(), 24);
        assert_eq!(palette.0[0].hex, "#FF0000");
    }

    #[tokio::test]
    async fn test_get_messages_public_only() {
        let state = create_test_state();
        let _rx = join(&state, "alice");
        state.gateway.chat("alice", "hello", None).unwrap();
        state.gateway.chat("alice", "secret", Some("bob")).unwrap();

        let messages = get_messages(State(state)).await;
        assert_eq!(messages.0.len(), 1);
        assert_eq!(messages.0[0].content, "hello");
    }
}
