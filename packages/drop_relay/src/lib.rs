//! drop-relay: the hosted channel service behind lattedrops rooms.
//!
//! Each room is a single-slot value addressed as `rooms/<key>`. Clients
//! connect over WebSocket, receive the current value immediately, and get
//! every subsequent publish fanned out to them. Nothing is persisted; a
//! room's entire state is its latest image src.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::json;

pub mod config;
pub mod rooms;
pub mod ws;

use rooms::RoomStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub rooms: RoomStore,
    pub max_payload_bytes: usize,
}

impl AppState {
    pub fn new(max_payload_bytes: usize) -> Self {
        Self {
            rooms: RoomStore::new(),
            max_payload_bytes,
        }
    }
}

/// Build the relay router: the room WebSocket endpoint plus a liveness probe.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rooms/{key}", get(ws::room_ws_handler))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "rooms": state.rooms.len().await }))
}
