//! Room WebSocket Handler
//!
//! One socket per (connection, room). The relay reports the room's current
//! value once immediately after connect (even when the room is empty) and
//! then forwards every publish. Filtering the empty initial value is the
//! client's job; the relay just states the truth of the slot.

use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{Sink, sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use drop_wire::{ClientFrame, ServerFrame, is_valid_room_key};

use crate::AppState;

pub async fn room_ws_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    if !is_valid_room_key(&key) {
        return (StatusCode::BAD_REQUEST, "invalid room key").into_response();
    }

    ws.on_upgrade(move |socket| handle_room_socket(socket, state, key))
}

async fn handle_room_socket(socket: WebSocket, state: AppState, key: String) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, room = %key, "room connection opened");

    let join = state.rooms.join(&key).await;
    let mut updates = join.updates;
    let (mut sender, mut receiver) = socket.split();

    // Initial read: current value as of join, empty or not.
    if send_frame(&mut sender, &ServerFrame::Value { src: join.current })
        .await
        .is_err()
    {
        info!(conn_id = %conn_id, room = %key, "connection closed before initial value");
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(src) => {
                    if send_frame(&mut sender, &ServerFrame::Value { src: Some(src) })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Only the latest value matters; the next recv returns it.
                    warn!(conn_id = %conn_id, room = %key, "subscriber lagged by {} updates", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientFrame>(text.as_str()) {
                        Ok(ClientFrame::Publish { src }) => {
                            if src.len() > state.max_payload_bytes {
                                warn!(
                                    conn_id = %conn_id,
                                    room = %key,
                                    size = src.len(),
                                    "rejecting oversize publish"
                                );
                                let frame = ServerFrame::Error {
                                    message: format!(
                                        "payload exceeds {} bytes",
                                        state.max_payload_bytes
                                    ),
                                };
                                if send_frame(&mut sender, &frame).await.is_err() {
                                    break;
                                }
                                continue;
                            }

                            let reached = state.rooms.publish(&key, src).await;
                            debug!(
                                conn_id = %conn_id,
                                room = %key,
                                subscribers = reached,
                                "published value"
                            );
                        }
                        Err(e) => {
                            warn!(conn_id = %conn_id, room = %key, "unparseable frame: {}", e);
                            let frame = ServerFrame::Error {
                                message: "unrecognized frame".to_string(),
                            };
                            if send_frame(&mut sender, &frame).await.is_err() {
                                break;
                            }
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // ping/pong handled by axum, binary ignored
                Some(Err(e)) => {
                    debug!(conn_id = %conn_id, room = %key, "socket error: {}", e);
                    break;
                }
            },
        }
    }

    info!(conn_id = %conn_id, room = %key, "room connection closed");
}

async fn send_frame(
    sender: &mut (impl Sink<Message> + Unpin),
    frame: &ServerFrame,
) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            warn!("failed to encode frame: {}", e);
            return Err(());
        }
    };
    sender.send(Message::Text(json.into())).await.map_err(|_| ())
}
