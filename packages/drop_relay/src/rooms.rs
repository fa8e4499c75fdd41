//! Room Store
//!
//! One slot per room: the current image src plus a broadcast channel fanning
//! updates out to every connected subscriber. Rooms hold exactly one value;
//! publishing fully replaces whatever was there before.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

/// Capacity of each room's broadcast channel. A slow subscriber that falls
/// further behind than this observes a lag error and simply misses the
/// intermediate values. Only the latest one matters.
const ROOM_BROADCAST_CAPACITY: usize = 32;

struct RoomState {
    /// Current value of the room's single slot. `None` until the first publish.
    value: Option<String>,
    tx: broadcast::Sender<String>,
}

impl RoomState {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(ROOM_BROADCAST_CAPACITY);
        Self { value: None, tx }
    }
}

/// Shared map of all live rooms. Rooms are created on first touch and never
/// expire; their state is a single string, not worth a reaper.
#[derive(Clone, Default)]
pub struct RoomStore {
    rooms: Arc<RwLock<HashMap<String, RoomStateCell>>>,
}

type RoomStateCell = Arc<RwLock<RoomState>>;

/// What a new subscriber gets: the slot's value as of join time, plus a
/// receiver for every subsequent publish.
pub struct RoomJoin {
    pub current: Option<String>,
    pub updates: broadcast::Receiver<String>,
}

impl RoomStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn room(&self, key: &str) -> RoomStateCell {
        {
            let rooms = self.rooms.read().await;
            if let Some(room) = rooms.get(key) {
                return room.clone();
            }
        }
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(room = %key, "creating room");
                Arc::new(RwLock::new(RoomState::new()))
            })
            .clone()
    }

    /// Join a room, returning its current value and an update receiver.
    ///
    /// The snapshot and the subscription are taken under one lock so a
    /// publish can never fall between them.
    pub async fn join(&self, key: &str) -> RoomJoin {
        let room = self.room(key).await;
        let room = room.read().await;
        RoomJoin {
            current: room.value.clone(),
            updates: room.tx.subscribe(),
        }
    }

    /// Replace the room's value (last-write-wins) and fan it out.
    /// Returns the number of subscribers the update reached.
    pub async fn publish(&self, key: &str, src: String) -> usize {
        let room = self.room(key).await;
        let mut room = room.write().await;
        room.value = Some(src.clone());
        room.tx.send(src).unwrap_or(0)
    }

    /// Number of rooms currently held (diagnostics only).
    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_room_has_no_value() {
        let store = RoomStore::new();
        let join = store.join("q7x2").await;
        assert!(join.current.is_none());
    }

    #[tokio::test]
    async fn publish_reaches_subscriber_unchanged() {
        let store = RoomStore::new();
        let mut join = store.join("q7x2").await;

        let src = "data:image/png;base64,iVBORw0KGgo=";
        store.publish("q7x2", src.to_string()).await;

        assert_eq!(join.updates.recv().await.unwrap(), src);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = RoomStore::new();
        store.publish("q7x2", "first".to_string()).await;
        store.publish("q7x2", "second".to_string()).await;

        let join = store.join("q7x2").await;
        assert_eq!(join.current.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn late_joiner_sees_current_value() {
        let store = RoomStore::new();
        store
            .publish("q7x2", "https://example.com/cat.png".to_string())
            .await;

        let join = store.join("q7x2").await;
        assert_eq!(join.current.as_deref(), Some("https://example.com/cat.png"));
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let store = RoomStore::new();
        store.publish("aaaa", "for-a".to_string()).await;

        let join = store.join("bbbb").await;
        assert!(join.current.is_none());
        assert_eq!(store.len().await, 2);
    }
}
