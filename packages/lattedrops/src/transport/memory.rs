//! In-process transport.
//!
//! Rooms live in a shared map; publishes fan out over a broadcast channel.
//! Used by the test suite and by anything that wants drop-room semantics
//! without a relay. Channel instantiations are counted so join idempotence
//! is observable from outside.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{RwLock, broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::payload::Payload;
use crate::room::RoomKey;

use super::{Channel, Subscription, Transport};

const ROOM_BROADCAST_CAPACITY: usize = 32;

struct MemoryRoom {
    value: Option<Payload>,
    tx: broadcast::Sender<Payload>,
}

impl MemoryRoom {
    fn new() -> Self {
        let (tx, _) = broadcast::channel(ROOM_BROADCAST_CAPACITY);
        Self { value: None, tx }
    }
}

type RoomMap = Arc<RwLock<HashMap<RoomKey, MemoryRoom>>>;

#[derive(Clone, Default)]
pub struct MemoryTransport {
    rooms: RoomMap,
    opens: Arc<AtomicUsize>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of channels this transport has instantiated.
    pub fn channels_opened(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    /// Current slot value of a room (`None` if empty or never touched).
    pub async fn current_value(&self, key: &RoomKey) -> Option<Payload> {
        self.rooms
            .read()
            .await
            .get(key)
            .and_then(|room| room.value.clone())
    }
}

impl Transport for MemoryTransport {
    type Channel = MemoryChannel;

    async fn open(&self, key: &RoomKey) -> Result<MemoryChannel, TransportError> {
        self.opens.fetch_add(1, Ordering::Relaxed);
        let (initial, updates) = {
            let mut rooms = self.rooms.write().await;
            let room = rooms.entry(key.clone()).or_insert_with(MemoryRoom::new);
            (room.value.clone(), room.tx.subscribe())
        };
        Ok(MemoryChannel {
            key: key.clone(),
            rooms: self.rooms.clone(),
            feed: Some((initial, updates)),
            cancel: CancellationToken::new(),
        })
    }
}

pub struct MemoryChannel {
    key: RoomKey,
    rooms: RoomMap,
    /// Snapshot + receiver captured at open time, consumed by `subscribe`.
    feed: Option<(Option<Payload>, broadcast::Receiver<Payload>)>,
    cancel: CancellationToken,
}

impl Channel for MemoryChannel {
    async fn publish(&self, payload: &Payload) -> Result<(), TransportError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .entry(self.key.clone())
            .or_insert_with(MemoryRoom::new);
        room.value = Some(payload.clone());
        let _ = room.tx.send(payload.clone());
        Ok(())
    }

    fn subscribe(&mut self) -> Result<Subscription, TransportError> {
        let (initial, mut updates) = self.feed.take().ok_or(TransportError::AlreadySubscribed)?;
        let (tx, rx) = mpsc::channel(16);
        let cancel = self.cancel.child_token();
        let token = cancel.clone();

        tokio::spawn(async move {
            // Initial read: only a non-empty slot is delivered.
            if let Some(value) = initial {
                if tx.send(value).await.is_err() {
                    return;
                }
            }
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    update = updates.recv() => match update {
                        Ok(value) => {
                            if tx.send(value).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        Ok(Subscription::new(rx, cancel))
    }
}

impl Drop for MemoryChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
