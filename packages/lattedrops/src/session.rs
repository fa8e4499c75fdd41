//! Room session lifecycle.
//!
//! A session is either unjoined or bound to exactly one room. Joining a
//! different key replaces the binding wholesale: the old subscription is
//! cancelled before the new channel exists, so a late delivery from the old
//! room can never reach the handler that now represents the new one.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::payload::Payload;
use crate::room::RoomKey;
use crate::transport::{Channel, Subscription, Transport};
use crate::ui::{Location, UiSurface};

/// Receiver for inbound room deliveries.
pub trait RoomEvents: Send + Sync + 'static {
    fn image_received(&self, payload: Payload);
}

struct ActiveRoom<C> {
    key: RoomKey,
    channel: C,
    subscription: CancellationToken,
}

pub struct RoomSession<T: Transport> {
    transport: T,
    events: Arc<dyn RoomEvents>,
    location: Arc<dyn Location>,
    ui: Arc<dyn UiSurface>,
    active: Option<ActiveRoom<T::Channel>>,
    /// Bumped on every successful join to a different key. In-flight work
    /// tagged with an older epoch is talking about a room this session no
    /// longer represents.
    epoch: u64,
}

impl<T: Transport> RoomSession<T> {
    pub fn new(
        transport: T,
        events: Arc<dyn RoomEvents>,
        location: Arc<dyn Location>,
        ui: Arc<dyn UiSurface>,
    ) -> Self {
        Self {
            transport,
            events,
            location,
            ui,
            active: None,
            epoch: 0,
        }
    }

    /// Join a room, creating one (random key) when none is given.
    ///
    /// Re-joining the key the session already holds is a no-op. On any
    /// failure the session is left unjoined; the error is retryable.
    pub async fn join(&mut self, key: Option<RoomKey>) -> Result<RoomKey, SessionError> {
        let key = key.unwrap_or_else(RoomKey::generate);

        if let Some(active) = &self.active {
            if active.key == key {
                debug!(room = %key, "already joined, ignoring re-join");
                return Ok(key);
            }
        }

        if let Some(old) = self.active.take() {
            info!(from = %old.key, to = %key, "switching rooms");
            old.subscription.cancel();
        }

        let mut channel = self.transport.open(&key).await?;
        let subscription = channel.subscribe()?;
        let subscription = spawn_inbound_relay(self.events.clone(), subscription);

        self.epoch += 1;
        self.location.set_fragment(key.as_str());
        self.ui.set_share_url(&self.location.href());
        self.ui.show_share_panel();

        info!(room = %key, "joined room");
        self.active = Some(ActiveRoom {
            key: key.clone(),
            channel,
            subscription,
        });
        Ok(key)
    }

    /// Publish a payload into the current room.
    pub async fn send(&self, payload: &Payload) -> Result<(), SessionError> {
        match &self.active {
            Some(active) => {
                active.channel.publish(payload).await?;
                debug!(room = %active.key, bytes = payload.as_str().len(), "published payload");
                Ok(())
            }
            None => Err(SessionError::NotJoined),
        }
    }

    pub fn is_joined(&self) -> bool {
        self.active.is_some()
    }

    pub fn key(&self) -> Option<&RoomKey> {
        self.active.as_ref().map(|active| &active.key)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Forward subscription deliveries to the events handler until cancelled.
/// Returns the token that detaches the relay.
fn spawn_inbound_relay(
    events: Arc<dyn RoomEvents>,
    mut subscription: Subscription,
) -> CancellationToken {
    let cancel = subscription.cancel_token();
    let token = cancel.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                delivery = subscription.recv() => match delivery {
                    // Re-check after the await: a room switch may have
                    // happened while this delivery was in flight.
                    Some(payload) if !token.is_cancelled() => events.image_received(payload),
                    _ => break,
                },
            }
        }
    });
    cancel
}
