//! Transport abstraction.
//!
//! A [`Transport`] opens a [`Channel`] bound to one room key for the
//! channel's whole lifetime. Channels carry exactly one value (the room's
//! current image src) and fan out changes to exactly one subscription.
//!
//! The empty-room guard lives here: a channel's subscription never yields
//! anything for an empty slot, so a freshly created room cannot trigger a
//! handler with a missing payload.

use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::payload::Payload;
use crate::room::RoomKey;

pub mod memory;
pub mod relay;

pub use memory::MemoryTransport;
pub use relay::RelayTransport;

/// Factory for room channels.
pub trait Transport: Send + Sync + 'static {
    type Channel: Channel;

    /// Bind to the logical room at `key`. Failures are retryable; the
    /// caller's session stays unjoined.
    fn open(
        &self,
        key: &RoomKey,
    ) -> impl Future<Output = Result<Self::Channel, TransportError>> + Send;
}

/// A live binding to one room.
pub trait Channel: Send + 'static {
    /// Replace the room's current value (last-write-wins, no merge, no
    /// versioning).
    fn publish(
        &self,
        payload: &Payload,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Take this channel's subscription. It yields every value change,
    /// including the initial read when the room already holds something.
    /// Exactly one subscription exists per channel; a second call fails.
    fn subscribe(&mut self) -> Result<Subscription, TransportError>;
}

/// A detachable stream of room values.
///
/// Dropping the subscription or cancelling its token stops delivery; the
/// session cancels the token *before* attaching a replacement so a stale
/// delivery can never cross over.
pub struct Subscription {
    rx: mpsc::Receiver<Payload>,
    cancel: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(rx: mpsc::Receiver<Payload>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    pub async fn recv(&mut self) -> Option<Payload> {
        self.rx.recv().await
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
