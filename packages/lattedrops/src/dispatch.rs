//! Upload dispatcher.
//!
//! Central sink every upload source reports to. Guarantees a room exists
//! before the first send, bounds payload size and decode time, and discards
//! acquisitions that finish after the session has moved to a different room.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::{AcquireError, DispatchError};
use crate::payload::Payload;
use crate::room::RoomKey;
use crate::session::RoomSession;
use crate::transport::Transport;

/// Explicit bounds on what a single upload may cost.
#[derive(Debug, Clone)]
pub struct Limits {
    pub max_payload_bytes: usize,
    pub decode_timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_payload_bytes: 8 * 1024 * 1024,
            decode_timeout: Duration::from_secs(30),
        }
    }
}

/// What became of a submitted acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Published into this room.
    Sent(RoomKey),
    /// The event carried nothing recognizable; dropped silently.
    NoPayload,
    /// The decode finished after a room switch; discarded.
    Stale,
}

pub struct UploadDispatcher<T: Transport> {
    session: Arc<Mutex<RoomSession<T>>>,
    limits: Limits,
}

impl<T: Transport> UploadDispatcher<T> {
    pub fn new(session: Arc<Mutex<RoomSession<T>>>, limits: Limits) -> Self {
        Self { session, limits }
    }

    /// Publish a resolved payload, creating a room first if none is joined.
    pub async fn dispatch(&self, payload: Payload) -> Result<RoomKey, DispatchError> {
        let size = payload.as_str().len();
        if size > self.limits.max_payload_bytes {
            return Err(DispatchError::PayloadTooLarge {
                size,
                limit: self.limits.max_payload_bytes,
            });
        }

        let mut session = self.session.lock().await;
        let key = match session.key().cloned() {
            Some(key) => key,
            None => session.join(None).await?,
        };

        if let Err(e) = session.send(&payload).await {
            // After the auto-join above an unjoined session is a broken
            // invariant, not a user mistake.
            error!("dropping payload, send failed after auto-join: {}", e);
            return Err(e.into());
        }
        Ok(key)
    }

    /// Run an acquisition to completion and publish its payload, unless the
    /// session identity changed while the acquisition was in flight.
    pub async fn submit<F>(&self, acquisition: F) -> Result<DispatchOutcome, DispatchError>
    where
        F: Future<Output = Result<Option<Payload>, AcquireError>>,
    {
        let epoch_at_start = self.session.lock().await.epoch();

        let resolved = tokio::time::timeout(self.limits.decode_timeout, acquisition)
            .await
            .map_err(|_| AcquireError::Timeout {
                after: self.limits.decode_timeout,
            })??;

        let Some(payload) = resolved else {
            return Ok(DispatchOutcome::NoPayload);
        };

        if self.session.lock().await.epoch() != epoch_at_start {
            debug!("discarding acquisition that finished after a room switch");
            return Ok(DispatchOutcome::Stale);
        }

        let key = self.dispatch(payload).await?;
        Ok(DispatchOutcome::Sent(key))
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::GENERATED_KEY_LEN;
    use crate::test_helpers::{CollectingEvents, RecordingUi, TestLocation};
    use crate::transport::MemoryTransport;
    use crate::ui::Location;

    fn url(s: &str) -> Payload {
        Payload::parse(s).unwrap()
    }

    fn dispatcher(
        transport: &MemoryTransport,
        limits: Limits,
    ) -> (
        UploadDispatcher<MemoryTransport>,
        Arc<Mutex<RoomSession<MemoryTransport>>>,
        Arc<TestLocation>,
    ) {
        let location = Arc::new(TestLocation::default());
        let session = Arc::new(Mutex::new(RoomSession::new(
            transport.clone(),
            Arc::new(CollectingEvents::default()),
            location.clone(),
            Arc::new(RecordingUi::default()),
        )));
        (
            UploadDispatcher::new(session.clone(), limits),
            session,
            location,
        )
    }

    #[tokio::test]
    async fn first_dispatch_auto_creates_a_room() {
        let transport = MemoryTransport::new();
        let (dispatcher, session, location) = dispatcher(&transport, Limits::default());

        let payload = url("https://example.com/cat.png");
        let key = dispatcher.dispatch(payload.clone()).await.unwrap();

        assert_eq!(key.as_str().len(), GENERATED_KEY_LEN);
        assert_eq!(location.fragment().as_deref(), Some(key.as_str()));
        assert!(session.lock().await.is_joined());
        assert_eq!(transport.current_value(&key).await, Some(payload));
    }

    #[tokio::test]
    async fn dispatch_reuses_the_joined_room() {
        let transport = MemoryTransport::new();
        let (dispatcher, _session, _location) = dispatcher(&transport, Limits::default());

        let first = dispatcher.dispatch(url("https://example.com/a.png")).await.unwrap();
        let second = dispatcher.dispatch(url("https://example.com/b.png")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.channels_opened(), 1);
        assert_eq!(
            transport.current_value(&first).await,
            Some(url("https://example.com/b.png"))
        );
    }

    #[tokio::test]
    async fn oversize_payload_is_refused_before_any_join() {
        let transport = MemoryTransport::new();
        let (dispatcher, session, _location) = dispatcher(
            &transport,
            Limits {
                max_payload_bytes: 16,
                ..Limits::default()
            },
        );

        let err = dispatcher
            .dispatch(url("https://example.com/very-long-name.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::PayloadTooLarge { .. }));
        assert!(!session.lock().await.is_joined());
    }

    #[tokio::test]
    async fn empty_acquisition_is_dropped_silently() {
        let transport = MemoryTransport::new();
        let (dispatcher, session, _location) = dispatcher(&transport, Limits::default());

        let outcome = dispatcher.submit(async { Ok(None) }).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::NoPayload);
        assert!(!session.lock().await.is_joined());
    }

    #[tokio::test]
    async fn acquisition_error_propagates() {
        let transport = MemoryTransport::new();
        let (dispatcher, _session, _location) = dispatcher(&transport, Limits::default());

        let result = dispatcher
            .submit(async {
                Err(AcquireError::Read(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "short read",
                )))
            })
            .await;
        assert!(matches!(
            result,
            Err(DispatchError::Acquire(AcquireError::Read(_)))
        ));
    }

    #[tokio::test]
    async fn slow_acquisition_times_out() {
        let transport = MemoryTransport::new();
        let (dispatcher, _session, _location) = dispatcher(
            &transport,
            Limits {
                decode_timeout: Duration::from_millis(10),
                ..Limits::default()
            },
        );

        let result = dispatcher
            .submit(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Some(url("https://example.com/cat.png")))
            })
            .await;
        assert!(matches!(
            result,
            Err(DispatchError::Acquire(AcquireError::Timeout { .. }))
        ));
    }

    #[tokio::test]
    async fn decode_finishing_after_room_switch_is_discarded() {
        let transport = MemoryTransport::new();
        let (dispatcher, session, _location) = dispatcher(&transport, Limits::default());

        let k1 = RoomKey::parse("k1").unwrap();
        let k2 = RoomKey::parse("k2").unwrap();
        session.lock().await.join(Some(k1)).await.unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel();
        let acquisition = async move {
            let payload = rx.await.expect("acquisition driver dropped");
            Ok(Some(payload))
        };

        let submit = dispatcher.submit(acquisition);
        let driver = async {
            // The submit future has recorded its epoch and parked on the
            // oneshot by the time join! polls us.
            session.lock().await.join(Some(k2.clone())).await.unwrap();
            tx.send(url("https://example.com/stale.png")).unwrap();
        };

        let (outcome, ()) = tokio::join!(submit, driver);
        assert_eq!(outcome.unwrap(), DispatchOutcome::Stale);

        // Nothing may have leaked into the new room.
        assert_eq!(transport.current_value(&k2).await, None);
    }
}
