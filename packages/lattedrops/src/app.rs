//! Application context.
//!
//! Owns the room session explicitly and hands shared handles to the
//! collaborators that need them; nothing reaches for global state. The app
//! is the dispatch table: each acquisition variant gets a submit method that
//! routes through the one dispatcher.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::dispatch::{DispatchOutcome, Limits, UploadDispatcher};
use crate::error::{DispatchError, SessionError};
use crate::notify::TitleNotifier;
use crate::payload::Payload;
use crate::room::RoomKey;
use crate::session::{RoomEvents, RoomSession};
use crate::sources::{
    DropEvent, DropSource, PasteEvent, PasteSource, PickerSource, SelectionEvent, UploadSource,
};
use crate::transport::Transport;
use crate::ui::{Location, Titlebar, UiSurface};

/// Relays inbound deliveries to the visible surface and the notifier.
struct InboundRelay {
    ui: Arc<dyn UiSurface>,
    notifier: Arc<TitleNotifier>,
}

impl RoomEvents for InboundRelay {
    fn image_received(&self, payload: Payload) {
        self.notifier.notify();
        self.ui.update_image(&payload);
    }
}

pub struct App<T: Transport> {
    session: Arc<Mutex<RoomSession<T>>>,
    dispatcher: UploadDispatcher<T>,
    drop_source: DropSource,
    paste_source: PasteSource,
    picker_source: PickerSource,
    notifier: Arc<TitleNotifier>,
    location: Arc<dyn Location>,
}

impl<T: Transport> App<T> {
    pub fn new(
        transport: T,
        ui: Arc<dyn UiSurface>,
        titlebar: Arc<dyn Titlebar>,
        location: Arc<dyn Location>,
        limits: Limits,
    ) -> Self {
        let notifier = Arc::new(TitleNotifier::new(titlebar));
        let events: Arc<dyn RoomEvents> = Arc::new(InboundRelay {
            ui: ui.clone(),
            notifier: notifier.clone(),
        });
        let session = Arc::new(Mutex::new(RoomSession::new(
            transport,
            events,
            location.clone(),
            ui.clone(),
        )));
        let dispatcher = UploadDispatcher::new(session.clone(), limits);
        Self {
            session,
            dispatcher,
            drop_source: DropSource::new(ui),
            paste_source: PasteSource::new(),
            picker_source: PickerSource::new(),
            notifier,
            location,
        }
    }

    /// Join the room named by the location fragment, if there is one.
    /// With no fragment the session stays unjoined until the first dispatch.
    pub async fn start(&self) -> Result<Option<RoomKey>, SessionError> {
        match self.location.fragment() {
            Some(fragment) => {
                let key = RoomKey::parse(&fragment)?;
                self.session.lock().await.join(Some(key.clone())).await?;
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    /// The location fragment changed under us. Anything that doesn't match
    /// the current session resyncs the hard way: full reload.
    pub async fn fragment_changed(&self) {
        let fragment = self.location.fragment();
        let current = self
            .session
            .lock()
            .await
            .key()
            .map(|key| key.as_str().to_string());
        if fragment != current {
            info!(?fragment, "location fragment diverged from session, reloading");
            self.location.reload();
        }
    }

    pub async fn submit_drop(&self, event: DropEvent) -> Result<DispatchOutcome, DispatchError> {
        self.dispatcher.submit(self.drop_source.acquire(event)).await
    }

    pub async fn submit_paste(&self, event: PasteEvent) -> Result<DispatchOutcome, DispatchError> {
        self.dispatcher
            .submit(self.paste_source.acquire(event))
            .await
    }

    pub async fn submit_selection(
        &self,
        event: SelectionEvent,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.dispatcher
            .submit(self.picker_source.acquire(event))
            .await
    }

    pub fn on_focus(&self) {
        self.notifier.focus_gained();
    }

    pub fn on_blur(&self) {
        self.notifier.focus_lost();
    }

    /// Drag affordance hooks (enter/over/leave) for the embedder.
    pub fn drop_source(&self) -> &DropSource {
        &self.drop_source
    }

    pub async fn room_key(&self) -> Option<RoomKey> {
        self.session.lock().await.key().cloned()
    }

    pub fn share_url(&self) -> String {
        self.location.href()
    }
}
