//! Recording doubles for the collaborator traits.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

use crate::payload::Payload;
use crate::session::RoomEvents;
use crate::ui::{Location, Titlebar, UiSurface};

/// UI surface that records every call.
#[derive(Default)]
pub struct RecordingUi {
    share_panel_shown: Mutex<bool>,
    share_urls: Mutex<Vec<String>>,
    last_image: Mutex<Option<String>>,
    drop_active: Mutex<Option<bool>>,
    notify: Notify,
}

impl RecordingUi {
    pub fn share_panel_shown(&self) -> bool {
        *self.share_panel_shown.lock().unwrap()
    }

    pub fn share_urls(&self) -> Vec<String> {
        self.share_urls.lock().unwrap().clone()
    }

    pub fn last_image(&self) -> Option<String> {
        self.last_image.lock().unwrap().clone()
    }

    pub fn drop_active(&self) -> Option<bool> {
        *self.drop_active.lock().unwrap()
    }

    pub async fn wait_for_image(&self) {
        loop {
            let notified = self.notify.notified();
            if self.last_image().is_some() {
                return;
            }
            notified.await;
        }
    }
}

impl UiSurface for RecordingUi {
    fn show_share_panel(&self) {
        *self.share_panel_shown.lock().unwrap() = true;
    }

    fn hide_share_panel(&self) {
        *self.share_panel_shown.lock().unwrap() = false;
    }

    fn set_share_url(&self, url: &str) {
        self.share_urls.lock().unwrap().push(url.to_string());
    }

    fn update_image(&self, payload: &Payload) {
        *self.last_image.lock().unwrap() = Some(payload.as_str().to_string());
        self.notify.notify_waiters();
    }

    fn set_drop_active(&self, active: bool) {
        *self.drop_active.lock().unwrap() = Some(active);
    }
}

pub struct RecordingTitlebar {
    title: Mutex<String>,
}

impl RecordingTitlebar {
    pub fn new(title: &str) -> Self {
        Self {
            title: Mutex::new(title.to_string()),
        }
    }
}

impl Titlebar for RecordingTitlebar {
    fn title(&self) -> String {
        self.title.lock().unwrap().clone()
    }

    fn set_title(&self, title: &str) {
        *self.title.lock().unwrap() = title.to_string();
    }
}

/// In-memory location with a reload counter.
#[derive(Default)]
pub struct TestLocation {
    fragment: Mutex<Option<String>>,
    reloads: AtomicUsize,
}

impl TestLocation {
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::Relaxed)
    }
}

impl Location for TestLocation {
    fn fragment(&self) -> Option<String> {
        self.fragment.lock().unwrap().clone()
    }

    fn set_fragment(&self, fragment: &str) {
        *self.fragment.lock().unwrap() = Some(fragment.to_string());
    }

    fn href(&self) -> String {
        match self.fragment() {
            Some(fragment) => format!("https://drops.test/#{fragment}"),
            None => "https://drops.test/".to_string(),
        }
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::Relaxed);
    }
}

/// Event sink collecting every inbound delivery.
#[derive(Default)]
pub struct CollectingEvents {
    received: Mutex<Vec<Payload>>,
    notify: Notify,
}

impl CollectingEvents {
    pub fn received(&self) -> Vec<Payload> {
        self.received.lock().unwrap().clone()
    }

    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.received.lock().unwrap().len() >= count {
                return;
            }
            notified.await;
        }
    }
}

impl RoomEvents for CollectingEvents {
    fn image_received(&self, payload: Payload) {
        self.received.lock().unwrap().push(payload);
        self.notify.notify_waiters();
    }
}
