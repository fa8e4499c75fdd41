//! End-to-end pipeline test: two apps on one relay, real sockets throughout.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::timeout;

use lattedrops::app::App;
use lattedrops::dispatch::{DispatchOutcome, Limits};
use lattedrops::payload::Payload;
use lattedrops::sources::{ClipboardContent, ClipboardItem, FileAttachment, PasteEvent, SelectionEvent};
use lattedrops::transport::RelayTransport;
use lattedrops::ui::{Location, Titlebar, UiSurface};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct TestUi {
    images: Mutex<Vec<String>>,
    notify: Notify,
}

impl TestUi {
    fn images(&self) -> Vec<String> {
        self.images.lock().unwrap().clone()
    }

    async fn wait_for_image(&self) {
        loop {
            let notified = self.notify.notified();
            if !self.images().is_empty() {
                return;
            }
            notified.await;
        }
    }
}

impl UiSurface for TestUi {
    fn show_share_panel(&self) {}
    fn hide_share_panel(&self) {}
    fn set_share_url(&self, _url: &str) {}

    fn update_image(&self, payload: &Payload) {
        self.images.lock().unwrap().push(payload.as_str().to_string());
        self.notify.notify_waiters();
    }

    fn set_drop_active(&self, _active: bool) {}
}

struct TestTitlebar(Mutex<String>);

impl Titlebar for TestTitlebar {
    fn title(&self) -> String {
        self.0.lock().unwrap().clone()
    }
    fn set_title(&self, title: &str) {
        *self.0.lock().unwrap() = title.to_string();
    }
}

#[derive(Default)]
struct TestLocation {
    fragment: Mutex<Option<String>>,
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
    fn reload(&self) {}
}

async fn start_relay() -> SocketAddr {
    let state = drop_relay::AppState::new(8 * 1024 * 1024);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind relay listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, drop_relay::router(state)).await.unwrap();
    });
    addr
}

fn build_app(addr: SocketAddr, room: Option<&str>) -> (App<RelayTransport>, Arc<TestUi>) {
    let ui = Arc::new(TestUi::default());
    let location = Arc::new(TestLocation::default());
    if let Some(room) = room {
        location.set_fragment(room);
    }
    let app = App::new(
        RelayTransport::new(format!("ws://{addr}")),
        ui.clone(),
        Arc::new(TestTitlebar(Mutex::new("drops".to_string()))),
        location,
        Limits::default(),
    );
    (app, ui)
}

#[tokio::test]
async fn shared_url_reaches_a_watching_app() {
    let addr = start_relay().await;

    let (watcher, watcher_ui) = build_app(addr, Some("e2e1"));
    watcher.start().await.unwrap();

    let (sharer, _sharer_ui) = build_app(addr, Some("e2e1"));
    sharer.start().await.unwrap();

    let outcome = sharer
        .submit_paste(PasteEvent {
            items: vec![ClipboardItem {
                media_type: "text/plain".to_string(),
                content: ClipboardContent::Text("https://example.com/cat.png".to_string()),
            }],
        })
        .await
        .unwrap();
    assert!(matches!(outcome, DispatchOutcome::Sent(_)));

    timeout(TEST_TIMEOUT, watcher_ui.wait_for_image())
        .await
        .expect("image never reached the watcher");
    assert_eq!(watcher_ui.images(), vec!["https://example.com/cat.png"]);
}

#[tokio::test]
async fn picked_file_arrives_as_the_same_data_uri() {
    let addr = start_relay().await;

    let (watcher, watcher_ui) = build_app(addr, Some("e2e2"));
    watcher.start().await.unwrap();

    let (sharer, _) = build_app(addr, Some("e2e2"));
    sharer.start().await.unwrap();

    sharer
        .submit_selection(SelectionEvent {
            files: vec![FileAttachment::from_bytes(
                "pixel.png",
                "image/png",
                b"not-really-a-png".to_vec(),
            )],
        })
        .await
        .unwrap();

    timeout(TEST_TIMEOUT, watcher_ui.wait_for_image())
        .await
        .expect("image never reached the watcher");

    let expected = Payload::from_image_bytes("image/png", b"not-really-a-png");
    assert_eq!(watcher_ui.images(), vec![expected.as_str().to_string()]);
}

#[tokio::test]
async fn late_watcher_gets_the_current_image_on_join() {
    let addr = start_relay().await;

    let (sharer, _) = build_app(addr, Some("e2e3"));
    sharer.start().await.unwrap();
    sharer
        .submit_paste(PasteEvent {
            items: vec![ClipboardItem {
                media_type: "text/plain".to_string(),
                content: ClipboardContent::Text("https://example.com/late.png".to_string()),
            }],
        })
        .await
        .unwrap();

    let (watcher, watcher_ui) = build_app(addr, Some("e2e3"));
    watcher.start().await.unwrap();

    timeout(TEST_TIMEOUT, watcher_ui.wait_for_image())
        .await
        .expect("late joiner never saw the current image");
    assert_eq!(watcher_ui.images(), vec!["https://example.com/late.png"]);
}

#[tokio::test]
async fn share_with_no_room_autogenerates_a_shareable_key() {
    let addr = start_relay().await;

    let (sharer, _) = build_app(addr, None);
    sharer.start().await.unwrap();
    assert_eq!(sharer.room_key().await, None);

    let outcome = sharer
        .submit_paste(PasteEvent {
            items: vec![ClipboardItem {
                media_type: "text/plain".to_string(),
                content: ClipboardContent::Text("https://example.com/cat.png".to_string()),
            }],
        })
        .await
        .unwrap();

    let DispatchOutcome::Sent(key) = outcome else {
        panic!("expected Sent, got {outcome:?}");
    };
    assert_eq!(key.as_str().len(), 4);

    // Another app can watch the generated room and see the image.
    let (watcher, watcher_ui) = build_app(addr, Some(key.as_str()));
    watcher.start().await.unwrap();
    timeout(TEST_TIMEOUT, watcher_ui.wait_for_image())
        .await
        .expect("generated room was not joinable");
    assert_eq!(watcher_ui.images(), vec!["https://example.com/cat.png"]);
}
