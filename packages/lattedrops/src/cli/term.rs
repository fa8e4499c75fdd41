//! Terminal implementations of the UI collaborator traits.
//!
//! The terminal is the "page": received images land in a directory, the
//! share URL is printed, and the notification marker goes into the terminal
//! title via the OSC 0 escape.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use lattedrops::payload::Payload;
use lattedrops::ui::{Location, Titlebar, UiSurface};

pub struct TermSurface {
    save_dir: PathBuf,
    counter: AtomicUsize,
}

impl TermSurface {
    pub fn new(save_dir: Option<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.unwrap_or_else(std::env::temp_dir),
            counter: AtomicUsize::new(0),
        }
    }
}

impl UiSurface for TermSurface {
    fn show_share_panel(&self) {
        info!("room is live; pass the share url around");
    }

    fn hide_share_panel(&self) {}

    fn set_share_url(&self, url: &str) {
        println!("share url: {url}");
    }

    fn update_image(&self, payload: &Payload) {
        if !payload.is_data_uri() {
            println!("received image url: {payload}");
            return;
        }

        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let ext = extension_for(payload.media_type().unwrap_or_default());
        let path = self.save_dir.join(format!("drop-{n}.{ext}"));
        match payload.decode_data() {
            Some(bytes) => match std::fs::write(&path, bytes) {
                Ok(()) => println!("received image, saved to {}", path.display()),
                Err(e) => warn!("could not save received image: {}", e),
            },
            None => warn!("received a malformed data-uri, skipping"),
        }
    }

    fn set_drop_active(&self, _active: bool) {}
}

fn extension_for(media_type: &str) -> &'static str {
    match media_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "img",
    }
}

pub struct TermTitlebar {
    title: Mutex<String>,
}

impl TermTitlebar {
    pub fn new(title: &str) -> Self {
        Self {
            title: Mutex::new(title.to_string()),
        }
    }
}

impl Titlebar for TermTitlebar {
    fn title(&self) -> String {
        self.title.lock().unwrap().clone()
    }

    fn set_title(&self, title: &str) {
        *self.title.lock().unwrap() = title.to_string();
        // OSC 0: set the terminal window title.
        print!("\x1b]0;{title}\x07");
        let _ = std::io::stdout().flush();
    }
}

/// Process-local stand-in for a navigable location. The share URL is the
/// relay address plus the room fragment, which `drops watch` knows how to
/// take apart again.
pub struct TermLocation {
    base: String,
    fragment: Mutex<Option<String>>,
}

impl TermLocation {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self {
            base,
            fragment: Mutex::new(None),
        }
    }
}

impl Location for TermLocation {
    fn fragment(&self) -> Option<String> {
        self.fragment.lock().unwrap().clone()
    }

    fn set_fragment(&self, fragment: &str) {
        *self.fragment.lock().unwrap() = Some(fragment.to_string());
    }

    fn href(&self) -> String {
        match self.fragment() {
            Some(fragment) => format!("{}#{fragment}", self.base),
            None => self.base.clone(),
        }
    }

    fn reload(&self) {
        warn!("room changed externally; restart to resync");
    }
}
