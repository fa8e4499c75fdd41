//! Drag-and-drop acquisition.

use regex::Regex;
use std::sync::{Arc, LazyLock};

use crate::error::AcquireError;
use crate::payload::Payload;
use crate::ui::UiSurface;

use super::{FileAttachment, UploadSource};

/// Matches the src attribute of a dragged `<img>` markup fragment.
static IMG_SRC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src=["'](.+?)["']"#).expect("Invalid Regex"));

/// Drop effect the target answers during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Move,
}

/// What landed on the drop target: file attachments, or the HTML fragment of
/// whatever was dragged from another page.
#[derive(Debug, Clone, Default)]
pub struct DropEvent {
    pub files: Vec<FileAttachment>,
    pub html: Option<String>,
}

/// Adapter for the drop target. Also owns the drag visual affordance, which
/// is why it (alone among the sources) holds the UI surface.
pub struct DropSource {
    ui: Arc<dyn UiSurface>,
}

impl DropSource {
    pub fn new(ui: Arc<dyn UiSurface>) -> Self {
        Self { ui }
    }

    /// Drag entered the target: light it up and accept a "move".
    pub fn drag_enter(&self) -> DropEffect {
        self.ui.set_drop_active(true);
        DropEffect::Move
    }

    /// Drag is over the target. The embedder must suppress its default
    /// handling on this signal or the drop never reaches us.
    pub fn drag_over(&self) -> bool {
        true
    }

    pub fn drag_leave(&self) {
        self.ui.set_drop_active(false);
    }
}

impl UploadSource for DropSource {
    type Event = DropEvent;

    async fn acquire(&self, event: DropEvent) -> Result<Option<Payload>, AcquireError> {
        self.ui.set_drop_active(false);

        if let Some(file) = event.files.first() {
            if !file.is_image() {
                return Ok(None);
            }
            return file.read_data_uri().await.map(Some);
        }

        let Some(html) = event.html.as_deref() else {
            return Ok(None);
        };
        Ok(extract_img_src(html).and_then(Payload::parse))
    }
}

fn extract_img_src(html: &str) -> Option<&str> {
    IMG_SRC_PATTERN
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
