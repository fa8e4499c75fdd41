//! Paste acquisition.

use crate::error::AcquireError;
use crate::payload::Payload;

use super::{FileAttachment, UploadSource};

/// One item off the clipboard, as declared by its producer.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub media_type: String,
    pub content: ClipboardContent,
}

#[derive(Debug, Clone)]
pub enum ClipboardContent {
    File(FileAttachment),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct PasteEvent {
    pub items: Vec<ClipboardItem>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasteSource;

impl PasteSource {
    pub fn new() -> Self {
        Self
    }
}

impl UploadSource for PasteSource {
    type Event = PasteEvent;

    /// Only the first clipboard item is considered. Image data is decoded to
    /// a data-URI; text is accepted only when it is an absolute HTTP(S) URL.
    async fn acquire(&self, event: PasteEvent) -> Result<Option<Payload>, AcquireError> {
        let Some(item) = event.items.into_iter().next() else {
            return Ok(None);
        };

        if item.media_type.starts_with("image/") {
            match item.content {
                ClipboardContent::File(file) => file.read_data_uri().await.map(Some),
                ClipboardContent::Text(_) => Ok(None),
            }
        } else if item.media_type.starts_with("text/") {
            match item.content {
                ClipboardContent::Text(text) => Ok(Payload::http_url(&text)),
                ClipboardContent::File(_) => Ok(None),
            }
        } else {
            Ok(None)
        }
    }
}
