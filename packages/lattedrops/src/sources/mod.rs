//! Upload sources.
//!
//! Every way an image enters the system (drag-and-drop, paste, file picker)
//! is an adapter over one capability: produce a [`Payload`],
//! asynchronously, from a raw acquisition event. The adapters are
//! independent peers composed by the app; none of them knows the others
//! exist.
//!
//! Acquisition mismatches (a drop with no file and no `<img>` markup, a
//! paste of plain prose, a picked spreadsheet) resolve to `Ok(None)`: the
//! user retries trivially, nothing is reported. Only genuine failures, like
//! an unreadable file or a decode that never finishes, surface as errors.

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::AcquireError;
use crate::payload::Payload;

mod drag;
mod paste;
mod picker;

pub use drag::{DropEffect, DropEvent, DropSource};
pub use paste::{ClipboardContent, ClipboardItem, PasteEvent, PasteSource};
pub use picker::{PickerSource, SelectionEvent};

/// The single capability all acquisition variants share.
pub trait UploadSource {
    type Event;

    fn acquire(
        &self,
        event: Self::Event,
    ) -> impl Future<Output = Result<Option<Payload>, AcquireError>> + Send;
}

/// A file carried by an acquisition event, either with its bytes already in
/// hand (clipboard data) or still on disk (picker, drop).
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub name: String,
    pub media_type: String,
    pub data: FileData,
}

#[derive(Debug, Clone)]
pub enum FileData {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl FileAttachment {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: FileData::Bytes(bytes),
        }
    }

    /// Build an attachment for a file on disk, guessing the media type from
    /// the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let media_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            media_type,
            data: FileData::Path(path),
        }
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Read the file and encode it as a data-URI payload. The read is the
    /// suspension point of every file-backed acquisition.
    pub async fn read_data_uri(&self) -> Result<Payload, AcquireError> {
        let bytes = match &self.data {
            FileData::Bytes(bytes) => bytes.clone(),
            FileData::Path(path) => tokio::fs::read(path).await?,
        };
        Ok(Payload::from_image_bytes(&self.media_type, &bytes))
    }
}
