//! File-picker acquisition.

use crate::error::AcquireError;
use crate::payload::Payload;

use super::{FileAttachment, UploadSource};

/// A change event from the file input: whatever the user picked.
#[derive(Debug, Clone, Default)]
pub struct SelectionEvent {
    pub files: Vec<FileAttachment>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PickerSource;

impl PickerSource {
    pub fn new() -> Self {
        Self
    }
}

impl UploadSource for PickerSource {
    type Event = SelectionEvent;

    async fn acquire(&self, event: SelectionEvent) -> Result<Option<Payload>, AcquireError> {
        let Some(file) = event.files.first() else {
            return Ok(None);
        };
        if !file.is_image() {
            return Ok(None);
        }
        file.read_data_uri().await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn picked_image_becomes_data_uri() {
        let event = SelectionEvent {
            files: vec![FileAttachment::from_bytes(
                "cat.jpg",
                "image/jpeg",
                b"abc".to_vec(),
            )],
        };
        let payload = PickerSource::new().acquire(event).await.unwrap().unwrap();
        assert_eq!(payload.as_str(), "data:image/jpeg;base64,YWJj");
    }

    #[tokio::test]
    async fn picked_non_image_is_discarded_silently() {
        let event = SelectionEvent {
            files: vec![FileAttachment::from_bytes(
                "report.pdf",
                "application/pdf",
                b"%PDF".to_vec(),
            )],
        };
        assert_eq!(PickerSource::new().acquire(event).await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_selection_is_discarded_silently() {
        assert_eq!(
            PickerSource::new()
                .acquire(SelectionEvent::default())
                .await
                .unwrap(),
            None
        );
    }
}
