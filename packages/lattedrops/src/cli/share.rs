//! `drops share` — publish an image file or image URL into a room.

use anyhow::{Result, bail};

use lattedrops::dispatch::{DispatchOutcome, Limits};
use lattedrops::sources::{
    ClipboardContent, ClipboardItem, FileAttachment, PasteEvent, SelectionEvent,
};

pub async fn run(
    relay_url: &str,
    room: Option<&str>,
    limits: Limits,
    source: &str,
) -> Result<()> {
    let app = super::build_app(relay_url, room, limits, None)?;
    app.start().await?;

    // A URL argument goes through the paste adapter (it is text that must
    // look like an image URL); a path goes through the picker adapter.
    let outcome = if source.starts_with("http://") || source.starts_with("https://") {
        app.submit_paste(PasteEvent {
            items: vec![ClipboardItem {
                media_type: "text/plain".to_string(),
                content: ClipboardContent::Text(source.to_string()),
            }],
        })
        .await?
    } else {
        app.submit_selection(SelectionEvent {
            files: vec![FileAttachment::from_path(source)],
        })
        .await?
    };

    match outcome {
        DispatchOutcome::Sent(key) => {
            println!("shared into room {key}");
            println!("viewers can run: drops watch --relay {relay_url} --room {key}");
            Ok(())
        }
        DispatchOutcome::NoPayload => {
            bail!("{source} is not an image file or image URL")
        }
        DispatchOutcome::Stale => bail!("upload was discarded after a room switch"),
    }
}
