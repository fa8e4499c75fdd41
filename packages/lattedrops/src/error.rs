//! Error types for the drop-room pipeline.
//!
//! The guiding policy: silent no-op for user-input ambiguity (an unrecognized
//! drop or paste simply produces no payload), loud failure for internal
//! invariant breaks.

use std::time::Duration;

/// A room key that cannot travel in a URL fragment.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid room key {key:?}")]
pub struct InvalidRoomKey {
    pub key: String,
}

/// Transport-level failures. All of these are retryable from the caller's
/// point of view; nothing here retries automatically.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("channel closed")]
    Closed,

    #[error("channel already has a subscription")]
    AlreadySubscribed,
}

/// Failures while turning an acquisition event into a payload.
///
/// Acquisition *mismatches* (no file, no recognizable URL) are not errors;
/// adapters report those as `Ok(None)`. These are the genuine failures that
/// must reach the dispatcher instead of silently stalling the UI.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    #[error("failed to read image data: {0}")]
    Read(#[from] std::io::Error),

    #[error("image decode timed out after {after:?}")]
    Timeout { after: Duration },
}

/// Room session failures.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// `send` was called with no room joined. After the dispatcher's
    /// auto-join this is a programming error, and it fails loudly rather
    /// than dropping the payload.
    #[error("no active room session")]
    NotJoined,

    #[error("invalid room key in location fragment: {0}")]
    InvalidKey(#[from] InvalidRoomKey),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures surfaced by [`UploadDispatcher`](crate::dispatch::UploadDispatcher).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Acquire(#[from] AcquireError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
