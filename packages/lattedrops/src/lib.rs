//! lattedrops: ephemeral image drop rooms.
//!
//! Drag, paste, or pick an image; it is encoded into a single-slot room on a
//! relay and rendered by every client watching the same room key. The core
//! here is transport-agnostic: the room lifecycle, the upload-source
//! adapters, and the dispatcher are generic over [`transport::Transport`],
//! with a relay-backed implementation for real use and an in-memory one for
//! tests.

pub mod app;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod payload;
pub mod room;
pub mod session;
pub mod sources;
pub mod transport;
pub mod ui;

#[cfg(test)]
mod test_helpers;

pub use app::App;
pub use dispatch::{DispatchOutcome, Limits, UploadDispatcher};
pub use error::{AcquireError, DispatchError, SessionError, TransportError};
pub use payload::Payload;
pub use room::RoomKey;
pub use session::{RoomEvents, RoomSession};
pub use transport::{MemoryTransport, RelayTransport};
