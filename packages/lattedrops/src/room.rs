//! Room identity.

use rand::Rng;
use std::fmt;

use crate::error::InvalidRoomKey;

/// Length of auto-generated keys. Four base-36 characters give ~1.7M rooms,
/// plenty for an ephemeral share namespace.
pub const GENERATED_KEY_LEN: usize = 4;

const KEY_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A short opaque string identifying a room. Non-empty and URL-fragment-safe
/// by construction; the key is the only piece of state a viewer needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomKey(String);

impl RoomKey {
    /// Synthesize a fresh random key: 4 lowercase base-36 characters.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let key = (0..GENERATED_KEY_LEN)
            .map(|_| KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())] as char)
            .collect();
        Self(key)
    }

    /// Accept a key supplied from outside (location fragment, CLI flag).
    pub fn parse(key: &str) -> Result<Self, InvalidRoomKey> {
        if drop_wire::is_valid_room_key(key) {
            Ok(Self(key.to_string()))
        } else {
            Err(InvalidRoomKey {
                key: key.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
