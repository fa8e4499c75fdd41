//! Wire frames for the drop relay protocol.
//!
//! Both sides of a room WebSocket speak JSON text messages tagged by `type`.
//! The relay and the client crate share these definitions so a frame only
//! needs to change in one place.

use serde::{Deserialize, Serialize};

/// Frames sent by a client to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// Replace the room's current value with `src` (last-write-wins).
    Publish { src: String },
}

/// Frames sent by the relay to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// The room's current value. Sent once immediately after connect
    /// (with `src` absent when the room is empty) and again on every change.
    Value {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
    },
    /// A request was rejected; the room's value is unchanged.
    Error { message: String },
}

/// Room keys travel in URLs (both the ws path and the share fragment), so
/// they are restricted to unreserved URI characters.
pub fn is_valid_room_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
}

/// Path of a room's logical address on the relay, without a leading slash.
pub fn room_path(key: &str) -> String {
    format!("rooms/{key}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_frame_json_shape() {
        let frame = ClientFrame::Publish {
            src: "https://example.com/cat.png".to_string(),
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert_eq!(
            json,
            r#"{"type":"Publish","src":"https://example.com/cat.png"}"#
        );
    }

    #[test]
    fn value_frame_omits_empty_src() {
        let json = serde_json::to_string(&ServerFrame::Value { src: None }).unwrap();
        assert_eq!(json, r#"{"type":"Value"}"#);

        let msg: ServerFrame = serde_json::from_str(r#"{"type":"Value"}"#).unwrap();
        match msg {
            ServerFrame::Value { src } => assert!(src.is_none()),
            _ => panic!("Expected Value frame"),
        }
    }

    #[test]
    fn value_frame_round_trips_src_exactly() {
        let src = "data:image/png;base64,iVBORw0KGgo=";
        let json = serde_json::to_string(&ServerFrame::Value {
            src: Some(src.to_string()),
        })
        .unwrap();
        let back: ServerFrame = serde_json::from_str(&json).unwrap();
        match back {
            ServerFrame::Value { src: Some(s) } => assert_eq!(s, src),
            _ => panic!("Expected non-empty Value frame"),
        }
    }

    #[test]
    fn error_frame_parses() {
        let msg: ServerFrame =
            serde_json::from_str(r#"{"type":"Error","message":"payload too large"}"#).unwrap();
        match msg {
            ServerFrame::Error { message } => assert_eq!(message, "payload too large"),
            _ => panic!("Expected Error frame"),
        }
    }

    #[test]
    fn room_key_characters() {
        assert!(is_valid_room_key("ab3z"));
        assert!(is_valid_room_key("my-room_2.x~"));
        assert!(!is_valid_room_key(""));
        assert!(!is_valid_room_key("a room"));
        assert!(!is_valid_room_key("a/b"));
        assert!(!is_valid_room_key("a#b"));
    }

    #[test]
    fn room_path_shape() {
        assert_eq!(room_path("q7x2"), "rooms/q7x2");
    }
}
