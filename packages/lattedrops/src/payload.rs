//! The transmitted image representation.
//!
//! A payload is a single string in exactly one of two forms: a data-URI
//! carrying base64-encoded raster data, or an absolute HTTP(S) URL pointing
//! at an image. Nothing else crosses the transport.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Acceptance pattern for pasted/extracted URLs: scheme, host with a dot,
/// and at least something after it.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://.+\..+$").expect("Invalid Regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// `data:<media type>;base64,<data>`
    DataUri(String),
    /// Absolute `http://` or `https://` URL.
    Url(String),
}

impl Payload {
    /// Classify an arbitrary src string. Returns `None` for anything that is
    /// neither payload form; callers treat that as an acquisition mismatch,
    /// not an error.
    pub fn parse(src: &str) -> Option<Self> {
        if src.starts_with("data:") {
            Some(Self::DataUri(src.to_string()))
        } else {
            Self::http_url(src)
        }
    }

    /// Accept a piece of text only if it is an absolute HTTP(S) URL.
    /// Unlike [`parse`](Self::parse) this never accepts data-URIs, matching
    /// what a pasted text snippet is allowed to be.
    pub fn http_url(text: &str) -> Option<Self> {
        URL_PATTERN
            .is_match(text)
            .then(|| Self::Url(text.to_string()))
    }

    /// Encode raw image bytes as a base64 data-URI payload.
    pub fn from_image_bytes(media_type: &str, bytes: &[u8]) -> Self {
        Self::DataUri(format!("data:{media_type};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::DataUri(s) | Self::Url(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::DataUri(s) | Self::Url(s) => s,
        }
    }

    pub fn is_data_uri(&self) -> bool {
        matches!(self, Self::DataUri(_))
    }

    /// Media type of a data-URI payload (`image/png` for
    /// `data:image/png;base64,...`); `None` for URL payloads.
    pub fn media_type(&self) -> Option<&str> {
        match self {
            Self::DataUri(s) => {
                let rest = s.strip_prefix("data:")?;
                let end = rest.find([';', ','])?;
                Some(&rest[..end])
            }
            Self::Url(_) => None,
        }
    }

    /// Decode the base64 body of a data-URI payload.
    pub fn decode_data(&self) -> Option<Vec<u8>> {
        match self {
            Self::DataUri(s) => {
                let (_, body) = s.split_once(";base64,")?;
                STANDARD.decode(body).ok()
            }
            Self::Url(_) => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
