//! UI collaborator boundaries.
//!
//! The core never touches a rendering surface directly; everything visual
//! goes through these traits, and the embedder (terminal, webview, tests)
//! supplies the implementations.

use std::sync::Arc;

use crate::payload::Payload;

/// The visible widget surface.
pub trait UiSurface: Send + Sync {
    /// Reveal the share-URL affordance.
    fn show_share_panel(&self);
    fn hide_share_panel(&self);
    /// Populate the share-URL field with the current shareable URL.
    fn set_share_url(&self, url: &str);
    /// Replace the image area contents with a rendering of `payload`.
    fn update_image(&self, payload: &Payload);
    /// Toggle the drop target's active visual state.
    fn set_drop_active(&self, active: bool);
}

/// The title bar the notifier decorates.
pub trait Titlebar: Send + Sync {
    fn title(&self) -> String;
    fn set_title(&self, title: &str);
}

/// The navigable location carrying the room key in its fragment.
pub trait Location: Send + Sync {
    fn fragment(&self) -> Option<String>;
    fn set_fragment(&self, fragment: &str);
    /// Full shareable URL, fragment included.
    fn href(&self) -> String;
    /// Full resync: discard in-memory state and start over from the
    /// current fragment.
    fn reload(&self);
}

/// A swappable stylesheet reference.
pub trait Stylesheet: Send + Sync {
    fn swap(&self, from: &str, to: &str);
}

/// Cycles the stylesheet through a fixed list of theme variants.
pub struct ThemeSwitcher {
    sheet: Arc<dyn Stylesheet>,
    themes: Vec<String>,
    current: usize,
}

impl ThemeSwitcher {
    pub fn new(sheet: Arc<dyn Stylesheet>, themes: Vec<String>) -> Self {
        Self {
            sheet,
            themes,
            current: 0,
        }
    }

    /// Advance to the next theme, wrapping at the end.
    pub fn toggle(&mut self) {
        if self.themes.len() < 2 {
            return;
        }
        let from = self.current;
        self.current = (self.current + 1) % self.themes.len();
        self.sheet.swap(&self.themes[from], &self.themes[self.current]);
    }

    pub fn current(&self) -> &str {
        &self.themes[self.current]
    }
}
