//! Title notification.
//!
//! Decorates the title with a filled star while the app has focus and an
//! outline star while it does not, so a delivery arriving in a background
//! tab leaves a visible unread marker. Regaining focus re-decorates, which
//! is what "clears" the marker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ui::Titlebar;

const FOCUSED_MARK: &str = "\u{2605}"; // ★
const UNREAD_MARK: &str = "\u{2606}"; // ☆

pub struct TitleNotifier {
    titlebar: Arc<dyn Titlebar>,
    has_focus: AtomicBool,
}

impl TitleNotifier {
    pub fn new(titlebar: Arc<dyn Titlebar>) -> Self {
        Self {
            titlebar,
            has_focus: AtomicBool::new(true),
        }
    }

    pub fn focus_gained(&self) {
        self.has_focus.store(true, Ordering::Relaxed);
        self.refresh();
    }

    pub fn focus_lost(&self) {
        self.has_focus.store(false, Ordering::Relaxed);
    }

    /// Called on each inbound delivery.
    pub fn notify(&self) {
        self.refresh();
    }

    fn refresh(&self) {
        let current = self.titlebar.title();
        let bare = strip_marks(&current);
        let mark = if self.has_focus.load(Ordering::Relaxed) {
            FOCUSED_MARK
        } else {
            UNREAD_MARK
        };
        let decorated = format!("{mark} {bare} {mark}");
        if decorated != current {
            self.titlebar.set_title(&decorated);
        }
    }
}

fn strip_marks(title: &str) -> &str {
    let title = title
        .strip_prefix("\u{2605} ")
        .or_else(|| title.strip_prefix("\u{2606} "))
        .unwrap_or(title);
    title
        .strip_suffix(" \u{2605}")
        .or_else(|| title.strip_suffix(" \u{2606}"))
        .unwrap_or(title)
}
