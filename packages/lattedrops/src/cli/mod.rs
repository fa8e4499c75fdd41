//! `drops` subcommands.

pub mod share;
pub mod term;
pub mod watch;

use std::sync::Arc;

use lattedrops::App;
use lattedrops::dispatch::Limits;
use lattedrops::transport::RelayTransport;

use term::{TermLocation, TermSurface, TermTitlebar};

/// Assemble an app wired to the relay with terminal collaborators.
pub fn build_app(
    relay_url: &str,
    room: Option<&str>,
    limits: Limits,
    save_dir: Option<std::path::PathBuf>,
) -> anyhow::Result<App<RelayTransport>> {
    if let Some(room) = room {
        // Validate before it ever reaches the location fragment.
        lattedrops::RoomKey::parse(room)?;
    }

    let ui = Arc::new(TermSurface::new(save_dir));
    let titlebar = Arc::new(TermTitlebar::new("drops"));
    let location = Arc::new(TermLocation::new(relay_url));
    if let Some(room) = room {
        use lattedrops::ui::Location as _;
        location.set_fragment(room);
    }

    Ok(App::new(
        RelayTransport::new(relay_url),
        ui,
        titlebar,
        location,
        limits,
    ))
}
