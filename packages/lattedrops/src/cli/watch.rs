//! `drops watch` — join a room and render whatever arrives.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use lattedrops::dispatch::Limits;

pub async fn run(
    relay_url: &str,
    room: Option<&str>,
    limits: Limits,
    save_dir: Option<PathBuf>,
) -> Result<()> {
    let Some(room) = room else {
        bail!("watch needs a room: pass --room KEY");
    };

    let app = super::build_app(relay_url, Some(room), limits, save_dir)?;
    app.start().await.context("could not join room")?;

    println!("watching room {room} (ctrl-c to stop)");

    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl+C handler")?;
    println!();
    Ok(())
}
