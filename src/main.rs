mod content;
mod event;
mod lyrics;
mod media;
mod player;
mod pool;
#[allow(dead_code)]
mod reader;
mod timer;
mod ui;

use crate::event::Intent;
use crate::media::MprisMedia;
use crate::player::Player;
use clap::Parser;
use std::error::Error;
use tokio::sync::mpsc;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Path or URL of the content-version document (JSON)
    source: String,
    /// Select a version by slug when the document holds several
    #[arg(long)]
    slug: Option<String>,
    /// MPRIS service name of the player to drive (first discovered one if omitted)
    #[arg(long)]
    service: Option<String>,
    /// Blocklist for MPRIS player service names (comma-separated, case-insensitive)
    #[arg(long = "block", value_name = "SERVICE1,SERVICE2", value_delimiter = ',')]
    block: Vec<String>,
    /// Pipe the active lyric line to stdout instead of the TUI
    #[arg(long)]
    pipe: bool,
    /// Enable backend debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

/// Stderr belongs to the TUI while raw mode is active, so tracing stays
/// off unless explicitly requested.
fn log_filter(debug_log: bool) -> Option<tracing_subscriber::EnvFilter> {
    if !debug_log {
        return None;
    }
    Some(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("encore=debug")),
    )
}

fn init_tracing(debug_log: bool) {
    if let Some(filter) = log_filter(debug_log) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cfg = Config::parse();
    init_tracing(cfg.debug_log);

    let version = content::load_version(&cfg.source, cfg.slug.as_deref()).await?;
    let playlist = version.playlist();
    if playlist.is_empty() {
        tracing::warn!(slug = %version.slug, "content version has no playable audio");
    }

    let service = match cfg.service.clone() {
        Some(service) => service,
        None => media::mpris::discover_players(&cfg.block)
            .await?
            .into_iter()
            .next()
            .ok_or("no MPRIS player found; pass --service")?,
    };
    tracing::debug!(%service, tracks = playlist.len(), "starting playback loop");

    let media = MprisMedia::new(service);
    let player = Player::new(playlist);
    let (update_tx, update_rx) = mpsc::channel(32);
    let (intent_tx, intent_rx) = mpsc::channel(32);
    tokio::spawn(pool::listen(media, player, intent_rx, update_tx));

    let result = if cfg.pipe {
        // No interactive transport in pipe mode; start playback right away.
        let _ = intent_tx.send(Intent::TogglePlay).await;
        ui::pipe::run(update_rx).await
    } else {
        ui::modern::run(update_rx, intent_tx, version.theme.clone(), version.title.clone()).await
    };

    if let Err(e) = &result {
        eprintln!("Error: {e}");
    }
    result
}
