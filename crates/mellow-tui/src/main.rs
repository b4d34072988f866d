mod action;
mod app;
mod app_state;
mod component;
mod components;
mod core;
mod intent;
mod mpv;
mod pages;
mod theme;
mod widgets;

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

/// What the PlayerCore broadcasts to the TUI.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    /// The player snapshot has changed; receivers should fetch it from the
    /// shared slot.
    StateUpdated,
    /// A track started loading — the UI opens the player page.
    TrackSelected,
    /// A user-facing message from the core event loop.
    Toast(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = mellow_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("tui.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("mellow log: {}", log_path.display());

    tracing::info!("mellow starting…");

    // ── Load config + catalog ────────────────────────────────────────────────
    let config = mellow_core::config::Config::load().unwrap_or_default();
    let catalog = Arc::new(mellow_core::catalog::load_catalog(&config));

    // ── Broadcast channel (PlayerCore → TUI) ─────────────────────────────────
    let (broadcast_tx, broadcast_rx) = broadcast::channel::<BroadcastMessage>(1024);

    // ── PlayerEvent channel (TUI → PlayerCore) ───────────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<core::PlayerEvent>(1024);

    // ── Build PlayerCore ─────────────────────────────────────────────────────
    let player_core = core::PlayerCore::new(
        config,
        Arc::clone(&catalog),
        broadcast_tx.clone(),
        event_tx.clone(),
    );
    let shared = player_core.snapshot();

    // Push one StateUpdated now so the UI has data before the first command.
    let _ = broadcast_tx.send(BroadcastMessage::StateUpdated);

    // ── Spawn PlayerCore event loop ──────────────────────────────────────────
    tokio::spawn(async move {
        if let Err(e) = player_core.run(event_rx).await {
            tracing::error!("PlayerCore exited with error: {}", e);
        }
    });

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(catalog, event_tx, shared);
    app.run(broadcast_rx).await?;

    Ok(())
}
