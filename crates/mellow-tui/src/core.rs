/// PlayerCore — single-owner event loop for all mutable playback state.
///
/// Runs embedded in the TUI process.  All tasks that need to mutate playback
/// state send `PlayerEvent` messages to this loop.  PlayerCore owns the
/// `SessionState`, the `RecentList` and the `MpvDriver` exclusively; no other
/// task touches them.
///
/// After each event that mutates state, PlayerCore copies a fresh
/// `PlayerSnapshot` into the shared slot and broadcasts a
/// `BroadcastMessage::StateUpdated` to all listeners.
///
/// mpv integration is **property-observation-driven**: on every fresh
/// connection we send `observe_property` for core-idle, pause, time-pos and
/// duration.  mpv pushes a `property-change` event whenever any of those
/// values change; those pushes are the only thing that moves the session
/// between Playing and Paused.  The 10-second heartbeat tick only checks
/// process liveness and the loading timeout.
use std::path::Path;
use std::sync::Arc;

use mellow_core::catalog::{Catalog, Track};
use mellow_core::config::Config;
use mellow_core::recent::{RecentEntry, RecentList};
use mellow_core::recommend::recommend;
use mellow_core::session::{Command, Direction, EndedAction, PlaybackStatus, SessionState};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::mpv::{MpvDriver, MpvEvent, MpvHandle, OBS_CORE_IDLE, OBS_DURATION, OBS_PAUSE, OBS_TIME_POS};
use crate::BroadcastMessage;

/// Seconds to wait for audio before declaring a load failed.
const LOADING_TIMEOUT_SECS: u64 = 15;

// ── PlayerEvent ───────────────────────────────────────────────────────────────

/// All inputs into the PlayerCore loop.
#[derive(Debug)]
pub enum PlayerEvent {
    /// A command from the TUI.
    Command(Command),
    /// Heartbeat — check process liveness.
    HeartbeatTick,
    /// Raw mpv unsolicited event (forwarded from reader task).
    MpvEvent(MpvEvent),
    /// Shutdown requested.
    Shutdown,
}

/// Read-only copy of everything the UI renders.  Refreshed by PlayerCore
/// after each mutation; the TUI fetches it on every StateUpdated broadcast.
#[derive(Debug, Clone, Default)]
pub struct PlayerSnapshot {
    pub session: SessionState,
    pub recent: Vec<RecentEntry>,
    pub recommendation: Option<Track>,
}

pub type SharedSnapshot = Arc<RwLock<PlayerSnapshot>>;

/// What an mpv `end-file` reason means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndFileOutcome {
    /// Natural end of the file: repeat restarts it, otherwise advance.
    Finished,
    /// The file could not be played to completion.
    Failed,
    /// A new load or explicit stop interrupted playback; nothing to do.
    Interrupted,
}

fn classify_end_file(reason: &str) -> EndFileOutcome {
    match reason {
        "eof" => EndFileOutcome::Finished,
        "error" | "network" | "quit" => EndFileOutcome::Failed,
        _ => EndFileOutcome::Interrupted,
    }
}

// ── PlayerCore ────────────────────────────────────────────────────────────────

pub struct PlayerCore {
    config: Config,
    catalog: Arc<Catalog>,
    session: SessionState,
    recent: RecentList,
    recommendation: Option<Track>,
    shared: SharedSnapshot,
    mpv_driver: MpvDriver,
    /// Live handle to the mpv IO tasks.  `None` when mpv is not yet connected.
    mpv_handle: Option<MpvHandle>,
    /// Channel to forward mpv events back into our own event loop.
    event_tx: mpsc::Sender<PlayerEvent>,
    broadcast_tx: broadcast::Sender<BroadcastMessage>,
    /// Observed property values from mpv push events.
    obs_core_idle: Option<bool>,
    obs_pause: bool,
    /// When the current load started (to detect a stuck load).
    loading_since: Option<tokio::time::Instant>,
}

impl PlayerCore {
    pub fn new(
        config: Config,
        catalog: Arc<Catalog>,
        broadcast_tx: broadcast::Sender<BroadcastMessage>,
        event_tx: mpsc::Sender<PlayerEvent>,
    ) -> Self {
        let session = SessionState::new(config.player.default_volume);
        let recent = RecentList::load(mellow_core::platform::recent_file());
        let mpv_driver = MpvDriver::new(session.volume);

        let shared = Arc::new(RwLock::new(PlayerSnapshot {
            session: session.clone(),
            recent: recent.entries().to_vec(),
            recommendation: None,
        }));

        Self {
            config,
            catalog,
            session,
            recent,
            recommendation: None,
            shared,
            mpv_driver,
            mpv_handle: None,
            event_tx,
            broadcast_tx,
            obs_core_idle: None,
            obs_pause: false,
            loading_since: None,
        }
    }

    /// Shared snapshot slot, for the TUI to read from.
    pub fn snapshot(&self) -> SharedSnapshot {
        Arc::clone(&self.shared)
    }

    /// Run the core event loop.  Returns when a `Shutdown` event is received
    /// or the event channel is closed (TUI exited).
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<PlayerEvent>) -> anyhow::Result<()> {
        info!("PlayerCore: starting event loop");

        // Kick off the heartbeat ticker — used for process liveness checks.
        let heartbeat_tx = self.event_tx.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(10)).await;
                if heartbeat_tx.send(PlayerEvent::HeartbeatTick).await.is_err() {
                    break;
                }
            }
        });

        loop {
            let evt = event_rx.recv().await;
            match evt {
                None => {
                    info!("PlayerCore: event channel closed, shutting down");
                    break;
                }

                Some(PlayerEvent::Shutdown) => {
                    info!("PlayerCore: shutdown requested");
                    break;
                }

                Some(PlayerEvent::Command(cmd)) => {
                    info!("PlayerCore: command {:?}", cmd);
                    if let Err(e) = self.handle_command(cmd).await {
                        error!("PlayerCore: command error: {}", e);
                    }
                }

                Some(PlayerEvent::MpvEvent(evt)) => {
                    self.handle_mpv_event(evt).await;
                }

                Some(PlayerEvent::HeartbeatTick) => {
                    self.heartbeat().await;
                }
            }
        }

        self.cleanup().await;
        Ok(())
    }

    // ── snapshot publishing ───────────────────────────────────────────────────

    async fn publish(&self) {
        {
            let mut slot = self.shared.write().await;
            slot.session = self.session.clone();
            slot.recent = self.recent.entries().to_vec();
            slot.recommendation = self.recommendation.clone();
        }
        let _ = self.broadcast_tx.send(BroadcastMessage::StateUpdated);
    }

    fn toast(&self, message: String) {
        let _ = self.broadcast_tx.send(BroadcastMessage::Toast(message));
    }

    // ── command handlers ──────────────────────────────────────────────────────

    async fn handle_command(&mut self, cmd: Command) -> anyhow::Result<()> {
        match cmd {
            Command::SelectTrack { id } => {
                // Unknown ids are ignored; lists only ever offer catalog tracks.
                if let Some(track) = self.catalog.find(&id).cloned() {
                    self.play_track(track).await?;
                } else {
                    debug!("PlayerCore: unknown track id '{}'", id);
                }
            }
            Command::TogglePlayback => self.toggle_playback().await?,
            Command::Next => self.advance(Direction::Next).await?,
            Command::Prev => self.advance(Direction::Previous).await?,
            Command::SetShuffle { on } => {
                self.session.set_shuffle(on);
                self.publish().await;
            }
            Command::SetRepeat { on } => {
                self.session.set_repeat(on);
                self.publish().await;
            }
            Command::Seek { fraction } => self.seek(fraction).await?,
            Command::Volume { value } => self.set_volume(value).await?,
        }
        Ok(())
    }

    /// The single entry point for changing what plays.
    async fn play_track(&mut self, track: Track) -> anyhow::Result<()> {
        info!("Playing track: {} ({})", track.name, track.id);

        self.session.select(&self.catalog, track.clone());
        self.recent.record(track.clone());
        self.recommendation = recommend(&self.catalog, &track);

        self.obs_core_idle = None;
        self.loading_since = Some(tokio::time::Instant::now());
        self.publish().await;
        let _ = self.broadcast_tx.send(BroadcastMessage::TrackSelected);

        self.load_current(&track).await;
        Ok(())
    }

    /// Issue the mpv loadfile for `track`; marks the session Error when the
    /// load cannot even be issued.
    async fn load_current(&mut self, track: &Track) {
        let path = self.resolve_file(&track.file);
        let volume = self.session.volume;
        match self.ensure_mpv_handle().await {
            Some(handle) => {
                if let Err(e) = handle.load_file(&path, volume).await {
                    warn!("Failed to load '{}': {}", path, e);
                    self.fail_current(&track.name).await;
                }
            }
            None => {
                warn!("No mpv handle available for '{}'", track.name);
                self.fail_current(&track.name).await;
            }
        }
    }

    async fn fail_current(&mut self, name: &str) {
        self.loading_since = None;
        self.session.mark_error();
        self.toast(format!("Track unavailable: {}", name));
        self.publish().await;
    }

    async fn advance(&mut self, direction: Direction) -> anyhow::Result<()> {
        if let Some(target) = self.session.advance_target(&self.catalog, direction) {
            self.play_track(target).await?;
        }
        Ok(())
    }

    async fn toggle_playback(&mut self) -> anyhow::Result<()> {
        if self.session.current_track.is_none() {
            return Ok(());
        }
        if let Some(handle) = self.mpv_handle.as_ref() {
            // Use the locally-observed pause state rather than an IPC round-trip
            // (avoids a 5-second timeout if mpv is buffering).
            handle.set_pause(!self.obs_pause).await?;
        }
        Ok(())
    }

    async fn seek(&mut self, fraction: f64) -> anyhow::Result<()> {
        // No-op until mpv has reported a duration.
        let Some(secs) = self.session.seek_position(fraction) else {
            return Ok(());
        };
        if let Some(handle) = self.mpv_handle.as_ref() {
            handle.seek_to(secs).await?;
        }
        Ok(())
    }

    async fn set_volume(&mut self, value: f32) -> anyhow::Result<()> {
        self.session.set_volume(value);
        self.mpv_driver.last_volume = self.session.volume;
        if let Some(handle) = self.mpv_handle.as_ref() {
            handle.set_volume(self.session.volume).await?;
        }
        self.publish().await;
        Ok(())
    }

    // ── mpv event handler ─────────────────────────────────────────────────────

    async fn handle_mpv_event(&mut self, evt: MpvEvent) {
        if let Some((obs_id, data)) = evt.as_property_change() {
            match obs_id {
                OBS_CORE_IDLE => {
                    let val = data.as_bool();
                    if val != self.obs_core_idle {
                        debug!("mpv: core-idle → {:?}", val);
                        self.obs_core_idle = val;
                        if val == Some(false) {
                            self.loading_since = None;
                        }
                        self.apply_observed().await;
                    }
                }
                OBS_PAUSE => {
                    let val = data.as_bool().unwrap_or(false);
                    if val != self.obs_pause {
                        debug!("mpv: pause → {}", val);
                        self.obs_pause = val;
                        self.apply_observed().await;
                    }
                }
                OBS_TIME_POS => {
                    let val = if data.is_null() { None } else { data.as_f64() };
                    let duration = self.session.duration_secs;
                    self.session.set_timeline(val, duration);
                    self.publish().await;
                }
                OBS_DURATION => {
                    let val = if data.is_null() { None } else { data.as_f64() };
                    if val != self.session.duration_secs {
                        let time_pos = self.session.time_pos_secs;
                        self.session.set_timeline(time_pos, val);
                        self.publish().await;
                    }
                }
                _ => {}
            }
            return;
        }

        match evt.event_name() {
            Some("end-file") => {
                let reason = evt.end_file_reason().unwrap_or("unknown");
                info!("mpv: end-file reason={}", reason);
                self.session.set_timeline(None, None);
                self.obs_core_idle = Some(true);

                match classify_end_file(reason) {
                    EndFileOutcome::Finished => {
                        if let Err(e) = self.handle_track_ended().await {
                            error!("PlayerCore: end-of-track handling failed: {}", e);
                        }
                    }
                    EndFileOutcome::Failed => {
                        let name = self
                            .session
                            .current_track
                            .as_ref()
                            .map(|t| t.name.clone())
                            .unwrap_or_default();
                        warn!("mpv: playback failed for '{}'", name);
                        self.fail_current(&name).await;
                    }
                    EndFileOutcome::Interrupted => {
                        self.publish().await;
                    }
                }
            }
            Some("start-file") => {
                info!("mpv: start-file");
                self.obs_core_idle = Some(true); // will flip to false when audio flows
            }
            Some("file-loaded") => {
                info!("mpv: file-loaded — re-issuing observe_property");
                // Wait 50ms before re-observing so mpv has settled on the new
                // file; mpv then pushes current values immediately.
                if let Some(h) = self.mpv_handle.clone() {
                    tokio::spawn(async move {
                        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                        h.observe_all_properties().await;
                    });
                }
            }
            _ => {}
        }
    }

    /// Natural end of the current track: repeat restarts it, otherwise move on.
    async fn handle_track_ended(&mut self) -> anyhow::Result<()> {
        match self.session.ended_action() {
            EndedAction::Restart => {
                if let Some(track) = self.session.current_track.clone() {
                    info!("Repeat on — restarting '{}'", track.name);
                    self.session.select(&self.catalog, track.clone());
                    self.loading_since = Some(tokio::time::Instant::now());
                    self.publish().await;
                    self.load_current(&track).await;
                }
            }
            EndedAction::Advance => {
                if self
                    .session
                    .advance_target(&self.catalog, Direction::Next)
                    .is_some()
                {
                    self.advance(Direction::Next).await?;
                } else {
                    self.session.mark_idle();
                    self.publish().await;
                }
            }
        }
        Ok(())
    }

    /// Fold the observed pause/core-idle pair into the session status.
    async fn apply_observed(&mut self) {
        self.session
            .set_observed_playback(self.obs_pause, self.obs_core_idle.unwrap_or(true));
        self.publish().await;
    }

    // ── heartbeat ─────────────────────────────────────────────────────────────

    async fn heartbeat(&mut self) {
        // Check process liveness — if mpv died mid-track, surface it.
        if self.mpv_handle.is_some() && !self.mpv_driver.process_alive() {
            warn!("PlayerCore: heartbeat: mpv process died");
            self.mpv_handle = None;
            self.obs_core_idle = None;
            self.obs_pause = false;
            if self.session.playback_status != PlaybackStatus::Idle {
                let name = self
                    .session
                    .current_track
                    .as_ref()
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                self.fail_current(&name).await;
            }
        }

        // A load that never produced audio counts as a failure.
        if self.session.playback_status == PlaybackStatus::Loading {
            if let Some(since) = self.loading_since {
                if since.elapsed().as_secs() >= LOADING_TIMEOUT_SECS {
                    let name = self
                        .session
                        .current_track
                        .as_ref()
                        .map(|t| t.name.clone())
                        .unwrap_or_default();
                    warn!("mpv: no audio after {}s for '{}'", LOADING_TIMEOUT_SECS, name);
                    self.fail_current(&name).await;
                }
            }
        }
    }

    // ── mpv handle management ─────────────────────────────────────────────────

    async fn ensure_mpv_handle(&mut self) -> Option<MpvHandle> {
        if self.mpv_handle.is_some() && !self.mpv_driver.process_alive() {
            warn!("PlayerCore: mpv process died, dropping handle");
            self.mpv_handle = None;
            self.obs_core_idle = None;
            self.obs_pause = false;
        }

        if self.mpv_handle.is_none() {
            // One forwarder task per connection; it exits when the reader does.
            let (event_tx, mut event_rx) = mpsc::channel::<MpvEvent>(64);
            let core_tx = self.event_tx.clone();
            tokio::spawn(async move {
                while let Some(evt) = event_rx.recv().await {
                    if core_tx.send(PlayerEvent::MpvEvent(evt)).await.is_err() {
                        break;
                    }
                }
            });

            let handle = match self.mpv_driver.spawn_and_connect(event_tx).await {
                Ok(h) => h,
                Err(e) => {
                    warn!("PlayerCore: failed to start mpv: {}", e);
                    return None;
                }
            };

            // Register property observations on the fresh handle.
            let h_clone = handle.clone();
            tokio::spawn(async move {
                h_clone.observe_all_properties().await;
            });

            self.mpv_handle = Some(handle);
        }

        self.mpv_handle.clone()
    }

    // ── helpers ───────────────────────────────────────────────────────────────

    fn resolve_file(&self, file: &str) -> String {
        let path = Path::new(file);
        if path.is_absolute() {
            file.to_string()
        } else {
            self.config
                .paths
                .music_dir
                .join(path)
                .to_string_lossy()
                .into_owned()
        }
    }

    async fn cleanup(&mut self) {
        info!("PlayerCore: cleanup — killing mpv");
        if let Some(handle) = self.mpv_handle.take() {
            let _ = handle.stop().await;
        }
        self.mpv_driver.kill().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_file_reason_routing() {
        assert_eq!(classify_end_file("eof"), EndFileOutcome::Finished);
        for reason in ["error", "network", "quit"] {
            assert_eq!(classify_end_file(reason), EndFileOutcome::Failed);
        }
        // Interruptions by a new load or explicit stop leave the session alone.
        for reason in ["stop", "redirect", "unknown"] {
            assert_eq!(classify_end_file(reason), EndFileOutcome::Interrupted);
        }
    }

    #[test]
    fn test_finished_track_respects_repeat() {
        let mut session = SessionState::new(0.7);
        assert_eq!(classify_end_file("eof"), EndFileOutcome::Finished);

        session.set_repeat(true);
        assert_eq!(session.ended_action(), EndedAction::Restart);
        session.set_repeat(false);
        assert_eq!(session.ended_action(), EndedAction::Advance);
    }
}
