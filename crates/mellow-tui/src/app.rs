//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - Commands to the player core flow out through the `event_tx` channel.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, warn};

use mellow_core::catalog::{Catalog, Genre};
use mellow_core::session::Command;

use crate::core::{PlayerEvent, SharedSnapshot};
use crate::BroadcastMessage;

use crate::{
    action::{Action, ComponentId, Page},
    app_state::AppState,
    component::Component,
    components::{
        header::Header, help_overlay::HelpOverlay, player_panel::PlayerPanel,
        recent_panel::RecentPanel, track_list::TrackList,
    },
    intent::IntentState,
    pages::PageManager,
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    StateUpdated,
    Toast(String),
    TrackSelected,
}

// ── Pane area tracking ────────────────────────────────────────────────────────

/// Stores the last-drawn layout rects for each focusable pane.
/// Used by `handle_mouse` to do hit-testing without recomputing the layout.
#[derive(Default, Clone, Copy)]
struct PaneAreas {
    header: Rect,
    primary: Rect,
    recent: Rect,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    // ── Shared state (passed read-only to components) ─────────────────────────
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    sleeping_list: TrackList,
    focus_list: TrackList,
    recent_panel: RecentPanel,
    player_panel: PlayerPanel,
    help_overlay: HelpOverlay,

    // ── Pages / layout ────────────────────────────────────────────────────────
    pages: PageManager,

    // ── Player core plumbing ──────────────────────────────────────────────────
    event_tx: mpsc::Sender<PlayerEvent>,
    shared: SharedSnapshot,

    /// Whether to quit on next iteration.
    should_quit: bool,

    /// Last-drawn layout rects — used for mouse hit-testing.
    pane_areas: PaneAreas,

    /// Toast notification manager.
    toast: ToastManager,

    // ── Pending-intent trackers ───────────────────────────────────────────────
    /// Intent tracker for play/pause state (true = playing).
    intent_pause: IntentState<bool>,
    /// Intent tracker for volume (0.0–1.0).
    intent_volume: IntentState<f32>,
    /// Intent tracker for the current track id (None = unknown target).
    intent_track: IntentState<Option<String>>,
}

impl App {
    pub fn new(
        catalog: Arc<Catalog>,
        event_tx: mpsc::Sender<PlayerEvent>,
        shared: SharedSnapshot,
    ) -> Self {
        let state = AppState::new(catalog);
        Self {
            intent_pause: IntentState::new(state.session.is_playing),
            intent_volume: IntentState::new(state.session.volume),
            intent_track: IntentState::new(None),
            state,
            header: Header::new(),
            sleeping_list: TrackList::new(Genre::Sleeping),
            focus_list: TrackList::new(Genre::Focus),
            recent_panel: RecentPanel::new(),
            player_panel: PlayerPanel::new(),
            help_overlay: HelpOverlay::new(),
            pages: PageManager::new(),
            event_tx,
            shared,
            should_quit: false,
            pane_areas: PaneAreas::default(),
            toast: ToastManager::new(),
        }
    }

    pub async fn run(
        mut self,
        mut broadcast_rx: broadcast::Receiver<BroadcastMessage>,
    ) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background task: broadcast receiver (PlayerCore → AppMessage) ─────
        let bc_tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(msg) => {
                        let app_msg = match msg {
                            BroadcastMessage::StateUpdated => AppMessage::StateUpdated,
                            BroadcastMessage::Toast(s) => AppMessage::Toast(s),
                            BroadcastMessage::TrackSelected => AppMessage::TrackSelected,
                        };
                        if bc_tx.send(app_msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("broadcast receiver lagged by {} messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
        });

        // Pull the initial snapshot so the first frame isn't blank.
        self.refresh_snapshot().await;
        self.sleeping_list.sync_catalog(&self.state);
        self.focus_list.sync_catalog(&self.state);
        self.recent_panel.sync_recent(&self.state);

        // ── Periodic timers ───────────────────────────────────────────────────
        // Toast expiry + intent timeout checks: 100ms keeps the pending-icon
        // pulse smooth.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg).await;
                    // Drain any backlog before the next frame.
                    while let Ok(next) = rx.try_recv() {
                        self.handle_message(next).await;
                    }
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    self.toast.tick();
                    self.intent_pause.tick();
                    self.intent_volume.tick();
                    self.intent_track.tick();
                    self.state.pause_hint = self.intent_pause.render_state();
                    self.state.volume_hint = self.intent_volume.render_state();
                    self.state.track_hint = self.intent_track.render_state();
                    needs_redraw = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        let _ = self.event_tx.send(PlayerEvent::Shutdown).await;
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    // ── Message handler ───────────────────────────────────────────────────────

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    let actions = self.handle_key(key);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                }
                Event::Mouse(mouse) => {
                    let actions = self.handle_mouse(mouse);
                    for a in actions {
                        self.dispatch(a).await;
                    }
                }
                Event::Resize(w, h) => {
                    self.dispatch(Action::Resize(w, h)).await;
                }
                _ => {}
            },

            AppMessage::StateUpdated => {
                self.refresh_snapshot().await;
            }

            AppMessage::Toast(msg) => {
                self.toast.error(msg);
            }

            AppMessage::TrackSelected => {
                // A track started playing — bring up the player page, the way
                // tapping a tile opens the detail view.
                self.pages.set_page(Page::Player);
                self.state.page = Page::Player;
            }
        }
    }

    /// Pull the latest snapshot out of the shared slot and fold it into
    /// AppState, confirming any pending intents against observed reality.
    async fn refresh_snapshot(&mut self) {
        let snapshot = self.shared.read().await.clone();

        let prev_track = self.state.current_track_id().map(str::to_string);

        self.state.session = snapshot.session;
        self.state.recent = snapshot.recent;
        self.state.recommendation = snapshot.recommendation;

        if self.state.session.volume > 0.001 {
            self.state.last_nonzero_volume = self.state.session.volume;
        }

        // ── Intent confirmation ───────────────────────────────────────────────
        self.intent_pause.on_confirmed(self.state.session.is_playing);
        self.intent_volume.on_confirmed(self.state.session.volume);
        self.intent_track
            .on_confirmed(self.state.current_track_id().map(str::to_string));
        self.state.pause_hint = self.intent_pause.render_state();
        self.state.volume_hint = self.intent_volume.render_state();
        self.state.track_hint = self.intent_track.render_state();

        self.recent_panel.sync_recent(&self.state);

        // Follow the playing track in the genre lists when it changes
        // (next/prev/shuffle land the highlight on the new row).
        let cur_track = self.state.current_track_id().map(str::to_string);
        if cur_track != prev_track {
            self.sleeping_list.jump_to_current(&self.state);
            self.focus_list.jump_to_current(&self.state);
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        // Global keys — always active regardless of focus/mode
        match key.code {
            KeyCode::Char('q') if key.modifiers == KeyModifiers::NONE => {
                if self.state.input_mode == InputMode::Normal && !self.pages.show_help {
                    return vec![Action::Quit];
                }
            }
            KeyCode::Char('c') if key.modifiers == KeyModifiers::CONTROL => {
                return vec![Action::Quit];
            }
            KeyCode::Char('?') if self.state.input_mode == InputMode::Normal => {
                return vec![Action::ToggleHelp];
            }
            _ => {}
        }

        // Help overlay captures all keys when visible
        if self.pages.show_help {
            let actions = self.help_overlay.handle_key(key, &self.state);
            if !actions.is_empty() {
                return actions;
            }
            // Any other key closes the overlay
            return vec![Action::ToggleHelp];
        }

        // Tab / Shift-Tab always cycle focus (even in filter mode, it closes filter first)
        match key.code {
            KeyCode::Tab => {
                if self.state.input_mode == InputMode::Filter {
                    return vec![Action::CloseFilter, Action::FocusNext];
                }
                return vec![Action::FocusNext];
            }
            KeyCode::BackTab => {
                if self.state.input_mode == InputMode::Filter {
                    return vec![Action::CloseFilter, Action::FocusPrev];
                }
                return vec![Action::FocusPrev];
            }
            _ => {}
        }

        // Global playback + page keys (Normal mode only)
        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char(' ') if self.state.session.current_track.is_some() => {
                    return vec![Action::TogglePause];
                }
                KeyCode::Char('n') => return vec![Action::Next],
                KeyCode::Char('p') => return vec![Action::Prev],
                KeyCode::Char('s') => return vec![Action::ToggleShuffle],
                KeyCode::Char('r') => return vec![Action::ToggleRepeat],
                KeyCode::Char('m') => return vec![Action::Mute],
                // Volume: arrow keys or +/-
                KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
                    let new_vol = (self.state.session.volume + 0.05).min(1.0);
                    return vec![Action::Volume(new_vol)];
                }
                KeyCode::Left | KeyCode::Char('-') => {
                    let new_vol = (self.state.session.volume - 0.05).max(0.0);
                    return vec![Action::Volume(new_vol)];
                }
                // Seek: comma/period nudge the position by 5% of the duration
                KeyCode::Char(',') => {
                    if let Some(f) = self.seek_target(-0.05) {
                        return vec![Action::SeekFraction(f)];
                    }
                }
                KeyCode::Char('.') => {
                    if let Some(f) = self.seek_target(0.05) {
                        return vec![Action::SeekFraction(f)];
                    }
                }
                KeyCode::Char('1') => return vec![Action::SwitchPage(Page::Home)],
                KeyCode::Char('2') => return vec![Action::SwitchPage(Page::Sleeping)],
                KeyCode::Char('3') => return vec![Action::SwitchPage(Page::Focus)],
                KeyCode::Char('4') => return vec![Action::SwitchPage(Page::Player)],
                KeyCode::Char('K') => return vec![Action::ToggleKeys],
                _ => {}
            }
        }

        // Dispatch to the focused component
        let focused = self.pages.focused();
        let s = &self.state;
        match focused {
            Some(ComponentId::SleepingList) => self.sleeping_list.handle_key(key, s),
            Some(ComponentId::FocusList) => self.focus_list.handle_key(key, s),
            Some(ComponentId::RecentPanel) => self.recent_panel.handle_key(key, s),
            Some(ComponentId::PlayerPanel) => self.player_panel.handle_key(key, s),
            Some(ComponentId::Header) | Some(ComponentId::HelpOverlay) | None => vec![],
        }
    }

    /// Current seek position plus `delta`, as a fraction of the duration.
    /// None when the duration is unknown (live edge or still loading).
    fn seek_target(&self, delta: f64) -> Option<f64> {
        let dur = self.state.session.duration_secs?;
        if dur <= 0.0 {
            return None;
        }
        let pos = self.state.session.time_pos_secs.unwrap_or(0.0);
        Some(((pos / dur) + delta).clamp(0.0, 1.0))
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        let is_click = matches!(
            event.kind,
            MouseEventKind::Down(_) | MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click {
            return vec![];
        }

        let col = event.column;
        let row = event.row;

        fn hit(r: Rect, col: u16, row: u16) -> bool {
            r.width > 0
                && r.height > 0
                && col >= r.x
                && col < r.x + r.width
                && row >= r.y
                && row < r.y + r.height
        }

        let areas = self.pane_areas;
        let s = &self.state;

        if hit(areas.header, col, row) {
            return self.header.handle_mouse(event, areas.header, s);
        }

        if hit(areas.primary, col, row) {
            let (id, actions) = match self.state.page {
                Page::Sleeping => (
                    ComponentId::SleepingList,
                    self.sleeping_list.handle_mouse(event, areas.primary, s),
                ),
                Page::Focus => (
                    ComponentId::FocusList,
                    self.focus_list.handle_mouse(event, areas.primary, s),
                ),
                Page::Player => (
                    ComponentId::PlayerPanel,
                    self.player_panel.handle_mouse(event, areas.primary, s),
                ),
                Page::Home => (
                    ComponentId::RecentPanel,
                    self.recent_panel.handle_mouse(event, areas.primary, s),
                ),
            };
            let mut actions = actions;
            if self.pages.focused() != Some(id) {
                actions.insert(0, Action::FocusPane(id));
            }
            return actions;
        }

        if hit(areas.recent, col, row) {
            let mut actions = self.recent_panel.handle_mouse(event, areas.recent, s);
            if self.pages.focused() != Some(ComponentId::RecentPanel) {
                actions.insert(0, Action::FocusPane(ComponentId::RecentPanel));
            }
            return actions;
        }

        vec![]
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        // Broadcast action to all components first so they can react to e.g.
        // filter changes or page switches even when not focused.
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.sleeping_list.on_action(&action, s));
            out.extend(self.focus_list.on_action(&action, s));
            out.extend(self.recent_panel.on_action(&action, s));
            out.extend(self.player_panel.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action).await;

        // Dispatch any secondary actions (depth-limited to 1 level)
        for a in secondary {
            self.apply_action(a).await;
        }
    }

    async fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            // ── Playback ──────────────────────────────────────────────────────
            Action::Play(id) => {
                self.intent_track.set_intent(Some(id.clone()));
                self.send_cmd(Command::SelectTrack { id }).await;
            }
            Action::TogglePause => {
                if self.state.session.current_track.is_none() {
                    return;
                }
                // Intent: flip the current is_playing state
                let currently_playing = self.state.session.is_playing;
                self.intent_pause.set_intent(!currently_playing);
                self.send_cmd(Command::TogglePlayback).await;
            }
            Action::Next => {
                self.intent_track.set_intent(None); // unknown target
                self.send_cmd(Command::Next).await;
            }
            Action::Prev => {
                self.intent_track.set_intent(None); // unknown target
                self.send_cmd(Command::Prev).await;
            }
            Action::ToggleShuffle => {
                let on = !self.state.session.shuffle;
                self.toast
                    .info(if on { "shuffle on" } else { "shuffle off" });
                self.send_cmd(Command::SetShuffle { on }).await;
            }
            Action::ToggleRepeat => {
                let on = !self.state.session.repeat;
                self.toast.info(if on { "repeat on" } else { "repeat off" });
                self.send_cmd(Command::SetRepeat { on }).await;
            }
            Action::Volume(v) => {
                let v = v.clamp(0.0, 1.0);
                if v > 0.001 {
                    self.state.last_nonzero_volume = v;
                }
                self.intent_volume.set_intent(v);
                self.send_cmd(Command::Volume { value: v }).await;
            }
            Action::SeekFraction(fraction) => {
                self.send_cmd(Command::Seek {
                    fraction: fraction.clamp(0.0, 1.0),
                })
                .await;
            }
            Action::Mute => {
                let current = self.state.session.volume;
                let new_vol = if current < 0.01 {
                    self.state.last_nonzero_volume.max(0.1)
                } else {
                    0.0
                };
                self.intent_volume.set_intent(new_vol);
                self.send_cmd(Command::Volume { value: new_vol }).await;
            }

            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.pages.focus_next();
            }
            Action::FocusPrev => {
                self.pages.focus_prev();
            }
            Action::FocusPane(id) => {
                self.pages.focus_set(id);
            }

            // ── Filter ────────────────────────────────────────────────────────
            Action::OpenFilter => {
                self.state.input_mode = InputMode::Filter;
            }
            Action::CloseFilter => {
                self.state.input_mode = InputMode::Normal;
            }

            // ── Pages ─────────────────────────────────────────────────────────
            Action::SwitchPage(page) => {
                self.pages.set_page(page);
                self.state.page = page;
                self.state.input_mode = InputMode::Normal;
            }

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleHelp => {
                self.pages.show_help = !self.pages.show_help;
            }
            Action::ToggleKeys => {
                self.pages.show_keys_bar = !self.pages.show_keys_bar;
            }

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => {
                self.should_quit = true;
            }

            // The layout picks up the new size on the next frame.
            Action::Resize(_, _) => {}
        }
    }

    async fn send_cmd(&mut self, cmd: Command) {
        if let Err(e) = self.event_tx.send(PlayerEvent::Command(cmd)).await {
            error!("player core channel closed: {}", e);
            self.toast.error("player core is gone — restart the app");
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        use crate::theme::C_BG;
        use ratatui::widgets::Block;
        let area = frame.area();

        // Fill the entire terminal with the base background colour so that
        // any unstyled cells appear consistent with the panes.
        frame.render_widget(
            Block::default().style(ratatui::style::Style::default().bg(C_BG)),
            area,
        );

        // ── Outer layout: header | body | (statusbar) ─────────────────────────
        let header_h = 2u16;
        let status_h = if self.pages.show_keys_bar { 1u16 } else { 0 };

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_h),
                Constraint::Min(0),
                Constraint::Length(status_h),
            ])
            .split(area);

        let header_area = outer[0];
        let body_area = outer[1];
        let status_area = outer[2];

        self.header.draw(frame, header_area, false, &self.state);
        self.pane_areas.header = header_area;

        if self.pages.show_keys_bar {
            status_bar::draw_keys_bar(frame, status_area, self.state.input_mode, self.state.page);
        }

        // ── Body layout depends on page ───────────────────────────────────────
        match self.state.page {
            Page::Home => {
                let focused = self.pages.focused() == Some(ComponentId::RecentPanel);
                self.recent_panel.draw(frame, body_area, focused, &self.state);
                self.pane_areas.primary = body_area;
                self.pane_areas.recent = Rect::default();
            }
            Page::Sleeping | Page::Focus | Page::Player => {
                // Recent strip pinned under the page's main pane.
                let recent_h = (self.state.recent.len() as u16 + 2).clamp(3, 8);
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(recent_h)])
                    .split(body_area);

                let (id, component): (ComponentId, &mut dyn Component) = match self.state.page {
                    Page::Sleeping => (ComponentId::SleepingList, &mut self.sleeping_list),
                    Page::Focus => (ComponentId::FocusList, &mut self.focus_list),
                    _ => (ComponentId::PlayerPanel, &mut self.player_panel),
                };
                let primary_focused = self.pages.focused() == Some(id);
                component.draw(frame, rows[0], primary_focused, &self.state);
                self.pane_areas.primary = rows[0];

                let recent_focused = self.pages.focused() == Some(ComponentId::RecentPanel);
                self.recent_panel
                    .draw(frame, rows[1], recent_focused, &self.state);
                self.pane_areas.recent = rows[1];
            }
        }

        // ── Help overlay (on top of everything) ───────────────────────────────
        if self.pages.show_help {
            self.help_overlay.visible = true;
            self.help_overlay.draw(frame, area, false, &self.state);
        } else {
            self.help_overlay.visible = false;
        }

        // ── Toast notifications (topmost layer) ───────────────────────────────
        self.toast.draw(frame, area);
    }
}
