//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this for playback state, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use std::sync::Arc;

use mellow_core::catalog::{Catalog, Genre, Track};
use mellow_core::recent::RecentEntry;
use mellow_core::session::SessionState;

use crate::action::Page;
use crate::intent::RenderHint;
use crate::widgets::status_bar::InputMode;

/// The full shared state of the application.
/// Components read this; only the App event-loop writes to it.
pub struct AppState {
    // ── Player core snapshot ────────────────────────────────────────────────
    pub session: SessionState,
    pub recent: Vec<RecentEntry>,
    pub recommendation: Option<Track>,

    // ── Catalog ─────────────────────────────────────────────────────────────
    pub catalog: Arc<Catalog>,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub page: Page,
    pub input_mode: InputMode,

    // ── Session ─────────────────────────────────────────────────────────────
    pub last_nonzero_volume: f32,

    // ── Intent render hints ──────────────────────────────────────────────────
    /// How to render the pause/play icon.
    pub pause_hint: RenderHint,
    /// How to render the volume indicator.
    pub volume_hint: RenderHint,
    /// How to render the current-track indicator.
    pub track_hint: RenderHint,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            session: SessionState::default(),
            recent: Vec::new(),
            recommendation: None,
            catalog,
            page: Page::Home,
            input_mode: InputMode::Normal,
            last_nonzero_volume: 0.7,
            pause_hint: RenderHint::Normal,
            volume_hint: RenderHint::Normal,
            track_hint: RenderHint::Normal,
        }
    }

    /// Convenience: currently playing track name.
    pub fn current_track_name(&self) -> Option<&str> {
        self.session.current_track.as_ref().map(|t| t.name.as_str())
    }

    /// Id of the current track, for list markers.
    pub fn current_track_id(&self) -> Option<&str> {
        self.session.current_track.as_ref().map(|t| t.id.as_str())
    }

    /// Genre shown by a given page, if it is a genre page.
    pub fn page_genre(page: Page) -> Option<Genre> {
        match page {
            Page::Sleeping => Some(Genre::Sleeping),
            Page::Focus => Some(Genre::Focus),
            _ => None,
        }
    }
}
