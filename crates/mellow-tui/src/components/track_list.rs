//! TrackList component — per-genre track picker on the Sleep and Focus pages.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use mellow_core::catalog::{Genre, Track};
use mellow_core::session::PlaybackStatus;
use std::time::Instant;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    intent::RenderHint,
    theme::{C_ACCENT, C_BADGE_PENDING, C_ERROR, C_LOADING, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::{
        filter_input::{FilterAction, FilterInput},
        pane_chrome::pane_chrome,
        scrollable_list::ScrollableList,
    },
};

pub struct TrackList {
    pub genre: Genre,
    pub list: ScrollableList<Track>,
    pub filter_input: FilterInput,
    list_state: ListState,
    /// Track last click (row index, time) for double-click detection.
    last_click: Option<(usize, Instant)>,
}

impl TrackList {
    pub fn new(genre: Genre) -> Self {
        Self {
            genre,
            list: ScrollableList::new(|track: &Track, q: &str| track_matches(track, q)),
            filter_input: FilterInput::new("track name…"),
            list_state: ListState::default(),
            last_click: None,
        }
    }

    /// Update items from the catalog. Track lists are static, but this also
    /// re-applies the current filter after a page switch.
    pub fn sync_catalog(&mut self, state: &AppState) {
        let tracks = state.catalog.tracks(self.genre).to_vec();
        self.list.set_items(tracks);
    }

    pub fn is_filter_active(&self) -> bool {
        self.filter_input.is_active()
    }

    /// Move the selection onto the current track, if it lives in this genre.
    pub fn jump_to_current(&mut self, state: &AppState) {
        if state.session.current_genre != Some(self.genre) {
            return;
        }
        if let Some(id) = state.current_track_id() {
            if let Some(idx) = state.catalog.position(self.genre, id) {
                self.list.set_selected_by_original(idx);
            }
        }
    }

    fn play_selected(&self) -> Vec<Action> {
        match self.list.selected_item() {
            Some(track) => vec![Action::Play(track.id.clone())],
            None => vec![],
        }
    }

    fn render_item<'a>(&self, track: &'a Track, is_selected: bool, state: &AppState) -> ListItem<'a> {
        let is_current = state.current_track_id() == Some(track.id.as_str());

        let (base_icon, base_icon_color): (&'static str, Color) = if is_current {
            match state.session.playback_status {
                PlaybackStatus::Playing => ("▶", C_PLAYING),
                PlaybackStatus::Paused => ("⏸", C_LOADING),
                PlaybackStatus::Loading => ("⋯", C_LOADING),
                PlaybackStatus::Error => ("✗", C_ERROR),
                PlaybackStatus::Idle => ("■", C_MUTED),
            }
        } else {
            (" ", C_MUTED)
        };

        // For the current track row, apply the track_hint overlay
        let (icon, icon_color): (&'static str, Color) = if is_current {
            match state.track_hint {
                RenderHint::PendingHidden => (" ", base_icon_color),
                RenderHint::PendingVisible => (base_icon, C_BADGE_PENDING),
                RenderHint::TimedOut => ("?", C_ERROR),
                RenderHint::Normal => (base_icon, base_icon_color),
            }
        } else {
            (base_icon, base_icon_color)
        };

        let name_color = if is_current {
            match state.session.playback_status {
                PlaybackStatus::Playing => C_PLAYING,
                PlaybackStatus::Paused | PlaybackStatus::Loading => C_LOADING,
                PlaybackStatus::Error => C_ACCENT,
                PlaybackStatus::Idle => C_PRIMARY,
            }
        } else if is_selected {
            C_PRIMARY
        } else {
            C_SECONDARY
        };

        let name_style = if is_current || is_selected {
            Style::default().fg(name_color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(name_color)
        };

        let item_bg = if is_selected {
            Style::default().bg(C_SELECTION_BG)
        } else {
            Style::default()
        };

        let spans: Vec<Span> = vec![
            Span::raw(" "),
            Span::styled(icon, Style::default().fg(icon_color)),
            Span::raw("  "),
            Span::styled(track.name.clone(), name_style),
        ];

        ListItem::new(Line::from(spans)).style(item_bg)
    }
}

fn track_matches(track: &Track, q: &str) -> bool {
    if q.trim().is_empty() {
        return true;
    }
    let name = track.name.to_lowercase();
    q.to_lowercase()
        .split_whitespace()
        .all(|term| name.contains(term))
}

impl Component for TrackList {
    fn id(&self) -> ComponentId {
        match self.genre {
            Genre::Sleeping => ComponentId::SleepingList,
            Genre::Focus => ComponentId::FocusList,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }

        // Filter mode input
        if self.filter_input.is_active() {
            match key.code {
                KeyCode::Up => {
                    self.list.select_up(1);
                    return vec![];
                }
                KeyCode::Down => {
                    self.list.select_down(1);
                    return vec![];
                }
                _ => {}
            }
            return match self.filter_input.handle_key(key) {
                FilterAction::Changed(q) => {
                    self.list.set_filter(&q);
                    vec![]
                }
                FilterAction::Confirmed => vec![Action::CloseFilter],
                FilterAction::Cancelled => {
                    self.list.set_filter("");
                    vec![Action::CloseFilter]
                }
            };
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),

            KeyCode::Enter => return self.play_selected(),
            KeyCode::Char(' ') => {
                if state.session.current_track.is_some() {
                    // Space pauses/resumes whatever is currently playing.
                    return vec![Action::TogglePause];
                }
                // Space when idle plays the selected track.
                return self.play_selected();
            }

            KeyCode::Char('/') => {
                self.filter_input.activate();
                return vec![Action::OpenFilter];
            }

            KeyCode::Char('J') => {
                self.jump_to_current(state);
            }

            _ => {}
        }

        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        let rel_row = event.row.saturating_sub(area.y + 1) as usize; // +1 for border
        match event.kind {
            MouseEventKind::ScrollUp => {
                self.list.select_up(1);
            }
            MouseEventKind::ScrollDown => {
                self.list.select_down(1);
            }
            MouseEventKind::Down(ratatui::crossterm::event::MouseButton::Left) => {
                let now = Instant::now();
                let is_double = self
                    .last_click
                    .map(|(row, t)| row == rel_row && t.elapsed().as_millis() < 400)
                    .unwrap_or(false);

                if self.list.handle_click(rel_row) && is_double {
                    // Double-click: play the track
                    self.last_click = None;
                    return self.play_selected();
                }
                self.last_click = Some((rel_row, now));
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        // Filter mode can be closed from outside (Tab away) — drop the input
        // focus but keep the query applied.
        if let Action::CloseFilter = action {
            self.filter_input.deactivate();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome(self.genre.label(), None, focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.items.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no tracks in this genre yet",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        if self.list.is_empty() && !self.list.filter.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no tracks match filter",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            if self.filter_input.is_active() {
                let filter_area = Rect {
                    y: inner.y + inner.height.saturating_sub(1),
                    height: 1,
                    ..inner
                };
                self.filter_input.draw(frame, filter_area);
            }
            return;
        }

        let content_h = inner.height as usize;
        self.list.ensure_visible(content_h);
        let items_with_idx: Vec<(usize, Track)> = self
            .list
            .visible_items(content_h)
            .into_iter()
            .map(|(i, t)| (i, t.clone()))
            .collect();
        let sel_in_view = self.list.selected_in_view();

        let items: Vec<ListItem> = items_with_idx
            .iter()
            .enumerate()
            .map(|(view_row, (_orig_idx, track))| {
                let is_selected = view_row == sel_in_view;
                self.render_item(track, is_selected, state)
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default())
            .highlight_symbol("");

        self.list_state.select(Some(sel_in_view));
        frame.render_stateful_widget(list, inner, &mut self.list_state);

        // Filter input bar drawn at bottom of inner area if active
        if self.filter_input.is_active() {
            let filter_area = Rect {
                y: inner.y + inner.height.saturating_sub(1),
                height: 1,
                ..inner
            };
            self.filter_input.draw(frame, filter_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, name: &str) -> Track {
        Track {
            id: id.to_string(),
            name: name.to_string(),
            file: format!("sleeping/{}.mp3", name),
            genre: Genre::Sleeping,
        }
    }

    #[test]
    fn test_track_matches_all_terms() {
        let t = track("sleep-5", "Dark Moon");
        assert!(track_matches(&t, "dark"));
        assert!(track_matches(&t, "moon dark"));
        assert!(!track_matches(&t, "dark sun"));
        assert!(track_matches(&t, "  "));
    }
}
