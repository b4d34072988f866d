//! RecentPanel component — the recently-played list, shown on every page.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use mellow_core::recent::RecentEntry;
use std::time::Instant;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{genre_color, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::{pane_chrome::pane_chrome, scrollable_list::ScrollableList},
};

pub struct RecentPanel {
    pub list: ScrollableList<RecentEntry>,
    list_state: ListState,
    last_click: Option<(usize, Instant)>,
}

impl RecentPanel {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(|_: &RecentEntry, _: &str| true),
            list_state: ListState::default(),
            last_click: None,
        }
    }

    /// Refresh items from the latest snapshot. The list is capped upstream,
    /// so this is always cheap.
    pub fn sync_recent(&mut self, state: &AppState) {
        self.list.set_items(state.recent.clone());
    }

    fn play_selected(&self) -> Vec<Action> {
        match self.list.selected_item() {
            Some(entry) => vec![Action::Play(entry.track.id.clone())],
            None => vec![],
        }
    }

    fn render_item<'a>(
        &self,
        entry: &'a RecentEntry,
        is_selected: bool,
        state: &AppState,
    ) -> ListItem<'a> {
        let is_current = state.current_track_id() == Some(entry.track.id.as_str());

        let icon = if is_current { "▶" } else { " " };
        let name_color = if is_current {
            C_PLAYING
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
            Span::styled(icon, Style::default().fg(C_PLAYING)),
            Span::raw("  "),
            Span::styled(entry.track.name.clone(), name_style),
            Span::styled(
                format!("  {}", entry.track.genre.label()),
                Style::default().fg(genre_color(entry.track.genre)),
            ),
            Span::styled(
                format!("  {}", fmt_relative(entry.played_at)),
                Style::default().fg(C_MUTED),
            ),
        ];

        ListItem::new(Line::from(spans)).style(item_bg)
    }
}

/// Rough "how long ago" label for a unix timestamp.
fn fmt_relative(played_at: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let delta = (now - played_at).max(0);
    match delta {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", delta / 60),
        3600..=86_399 => format!("{}h ago", delta / 3600),
        _ => format!("{}d ago", delta / 86_400),
    }
}

impl Component for RecentPanel {
    fn id(&self) -> ComponentId {
        ComponentId::RecentPanel
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => return self.play_selected(),
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        let rel_row = event.row.saturating_sub(area.y + 1) as usize;
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(ratatui::crossterm::event::MouseButton::Left) => {
                let now = Instant::now();
                let is_double = self
                    .last_click
                    .map(|(row, t)| row == rel_row && t.elapsed().as_millis() < 400)
                    .unwrap_or(false);
                if self.list.handle_click(rel_row) && is_double {
                    self.last_click = None;
                    return self.play_selected();
                }
                self.last_click = Some((rel_row, now));
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("recently played", None, focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.list.items.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  nothing played yet",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let content_h = inner.height as usize;
        self.list.ensure_visible(content_h);
        let entries: Vec<(usize, RecentEntry)> = self
            .list
            .visible_items(content_h)
            .into_iter()
            .map(|(i, e)| (i, e.clone()))
            .collect();
        let sel_in_view = self.list.selected_in_view();

        let items: Vec<ListItem> = entries
            .iter()
            .enumerate()
            .map(|(view_row, (_idx, entry))| {
                self.render_item(entry, focused && view_row == sel_in_view, state)
            })
            .collect();

        let list = List::new(items)
            .highlight_style(Style::default())
            .highlight_symbol("");

        self.list_state.select(Some(sel_in_view));
        frame.render_stateful_widget(list, inner, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_relative_buckets() {
        let now = chrono::Utc::now().timestamp();
        assert_eq!(fmt_relative(now), "just now");
        assert_eq!(fmt_relative(now - 120), "2m ago");
        assert_eq!(fmt_relative(now - 7200), "2h ago");
        assert_eq!(fmt_relative(now - 2 * 86_400), "2d ago");
    }
}
