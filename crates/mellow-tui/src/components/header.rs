//! Header component — 2-row top bar.
//!
//! Row 1: page tabs (home / sleep / focus / player).
//! Row 2: now-playing line with status icon, track name and volume.
//!
//! Not focusable; draws to a 2-row area.

use ratatui::crossterm::event::{KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use mellow_core::session::PlaybackStatus;

use crate::{
    action::{Action, ComponentId, Page},
    app_state::AppState,
    component::Component,
    intent::RenderHint,
    theme::{
        genre_color, C_ACCENT, C_BADGE_PENDING, C_ERROR, C_LOADING, C_MUTED, C_PLAYING, C_PRIMARY,
        C_SECONDARY,
    },
};

const PAGES: [Page; 4] = [Page::Home, Page::Sleeping, Page::Focus, Page::Player];

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        // Click on a tab switches pages.
        if let MouseEventKind::Down(_) = event.kind {
            if event.row == area.y {
                let mut x = area.x + 1;
                for page in PAGES {
                    let w = page.title().len() as u16 + 4; // "[n] title"
                    if event.column >= x && event.column < x + w {
                        return vec![Action::SwitchPage(page)];
                    }
                    x += w + 2;
                }
            }
        }
        vec![]
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if area.height < 2 {
            frame.render_widget(Clear, area);
            frame.render_widget(Paragraph::new(build_tabs(state)), area);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        frame.render_widget(Clear, rows[0]);
        frame.render_widget(Paragraph::new(build_tabs(state)), rows[0]);

        frame.render_widget(Clear, rows[1]);
        frame.render_widget(Paragraph::new(build_now_playing(state)), rows[1]);
    }
}

// ── Row 1: page tabs ─────────────────────────────────────────────────────────

fn build_tabs(state: &AppState) -> Line<'static> {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, page) in PAGES.into_iter().enumerate() {
        let active = state.page == page;
        let style = if active {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_MUTED)
        };
        spans.push(Span::styled(format!("[{}] ", i + 1), Style::default().fg(C_MUTED)));
        spans.push(Span::styled(page.title().to_string(), style));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

// ── Row 2: now playing ───────────────────────────────────────────────────────

fn build_now_playing(state: &AppState) -> Line<'static> {
    let session = &state.session;

    let Some(track) = session.current_track.as_ref() else {
        return idle_line();
    };

    let (base_icon, base_icon_color): (&str, Color) = match session.playback_status {
        PlaybackStatus::Playing => ("▶", C_PLAYING),
        PlaybackStatus::Paused => ("⏸", C_LOADING),
        PlaybackStatus::Loading => ("◔", C_LOADING),
        PlaybackStatus::Error => ("⛔", C_ACCENT),
        PlaybackStatus::Idle => ("■", C_MUTED),
    };

    let pause_or_track_hint = if state.pause_hint != RenderHint::Normal {
        state.pause_hint
    } else {
        state.track_hint
    };
    let (icon, icon_color) = match pause_or_track_hint {
        RenderHint::PendingHidden => (" ", base_icon_color),
        RenderHint::PendingVisible => (base_icon, C_BADGE_PENDING),
        RenderHint::TimedOut => ("?", C_ERROR),
        RenderHint::Normal => (base_icon, base_icon_color),
    };

    let mut spans: Vec<Span> = vec![
        Span::raw(" "),
        Span::styled(icon.to_string(), Style::default().fg(icon_color)),
        Span::raw(" "),
        Span::styled("♪ ", Style::default().fg(C_MUTED)),
        Span::styled(
            track.name.clone(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", track.genre.label()),
            Style::default().fg(genre_color(track.genre)),
        ),
    ];

    if session.playback_status == PlaybackStatus::Error {
        spans.push(Span::styled(
            "  [unavailable]".to_string(),
            Style::default().fg(C_ERROR),
        ));
    }

    let vol_pct = (session.volume * 100.0).round() as u8;
    let vol_color = match state.volume_hint {
        RenderHint::Normal => C_SECONDARY,
        RenderHint::TimedOut => C_ERROR,
        _ => C_BADGE_PENDING,
    };
    spans.push(Span::styled(
        format!("  vol {}%", vol_pct),
        Style::default().fg(vol_color),
    ));

    Line::from(spans)
}

fn idle_line() -> Line<'static> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled("■  nothing playing", Style::default().fg(C_MUTED)),
    ])
}
