//! PlayerPanel component — now-playing detail view on the Player page.
//!
//! Shows track name, playback status, seek bar, volume bar, shuffle/repeat
//! badges and a same-genre suggestion.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use mellow_core::session::PlaybackStatus;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    intent::RenderHint,
    theme::{
        genre_color, C_BADGE_ON, C_BADGE_PENDING, C_ERROR, C_LOADING, C_MUTED, C_PLAYING,
        C_PRIMARY, C_SECONDARY,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        progress_bar::{draw_progress, draw_volume},
    },
};

pub struct PlayerPanel {
    /// Where the seek bar was last drawn, for click-to-seek.
    progress_area: Option<Rect>,
    /// Row of the suggestion line, for click-to-play.
    suggestion_row: Option<u16>,
}

impl PlayerPanel {
    pub fn new() -> Self {
        Self {
            progress_area: None,
            suggestion_row: None,
        }
    }

    fn play_suggestion(&self, state: &AppState) -> Vec<Action> {
        match state.recommendation.as_ref() {
            Some(track) => vec![Action::Play(track.id.clone())],
            None => vec![],
        }
    }
}

fn status_line(state: &AppState) -> (String, Color) {
    match state.session.playback_status {
        PlaybackStatus::Playing => ("playing".to_string(), C_PLAYING),
        PlaybackStatus::Paused => ("paused".to_string(), C_LOADING),
        PlaybackStatus::Loading => ("loading…".to_string(), C_LOADING),
        PlaybackStatus::Error => ("track unavailable".to_string(), C_ERROR),
        PlaybackStatus::Idle => ("stopped".to_string(), C_MUTED),
    }
}

impl Component for PlayerPanel {
    fn id(&self) -> ComponentId {
        ComponentId::PlayerPanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if state.session.current_track.is_some() {
                    return vec![Action::TogglePause];
                }
            }
            KeyCode::Char('g') => return self.play_suggestion(state),
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(ratatui::crossterm::event::MouseButton::Left) => {
                if let Some(bar) = self.progress_area {
                    if event.row == bar.y
                        && event.column >= bar.x
                        && event.column < bar.x + bar.width
                        && bar.width > 0
                    {
                        let fraction =
                            (event.column - bar.x) as f64 / bar.width as f64;
                        return vec![Action::SeekFraction(fraction)];
                    }
                }
                if Some(event.row) == self.suggestion_row {
                    return self.play_suggestion(state);
                }
            }
            MouseEventKind::ScrollUp => {
                return vec![Action::Volume(state.session.volume + 0.05)];
            }
            MouseEventKind::ScrollDown => {
                return vec![Action::Volume(state.session.volume - 0.05)];
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let session = &state.session;

        let badge = match (session.shuffle, session.repeat) {
            (true, true) => Some(Badge { text: "SHUF · RPT", color: C_BADGE_ON }),
            (true, false) => Some(Badge { text: "SHUF", color: C_BADGE_ON }),
            (false, true) => Some(Badge { text: "RPT", color: C_BADGE_ON }),
            (false, false) => None,
        };

        let block = pane_chrome("player", None, focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.progress_area = None;
        self.suggestion_row = None;

        let Some(track) = session.current_track.as_ref() else {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        "  nothing playing",
                        Style::default().fg(C_MUTED),
                    )),
                    Line::from(Span::styled(
                        "  pick a track from the sleep or focus page",
                        Style::default().fg(C_MUTED),
                    )),
                ]),
                inner,
            );
            return;
        };

        let (status_text, status_color) = status_line(state);
        let status_span = match state.pause_hint {
            RenderHint::PendingVisible | RenderHint::PendingHidden => {
                Span::styled(format!("{}…", status_text), Style::default().fg(C_BADGE_PENDING))
            }
            RenderHint::TimedOut => {
                Span::styled("no response from player", Style::default().fg(C_ERROR))
            }
            RenderHint::Normal => Span::styled(status_text, Style::default().fg(status_color)),
        };

        let mut y = inner.y;
        let line_area = |y: u16| Rect { y, height: 1, ..inner };

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    track.name.clone(),
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                ),
            ])),
            line_area(y),
        );
        y += 1;

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(" "),
                Span::styled(track.genre.label(), Style::default().fg(genre_color(track.genre))),
                Span::styled("  ·  ", Style::default().fg(C_MUTED)),
                status_span,
            ])),
            line_area(y),
        );
        y += 2;

        // Seek bar
        if y < inner.y + inner.height {
            let bar_area = Rect {
                x: inner.x + 1,
                width: inner.width.saturating_sub(2),
                ..line_area(y)
            };
            let progress = match (session.time_pos_secs, session.duration_secs) {
                (Some(pos), Some(dur)) if dur > 0.0 => (pos / dur).clamp(0.0, 1.0),
                _ => 0.0,
            };
            draw_progress(
                frame,
                bar_area,
                progress,
                session.time_pos_secs,
                session.duration_secs,
            );
            self.progress_area = Some(bar_area);
            y += 2;
        }

        // Volume bar
        if y < inner.y + inner.height {
            let vol_area = Rect {
                x: inner.x + 1,
                width: inner.width.saturating_sub(2).min(30),
                ..line_area(y)
            };
            let vol_color = match state.volume_hint {
                RenderHint::Normal => None,
                RenderHint::TimedOut => Some(C_ERROR),
                _ => Some(C_BADGE_PENDING),
            };
            draw_volume(frame, vol_area, session.volume, vol_color);
            y += 2;
        }

        // Same-genre suggestion
        if let Some(rec) = state.recommendation.as_ref() {
            if y < inner.y + inner.height {
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::raw(" "),
                        Span::styled("you might like  ", Style::default().fg(C_MUTED)),
                        Span::styled(
                            rec.name.clone(),
                            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled("  (g to play)", Style::default().fg(C_MUTED)),
                    ])),
                    line_area(y),
                );
                self.suggestion_row = Some(y);
            }
        }
    }
}
