//! Status bar — bottom line with input mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Page;
use crate::theme::{C_MODE_NORMAL, C_MUTED};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Filter,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Filter => "FILTER",
        }
    }

    pub fn color(self) -> ratatui::style::Color {
        match self {
            Self::Normal => crate::theme::C_MODE_NORMAL,
            Self::Filter => crate::theme::C_MODE_FILTER,
        }
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, page: Page) {
    let (label, label_color) = match mode {
        InputMode::Filter => (mode.label(), mode.color()),
        InputMode::Normal => (page.title(), C_MODE_NORMAL),
    };

    let keys = match mode {
        InputMode::Normal => match page {
            Page::Home => " 1-4 pages  Enter play  Tab panes  Space pause  n/p next/prev  ? help  q quit",
            Page::Sleeping | Page::Focus => {
                " ↑↓/jk select  Enter play  Space pause  n/p next/prev  s shuffle  r repeat  ←→ vol  / filter  1-4 pages  ? help  q quit"
            }
            Page::Player => {
                " Space pause  n/p next/prev  s shuffle  r repeat  ,/. seek  ←→ vol  m mute  g suggestion  1-4 pages  ? help  q quit"
            }
        },
        InputMode::Filter => " type to filter  Up/Down move  Enter keep  Esc clear+close  Tab next pane",
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(label_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
