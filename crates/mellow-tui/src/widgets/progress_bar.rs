//! Smooth Unicode progress and volume bars.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_ACCENT, C_MUTED, C_PLAYING, C_SECONDARY};

// Unicode smooth fill: 8 eighths per cell
const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

fn smooth_bar(progress: f64, width: usize) -> String {
    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width + 4);
    for _ in 0..full_blocks {
        bar.push('█');
    }
    if full_blocks < width {
        bar.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            bar.push(' ');
        }
    }
    bar
}

/// Render a smooth playback progress bar in `area`.
/// `progress` is 0.0..=1.0. `time_pos` and `duration` are optional display values.
pub fn draw_progress(
    frame: &mut Frame,
    area: Rect,
    progress: f64,
    time_pos: Option<f64>,
    duration: Option<f64>,
) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    // Time labels
    let left_label = time_pos.map(fmt_time).unwrap_or_default();
    let right_label = duration.map(fmt_time).unwrap_or_default();
    let label_w = (left_label.len() + right_label.len() + 1) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;

    let bar = smooth_bar(progress, bar_w);

    let mut spans = Vec::new();
    if !left_label.is_empty() {
        spans.push(Span::styled(
            format!("{} ", left_label),
            Style::default().fg(C_SECONDARY),
        ));
    }
    spans.push(Span::styled(bar, Style::default().fg(C_PLAYING)));
    if !right_label.is_empty() {
        spans.push(Span::styled(
            format!(" {}", right_label),
            Style::default().fg(C_MUTED),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the volume bar with a percent label, tinted by `color`
/// (the caller dims it while a volume change is pending).
pub fn draw_volume(frame: &mut Frame, area: Rect, volume: f32, color: Option<Color>) {
    if area.width < 8 || area.height == 0 {
        return;
    }

    let label = format!("{:3.0}%", volume.clamp(0.0, 1.0) * 100.0);
    let bar_w = area.width.saturating_sub(label.len() as u16 + 4).max(4) as usize;
    let bar = smooth_bar(volume as f64, bar_w);

    let spans = vec![
        Span::styled("vol ", Style::default().fg(C_SECONDARY)),
        Span::styled(bar, Style::default().fg(color.unwrap_or(C_ACCENT))),
        Span::styled(format!(" {}", label), Style::default().fg(C_MUTED)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn fmt_time(secs: f64) -> String {
    if secs < 0.0 {
        return "0:00".to_string();
    }
    let s = secs as u64;
    let h = s / 3600;
    let m = (s % 3600) / 60;
    let s = s % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_time() {
        assert_eq!(fmt_time(-1.0), "0:00");
        assert_eq!(fmt_time(65.0), "1:05");
        assert_eq!(fmt_time(3661.0), "1:01:01");
    }

    #[test]
    fn test_smooth_bar_width() {
        assert_eq!(smooth_bar(0.0, 10).chars().count(), 10);
        assert_eq!(smooth_bar(0.5, 10).chars().count(), 10);
        assert_eq!(smooth_bar(1.0, 10), "██████████");
    }
}
