//! Smooth Unicode fill bar for confidence and countdown displays.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MUTED, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render `fraction` (0.0..=1.0) as a bar, followed by `label` on the right.
pub fn draw_meter(frame: &mut Frame, area: Rect, fraction: f64, label: &str, color: Color) {
    if area.width < 4 || area.height == 0 {
        return;
    }
    let label_w = if label.is_empty() {
        0
    } else {
        label.chars().count() as u16 + 1
    };
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;

    let spans = vec![
        Span::styled(fill(fraction, bar_w), Style::default().fg(color)),
        Span::styled(
            if label.is_empty() {
                String::new()
            } else {
                format!(" {}", label)
            },
            Style::default().fg(C_SECONDARY),
        ),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Empty track for phases without a value.
pub fn draw_track(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(Span::styled(
            "·".repeat(area.width as usize),
            Style::default().fg(C_MUTED),
        )),
        area,
    );
}

fn fill(fraction: f64, width: usize) -> String {
    let eighths = (fraction.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full = eighths / 8;
    let mut bar = "█".repeat(full);
    if full < width {
        bar.push(BLOCKS[eighths % 8]);
        bar.push_str(&" ".repeat(width - full - 1));
    }
    bar
}
