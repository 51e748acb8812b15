//! Color palette and style constants for the smartsort TUI.

use ratatui::style::{Color, Modifier, Style};

use sort_proto::bucket::{category_color, Bucket};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(18, 18, 18);
pub const C_ACCENT: Color = Color::Rgb(255, 95, 95);
pub const C_ONLINE: Color = Color::Rgb(80, 200, 120);
pub const C_PENDING: Color = Color::Rgb(255, 184, 80);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_SEPARATOR: Color = Color::Rgb(40, 40, 52);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SELECTION_BG: Color = Color::Rgb(28, 28, 40);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 40, 52);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(120, 100, 200);
pub const C_NUMBER_HINT: Color = Color::Rgb(90, 90, 115);
pub const C_INPUT_BG: Color = Color::Rgb(20, 20, 32);
pub const C_INPUT_FG: Color = Color::Rgb(255, 200, 80);
pub const C_POPUP_BG: Color = Color::Rgb(18, 18, 26);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(80, 200, 120);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);
pub const C_MARKED: Color = Color::Rgb(255, 210, 50);
pub const C_OVERRIDE: Color = Color::Rgb(180, 120, 220);

// Bucket colours used on the live result card.
pub const C_RECYCLE: Color = Color::Rgb(52, 152, 219);
pub const C_ORGANIC: Color = Color::Rgb(39, 174, 96);
pub const C_WASTE: Color = Color::Rgb(127, 140, 141);

pub fn bucket_color(bucket: Bucket) -> Color {
    match bucket {
        Bucket::Recycle => C_RECYCLE,
        Bucket::Organic => C_ORGANIC,
        Bucket::Waste => C_WASTE,
        Bucket::Unknown => C_PENDING,
    }
}

/// Color for a raw classification label in the gallery and chart.
pub fn label_color(classification: &str) -> Color {
    let (r, g, b) = category_color(classification);
    Color::Rgb(r, g, b)
}

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_selected() -> Style {
    Style::default()
        .bg(C_SELECTION_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_input() -> Style {
    Style::default().fg(C_INPUT_FG).bg(C_INPUT_BG)
}

pub fn style_heading() -> Style {
    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
}
