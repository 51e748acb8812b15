//! Status bar: bottom rows with backend state, mode, and keybindings.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Workspace;
use crate::theme::{C_ACCENT, C_MARKED, C_MUTED, C_ONLINE, C_OVERRIDE, C_SECONDARY, C_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Override picker open on the result card.
    Override,
    /// Edit dialog has the keyboard.
    Edit,
    /// Waiting for y/n on a destructive action.
    Confirm,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Override => "OVERRIDE",
            Self::Edit => "EDIT",
            Self::Confirm => "CONFIRM",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_SECONDARY,
            Self::Override => C_OVERRIDE,
            Self::Edit => C_MARKED,
            Self::Confirm => C_ACCENT,
        }
    }
}

/// Last log line with a backend dot in front.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, backend_active: bool) {
    let dot = if backend_active {
        Span::styled("●", Style::default().fg(C_ONLINE))
    } else {
        Span::styled("○", Style::default().fg(C_ACCENT))
    };
    let line = Line::from(vec![
        dot,
        Span::raw(" "),
        Span::styled(last_log.unwrap_or(""), Style::default().fg(C_SECONDARY)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn draw_separator(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(
        "─".repeat(area.width as usize),
        Style::default().fg(C_SEPARATOR),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Keybinding footer.  In confirm mode `prompt` replaces the key list.
pub fn draw_keys_bar(
    frame: &mut Frame,
    area: Rect,
    mode: InputMode,
    workspace: Workspace,
    bulk_mode: bool,
    prompt: Option<&str>,
) {
    let label = match mode {
        InputMode::Normal => workspace.label(),
        other => other.label(),
    };
    let mut spans = vec![Span::styled(
        format!(" {} ", label),
        Style::default()
            .fg(mode.color())
            .add_modifier(Modifier::BOLD),
    )];

    let keys = match (mode, workspace) {
        (InputMode::Confirm, _) => {
            spans.push(Span::styled(
                format!(" {} ", prompt.unwrap_or("Are you sure?")),
                Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
            ));
            " y confirm  n/Esc cancel"
        }
        (InputMode::Override, _) => " r recycle  o organic  w waste  Esc cancel",
        (InputMode::Edit, _) => " ↑↓ category  Tab field  Enter save  Esc cancel",
        (InputMode::Normal, Workspace::Live) => {
            " r/o/w guess recycle/organic/waste  m override result  Tab/1-2 workspace  K keys  ? help  q quit"
        }
        (InputMode::Normal, Workspace::Gallery) if bulk_mode => {
            " ↑↓/jk move  Space mark  a mark all  D delete marked  b leave bulk  R refresh  ? help  q quit"
        }
        (InputMode::Normal, Workspace::Gallery) => {
            " ↑↓/jk move  e edit  d delete  y copy path  v view  b bulk  R refresh  Tab/1-2 workspace  ? help  q quit"
        }
    };
    spans.push(Span::styled(keys, Style::default().fg(C_MUTED)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
