//! Header component: 2-row top bar.
//!
//! Row 1: app title, workspace tabs, backend badge, clock.
//! Row 2: session phase, backend URL, refresh source.
//!
//! Not focusable.

use chrono::Local;
use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId, Workspace},
    app_state::AppState,
    component::Component,
    session::Phase,
    theme::{C_ACCENT, C_MUTED, C_NUMBER_HINT, C_ONLINE, C_PENDING, C_PRIMARY, C_SECONDARY},
};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }

    fn tab<'a>(key: char, ws: Workspace, active: Workspace) -> Vec<Span<'a>> {
        let style = if ws == active {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(C_MUTED)
        };
        vec![
            Span::styled(format!("[{}]", key), Style::default().fg(C_NUMBER_HINT)),
            Span::styled(format!(" {} ", ws.label().to_lowercase()), style),
        ]
    }
}

impl Component for Header {
    fn id(&self) -> ComponentId {
        ComponentId::Header
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        // ── Row 1 ─────────────────────────────────────────────────────────────
        let (badge, badge_color) = if state.backend_active() {
            ("● ONLINE", C_ONLINE)
        } else {
            ("○ WAITING", C_ACCENT)
        };
        let clock = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let mut left = vec![Span::styled(
            " smartsort  ",
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        )];
        left.extend(Self::tab('1', Workspace::Live, state.workspace));
        left.extend(Self::tab('2', Workspace::Gallery, state.workspace));

        let right = vec![
            Span::styled(
                badge,
                Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  {} ", clock), Style::default().fg(C_SECONDARY)),
        ];
        let right_w: u16 = right.iter().map(|s| s.width() as u16).sum();
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(right_w)])
            .split(rows[0]);
        frame.render_widget(Paragraph::new(Line::from(left)), cols[0]);
        frame.render_widget(Paragraph::new(Line::from(right)), cols[1]);

        // ── Row 2 ─────────────────────────────────────────────────────────────
        if rows[1].height == 0 {
            return;
        }
        let phase = state.session.phase();
        let phase_color = match phase {
            Phase::Waiting => C_ACCENT,
            Phase::Ready => C_ONLINE,
            _ => C_PENDING,
        };
        let line = Line::from(vec![
            Span::raw(" "),
            Span::styled(
                phase.label(),
                Style::default().fg(phase_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  backend ", Style::default().fg(C_MUTED)),
            Span::styled(state.backend_url.as_str(), Style::default().fg(C_SECONDARY)),
            Span::styled("  refresh ", Style::default().fg(C_MUTED)),
            Span::styled(state.refresh_source, Style::default().fg(C_SECONDARY)),
        ]);
        frame.render_widget(Paragraph::new(line), rows[1]);
    }
}
