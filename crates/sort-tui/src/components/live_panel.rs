//! LivePanel: the scan / guess / reveal card of the Live workspace.
//!
//! Shows whatever the session phase calls for: the waiting notice, the
//! processing spinner, the guess countdown, the guess verdict, the final
//! result with its confidence bar, and the override picker.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use sort_proto::bucket::{simplify, Bucket};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    session::Phase,
    theme::{
        bucket_color, style_heading, style_muted, style_secondary, C_ACCENT, C_MUTED, C_ONLINE,
        C_OVERRIDE, C_PENDING, C_PRIMARY,
    },
    widgets::{
        meter::{draw_meter, draw_track},
        pane_chrome::{pane_chrome, Badge},
    },
};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn bucket_for_key(code: KeyCode) -> Option<Bucket> {
    match code {
        KeyCode::Char('r') => Some(Bucket::Recycle),
        KeyCode::Char('o') => Some(Bucket::Organic),
        KeyCode::Char('w') => Some(Bucket::Waste),
        _ => None,
    }
}

pub struct LivePanel {
    pub override_open: bool,
    spinner_frame: usize,
}

impl LivePanel {
    pub fn new() -> Self {
        Self {
            override_open: false,
            spinner_frame: 0,
        }
    }

    fn choice_line<'a>(title: &'a str) -> Vec<Line<'a>> {
        let mut spans = vec![Span::styled(title, style_secondary())];
        for bucket in Bucket::GUESSABLE {
            let key = bucket.label().chars().next().unwrap_or(' ');
            spans.push(Span::styled(
                format!("  [{}] ", key),
                Style::default().fg(C_MUTED),
            ));
            spans.push(Span::styled(
                bucket.label(),
                Style::default()
                    .fg(bucket_color(bucket))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        vec![Line::from(spans)]
    }

    fn draw_body(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        let session = &state.session;
        let phase = session.phase();
        let timings = session.timings();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // headline
                Constraint::Length(1), // meter
                Constraint::Length(1),
                Constraint::Min(0), // detail
                Constraint::Length(1), // footer
            ])
            .split(area);

        let (title, subtitle) = session.status_line();
        let mut head = vec![Line::from(Span::styled(title, style_heading()))];
        if let Phase::Processing { .. } = phase {
            let frame_str = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
            head.push(Line::from(vec![
                Span::styled(format!("{} ", frame_str), Style::default().fg(C_PENDING)),
                Span::styled(subtitle, style_secondary()),
            ]));
        } else {
            head.push(Line::from(Span::styled(subtitle, style_secondary())));
        }
        frame.render_widget(Paragraph::new(head), chunks[0]);

        // ── Meter row ─────────────────────────────────────────────────────────
        match phase {
            Phase::Guessing { remaining } => {
                let label = format!("{}s", remaining);
                draw_meter(
                    frame,
                    chunks[1],
                    remaining as f64 / timings.guess as f64,
                    &label,
                    C_PENDING,
                );
            }
            Phase::Processing { remaining } => draw_meter(
                frame,
                chunks[1],
                1.0 - remaining as f64 / timings.processing as f64,
                "",
                C_PENDING,
            ),
            Phase::FinalResult { .. } => {
                if let Some(result) = session.final_result() {
                    let color = if result.manual_override {
                        C_OVERRIDE
                    } else {
                        bucket_color(simplify(&result.badge))
                    };
                    draw_meter(frame, chunks[1], result.confidence / 100.0, "", color);
                }
            }
            _ => draw_track(frame, chunks[1]),
        }

        // ── Detail ────────────────────────────────────────────────────────────
        let detail: Vec<Line> = match phase {
            Phase::Waiting => vec![
                Line::from(Span::styled(
                    "Polling is paused until the backend reports ready.",
                    style_muted(),
                )),
            ],
            Phase::Ready => vec![Line::from(Span::styled(
                "Place an item in front of the camera.",
                style_muted(),
            ))],
            Phase::UnknownPrompt { remaining } => vec![
                Line::from(Span::styled(
                    "The detector could not identify the object.",
                    Style::default().fg(C_PENDING),
                )),
                Line::from(Span::styled(
                    format!("Back to scanning in {}s", remaining),
                    style_muted(),
                )),
            ],
            Phase::Processing { .. } => vec![],
            Phase::Guessing { remaining } => {
                let mut lines = vec![Line::from(Span::styled(
                    format!("{}", remaining),
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                ))];
                lines.extend(Self::choice_line("Where does it go?"));
                lines
            }
            Phase::GuessRevealed { .. } => match session.guess_outcome() {
                Some(outcome) => {
                    let color = if outcome.correct { C_ONLINE } else { C_ACCENT };
                    vec![
                        Line::from(Span::styled(
                            outcome.title(),
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(outcome.message(), style_secondary())),
                    ]
                }
                None => vec![],
            },
            Phase::FinalResult { remaining } => match session.final_result() {
                Some(result) => {
                    let badge_color = if result.manual_override {
                        C_OVERRIDE
                    } else {
                        bucket_color(simplify(&result.badge))
                    };
                    let mut lines = vec![
                        Line::from(Span::styled(
                            format!(" {} ", result.badge.to_uppercase()),
                            Style::default()
                                .fg(C_PRIMARY)
                                .bg(badge_color)
                                .add_modifier(Modifier::BOLD),
                        )),
                        Line::from(Span::styled(result.confidence_label(), style_secondary())),
                        Line::from(""),
                    ];
                    if self.override_open {
                        lines.extend(Self::choice_line("Override with:"));
                        lines.push(Line::from(Span::styled("Esc cancel", style_muted())));
                    } else {
                        lines.push(Line::from(Span::styled(
                            format!("[m] wrong? override   ready in {}s", remaining),
                            style_muted(),
                        )));
                    }
                    lines
                }
                None => vec![],
            },
        };
        frame.render_widget(Paragraph::new(detail).wrap(Wrap { trim: true }), chunks[3]);

        // ── Footer ────────────────────────────────────────────────────────────
        let last = session
            .state()
            .last_processed_timestamp
            .as_deref()
            .unwrap_or("none");
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("last event ", style_muted()),
                Span::styled(last, style_secondary()),
            ])),
            chunks[4],
        );
    }
}

impl Component for LivePanel {
    fn id(&self) -> ComponentId {
        ComponentId::LivePanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let phase = state.session.phase();
        if self.override_open {
            return match (key.code, bucket_for_key(key.code)) {
                (_, Some(bucket)) => vec![Action::Override(bucket), Action::CloseOverride],
                (KeyCode::Esc, _) => vec![Action::CloseOverride],
                _ => vec![],
            };
        }
        match key.code {
            KeyCode::Char('m') if matches!(phase, Phase::FinalResult { .. }) => {
                vec![Action::OpenOverride]
            }
            code => match bucket_for_key(code) {
                Some(bucket) if matches!(phase, Phase::Guessing { .. }) => {
                    vec![Action::Guess(bucket)]
                }
                _ => vec![],
            },
        }
    }

    fn tick(&mut self, state: &AppState) -> Vec<Action> {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        if self.override_open && !matches!(state.session.phase(), Phase::FinalResult { .. }) {
            self.override_open = false;
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::OpenOverride => self.override_open = true,
            Action::CloseOverride => self.override_open = false,
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let phase = state.session.phase();
        let badge_color = match phase {
            Phase::Waiting => C_ACCENT,
            Phase::Ready => C_ONLINE,
            _ => C_PENDING,
        };
        let block = pane_chrome(
            "session",
            Some('1'),
            focused,
            Some(Badge {
                text: phase.label(),
                color: badge_color,
            }),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height < 4 || inner.width < 10 {
            return;
        }
        let padded = Rect {
            x: inner.x + 1,
            width: inner.width.saturating_sub(2),
            ..inner
        };
        self.draw_body(frame, padded, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Effect, SessionController, SessionEvent, Timings};
    use ratatui::crossterm::event::KeyModifiers;
    use sort_proto::availability::Probe;
    use sort_proto::protocol::LatestClassification;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn state_in_guessing() -> AppState {
        let mut session = SessionController::new(Timings::default());
        session.handle(SessionEvent::Activated(Probe::Status));
        let effects = session.handle(SessionEvent::Poll(Ok(LatestClassification {
            classification: Some("metal".into()),
            confidence: 80.0,
            timestamp: Some("T1".into()),
            detection_active: true,
        })));
        let gen = effects
            .iter()
            .find_map(|e| match e {
                Effect::StartPhaseTimer { generation } => Some(*generation),
                _ => None,
            })
            .unwrap();
        for _ in 0..3 {
            session.handle(SessionEvent::PhaseTick { generation: gen });
        }
        AppState::new(session, "http://localhost:5000".into(), "poll", 95.0)
    }

    #[test]
    fn test_guess_keys_only_while_guessing() {
        let mut panel = LivePanel::new();
        let idle = AppState::new(
            SessionController::new(Timings::default()),
            String::new(),
            "poll",
            95.0,
        );
        assert!(panel.handle_key(key('r'), &idle).is_empty());

        let state = state_in_guessing();
        assert!(matches!(state.session.phase(), Phase::Guessing { .. }));
        assert_eq!(
            panel.handle_key(key('o'), &state),
            vec![Action::Guess(Bucket::Organic)]
        );
        assert!(panel.handle_key(key('m'), &state).is_empty());
    }

    #[test]
    fn test_override_picker_maps_keys() {
        let mut panel = LivePanel::new();
        let state = state_in_guessing();
        panel.on_action(&Action::OpenOverride, &state);
        assert_eq!(
            panel.handle_key(key('w'), &state),
            vec![Action::Override(Bucket::Waste), Action::CloseOverride]
        );
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(panel.handle_key(esc, &state), vec![Action::CloseOverride]);
    }

    #[test]
    fn test_picker_closes_when_result_ends() {
        let mut panel = LivePanel::new();
        let state = state_in_guessing();
        panel.on_action(&Action::OpenOverride, &state);
        panel.tick(&state);
        assert!(!panel.override_open);
    }
}
