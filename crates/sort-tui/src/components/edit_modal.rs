//! EditModal: reclassify one stored image: pick a category, set confidence.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{centered_rect, truncate},
    gallery::CATEGORIES,
    theme::{
        label_color, style_input, style_muted, style_secondary, C_PANEL_BORDER_FOCUSED, C_POPUP_BG,
        C_PRIMARY,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Category,
    Confidence,
}

pub struct EditModal {
    pub visible: bool,
    filename: String,
    current: String,
    /// `None` until the operator picks one.
    category: Option<usize>,
    confidence: Input,
    field: Field,
}

impl EditModal {
    pub fn new() -> Self {
        Self {
            visible: false,
            filename: String::new(),
            current: String::new(),
            category: None,
            confidence: Input::default(),
            field: Field::Category,
        }
    }

    fn open(&mut self, filename: &str, state: &AppState) {
        self.visible = true;
        self.filename = filename.to_string();
        self.current = state
            .gallery
            .record(filename)
            .map(|r| r.classification.clone())
            .unwrap_or_default();
        self.category = None;
        self.confidence = Input::new(format!("{}", state.default_confidence));
        self.field = Field::Category;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    fn step_category(&mut self, forward: bool) {
        let n = CATEGORIES.len();
        self.category = Some(match (self.category, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        });
    }

    fn save_action(&self) -> Action {
        Action::SaveClassification {
            filename: self.filename.clone(),
            classification: self
                .category
                .map(|i| CATEGORIES[i].to_string())
                .unwrap_or_default(),
            confidence: self.confidence.value().to_string(),
        }
    }
}

impl Component for EditModal {
    fn id(&self) -> ComponentId {
        ComponentId::EditModal
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if !self.visible || key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Esc => return vec![Action::CancelEdit],
            KeyCode::Enter => return vec![self.save_action()],
            KeyCode::Tab | KeyCode::BackTab => {
                self.field = match self.field {
                    Field::Category => Field::Confidence,
                    Field::Confidence => Field::Category,
                };
                return vec![];
            }
            _ => {}
        }
        match self.field {
            Field::Category => match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.step_category(true),
                KeyCode::Up | KeyCode::Char('k') => self.step_category(false),
                _ => {}
            },
            Field::Confidence => {
                self.confidence.handle_event(&Event::Key(key));
            }
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        match action {
            Action::EditRecord(filename) => self.open(filename, state),
            Action::CancelEdit => self.hide(),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        if !self.visible {
            return;
        }
        let height = CATEGORIES.len() as u16 + 8;
        let popup = centered_rect(50, height, area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_PANEL_BORDER_FOCUSED))
            .title(Span::styled(
                " Edit Classification ",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(C_POPUP_BG));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);
        if inner.height < 4 {
            return;
        }

        let width = inner.width.saturating_sub(2) as usize;
        let mut lines = vec![
            Line::from(vec![
                Span::styled(" file    ", style_muted()),
                Span::styled(truncate(&self.filename, width.saturating_sub(9)), style_secondary()),
            ]),
            Line::from(vec![
                Span::styled(" now     ", style_muted()),
                Span::styled(
                    self.current.as_str(),
                    Style::default().fg(label_color(&self.current)),
                ),
            ]),
            Line::from(""),
        ];

        let heading = |label: &'static str, active: bool| {
            let style = if active {
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
            } else {
                style_muted()
            };
            Line::from(Span::styled(label, style))
        };
        lines.push(heading(
            " category  (↑↓ choose)",
            self.field == Field::Category,
        ));
        for (i, cat) in CATEGORIES.iter().enumerate() {
            let chosen = self.category == Some(i);
            let marker = if chosen { " ▸ " } else { "   " };
            let style = if chosen {
                Style::default()
                    .fg(label_color(cat))
                    .add_modifier(Modifier::BOLD)
            } else {
                style_secondary()
            };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(label_color(cat))),
                Span::styled(*cat, style),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(heading(" confidence %", self.field == Field::Confidence));
        frame.render_widget(Paragraph::new(lines.clone()), inner);

        let input_y = inner.y + lines.len() as u16;
        if input_y < inner.y + inner.height {
            let input_area = Rect {
                x: inner.x + 1,
                y: input_y,
                width: inner.width.saturating_sub(2).min(12),
                height: 1,
            };
            let scroll = self.confidence.visual_scroll(input_area.width as usize);
            frame.render_widget(
                Paragraph::new(self.confidence.value()).style(style_input()).scroll((0, scroll as u16)),
                input_area,
            );
            if self.field == Field::Confidence {
                let x = input_area.x + (self.confidence.visual_cursor().saturating_sub(scroll)) as u16;
                frame.set_cursor_position((x.min(input_area.x + input_area.width - 1), input_area.y));
            }
        }
    }
}
