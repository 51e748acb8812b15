//! GalleryList: stored classifications as a list or a grid of cards.
//!
//! Owns the cursor; marks, view mode and records live in `AppState.gallery`.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use sort_proto::protocol::ClassificationRecord;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::truncate,
    gallery::{confidence_label, ViewMode},
    theme::{
        label_color, style_muted, style_secondary, style_selected, style_unfocused_border,
        C_ACCENT, C_MARKED, C_OVERRIDE, C_PANEL_BORDER_FOCUSED, C_PENDING, C_PRIMARY,
    },
    widgets::{
        meter::draw_meter,
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 6;

pub struct GalleryList {
    list: ScrollableList<ClassificationRecord>,
    /// Cards per grid row at the last draw.
    columns: usize,
    /// Image URLs are resolved against this.
    base_url: String,
}

impl GalleryList {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            list: ScrollableList::new(),
            columns: 1,
            base_url: base_url.into(),
        }
    }

    /// Pull fresh records from the gallery state, keeping the cursor on the
    /// same file when it survived the reload.
    pub fn sync(&mut self, state: &AppState) {
        self.list
            .set_items_keyed(state.gallery.records.clone(), |r| r.filename.clone());
    }

    pub fn selected_filename(&self) -> Option<&str> {
        self.list.selected_item().map(|r| r.filename.as_str())
    }

    fn image_url(&self, record: &ClassificationRecord) -> String {
        if record.image_path.starts_with("http://") || record.image_path.starts_with("https://") {
            record.image_path.clone()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                record.image_path.trim_start_matches('/')
            )
        }
    }

    fn row_step(&self, state: &AppState) -> usize {
        match state.gallery.view {
            ViewMode::Grid => self.columns.max(1),
            ViewMode::List => 1,
        }
    }

    fn draw_list(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let height = area.height as usize;
        self.list.ensure_visible(height);
        let bulk = state.gallery.bulk_mode;
        let selected = self.list.selected;

        for (row, (idx, rec)) in self.list.visible_items(height).enumerate() {
            let y = area.y + row as u16;
            let mut spans = Vec::new();
            if bulk {
                let mark = if state.gallery.is_selected(&rec.filename) {
                    Span::styled("[x] ", Style::default().fg(C_MARKED))
                } else {
                    Span::styled("[ ] ", style_muted())
                };
                spans.push(mark);
            }
            spans.push(Span::styled(
                format!("{:<12}", truncate(&rec.classification, 12)),
                Style::default()
                    .fg(label_color(&rec.classification))
                    .add_modifier(Modifier::BOLD),
            ));
            let confidence = match confidence_label(rec) {
                Some(_) => format!("{:>7.2}%", rec.confidence),
                None => format!("{:>8}", "—"),
            };
            spans.push(Span::styled(confidence, style_secondary()));
            spans.push(Span::styled(
                if rec.manual_override { " ✎ " } else { "   " },
                Style::default().fg(C_OVERRIDE),
            ));
            let frame_no = rec
                .frame_number
                .map(|n| format!("#{:<6}", n))
                .unwrap_or_else(|| "#?     ".to_string());
            spans.push(Span::styled(frame_no, style_muted()));
            spans.push(Span::styled(
                format!(" {}  {:.2} MB  ", rec.date, rec.file_size_mb),
                style_secondary(),
            ));
            let used: usize = spans.iter().map(|s| s.width()).sum();
            let room = (area.width as usize).saturating_sub(used);
            spans.push(Span::styled(truncate(&rec.filename, room), style_muted()));

            let mut line = Line::from(spans);
            if idx == selected {
                line = line.style(style_selected());
            }
            frame.render_widget(
                Paragraph::new(line),
                Rect {
                    x: area.x,
                    y,
                    width: area.width,
                    height: 1,
                },
            );
        }
    }

    fn draw_grid(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        self.columns = (area.width / CARD_WIDTH).max(1) as usize;
        let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;

        // Scroll whole card rows so the cursor's row stays on screen.
        let cursor_row = self.list.selected / self.columns;
        let first_row = self.list.scroll_offset / self.columns;
        let first_row = if cursor_row < first_row {
            cursor_row
        } else if cursor_row >= first_row + visible_rows {
            cursor_row + 1 - visible_rows
        } else {
            first_row
        };
        self.list.scroll_offset = first_row * self.columns;

        let card_w = area.width / self.columns as u16;
        let bulk = state.gallery.bulk_mode;
        let selected = self.list.selected;
        let count = self.columns * visible_rows;

        for (slot, (idx, rec)) in self.list.visible_items(count).enumerate() {
            let col = (slot % self.columns) as u16;
            let row = (slot / self.columns) as u16;
            let rect = Rect {
                x: area.x + col * card_w,
                y: area.y + row * CARD_HEIGHT,
                width: card_w,
                height: CARD_HEIGHT.min(area.height.saturating_sub(row * CARD_HEIGHT)),
            };
            if rect.height < 3 {
                break;
            }
            let border = if idx == selected {
                Style::default().fg(C_PANEL_BORDER_FOCUSED)
            } else {
                style_unfocused_border()
            };
            let mut title = vec![];
            if bulk {
                title.push(if state.gallery.is_selected(&rec.filename) {
                    Span::styled("[x] ", Style::default().fg(C_MARKED))
                } else {
                    Span::styled("[ ] ", style_muted())
                });
            }
            let frame_no = rec
                .frame_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".into());
            title.push(Span::styled(
                format!("Detection {}", frame_no),
                Style::default().fg(C_PRIMARY),
            ));
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(Line::from(title));
            let inner = block.inner(rect);
            frame.render_widget(block, rect);
            if inner.height == 0 {
                continue;
            }

            let color = label_color(&rec.classification);
            let mut badge = vec![Span::styled(
                format!(" {} ", rec.classification),
                Style::default()
                    .fg(C_PRIMARY)
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            )];
            if rec.manual_override {
                badge.push(Span::styled(" ✎", Style::default().fg(C_OVERRIDE)));
            }
            let lines = vec![
                Line::from(badge),
                Line::from(Span::styled(
                    truncate(&format!("{}  {:.2} MB", rec.date, rec.file_size_mb), inner.width as usize),
                    style_secondary(),
                )),
            ];
            frame.render_widget(Paragraph::new(lines), inner);

            if inner.height >= 4 {
                let bar = Rect {
                    y: inner.y + 3,
                    height: 1,
                    ..inner
                };
                match confidence_label(rec) {
                    Some(_) => draw_meter(
                        frame,
                        bar,
                        rec.confidence / 100.0,
                        &format!("{:.2}%", rec.confidence),
                        color,
                    ),
                    None => frame.render_widget(
                        Paragraph::new(Span::styled(
                            "! Not classified",
                            Style::default().fg(C_PENDING),
                        )),
                        bar,
                    ),
                }
            }
        }
    }
}

impl Component for GalleryList {
    fn id(&self) -> ComponentId {
        ComponentId::GalleryList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let bulk = state.gallery.bulk_mode;
        let current = self.selected_filename().map(str::to_string);
        let step = self.row_step(state);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => vec![Action::SelectUp(step)],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::SelectDown(step)],
            KeyCode::Left | KeyCode::Char('h') => vec![Action::SelectUp(1)],
            KeyCode::Right | KeyCode::Char('l') => vec![Action::SelectDown(1)],
            KeyCode::PageUp => vec![Action::SelectUp(10 * step)],
            KeyCode::PageDown => vec![Action::SelectDown(10 * step)],
            KeyCode::Home | KeyCode::Char('g') => vec![Action::SelectFirst],
            KeyCode::End | KeyCode::Char('G') => vec![Action::SelectLast],
            KeyCode::Char('v') => vec![Action::ToggleView],
            KeyCode::Char('b') => vec![Action::ToggleBulk],
            KeyCode::Char('R') => vec![Action::RefreshGallery],
            KeyCode::Char(' ') if bulk => current.map(Action::ToggleSelect).into_iter().collect(),
            KeyCode::Char('a') if bulk => vec![Action::SelectAll],
            KeyCode::Char('D') if bulk => vec![Action::RequestBulkDelete],
            KeyCode::Char('e') if !bulk => current.map(Action::EditRecord).into_iter().collect(),
            KeyCode::Char('d') if !bulk => {
                current.map(Action::RequestDelete).into_iter().collect()
            }
            KeyCode::Char('y') => self
                .list
                .selected_item()
                .map(|r| Action::CopyToClipboard(self.image_url(r)))
                .into_iter()
                .collect(),
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::SelectUp(n) => self.list.select_up(*n),
            Action::SelectDown(n) => self.list.select_down(*n),
            Action::SelectFirst => self.list.select_first(),
            Action::SelectLast => self.list.select_last(),
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let gallery = &state.gallery;
        let title = format!(
            "classifications ({}{})",
            gallery.records.len(),
            if gallery.bulk_mode {
                format!(", {} marked", gallery.selected.len())
            } else {
                String::new()
            }
        );
        let badge = if gallery.bulk_mode {
            Some(Badge {
                text: "BULK",
                color: C_ACCENT,
            })
        } else {
            Some(Badge {
                text: match gallery.view {
                    ViewMode::Grid => "GRID",
                    ViewMode::List => "LIST",
                },
                color: C_PRIMARY,
            })
        };
        let block = pane_chrome(&title, Some('2'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width < 8 {
            return;
        }

        let notice = if gallery.loading && gallery.records.is_empty() {
            Some(Span::styled("Loading images...", style_muted()))
        } else if let Some(err) = &gallery.load_error {
            Some(Span::styled(err.as_str(), Style::default().fg(C_ACCENT)))
        } else if gallery.records.is_empty() && gallery.last_loaded.is_some() {
            Some(Span::styled(
                "No images found. Start the auto-capture script to begin collecting images.",
                style_muted(),
            ))
        } else {
            None
        };
        if let Some(span) = notice {
            frame.render_widget(Paragraph::new(Line::from(span)), inner);
            return;
        }

        match gallery.view {
            ViewMode::List => self.draw_list(frame, inner, state),
            ViewMode::Grid => self.draw_grid(frame, inner, state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionController, Timings};
    use ratatui::crossterm::event::KeyModifiers;
    use sort_proto::protocol::Stats;

    fn record(filename: &str, path: &str) -> ClassificationRecord {
        ClassificationRecord {
            filename: filename.into(),
            image_path: path.into(),
            frame_number: Some(3),
            date: "2026-03-01".into(),
            file_size_mb: 0.2,
            classification: "paper".into(),
            confidence: 66.0,
            manual_override: false,
        }
    }

    fn state() -> AppState {
        let mut s = AppState::new(
            SessionController::new(Timings::default()),
            "http://pi:5000".into(),
            "poll",
            95.0,
        );
        s.gallery.set_data(
            vec![
                record("a.jpg", "/detected_images/a.jpg"),
                record("b.jpg", "detected_images/b.jpg"),
            ],
            Stats::default(),
        );
        s
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_edit_and_delete_target_cursor() {
        let st = state();
        let mut list = GalleryList::new(st.backend_url.clone());
        list.sync(&st);
        list.on_action(&Action::SelectDown(1), &st);
        assert_eq!(
            list.handle_key(key('e'), &st),
            vec![Action::EditRecord("b.jpg".into())]
        );
        assert_eq!(
            list.handle_key(key('d'), &st),
            vec![Action::RequestDelete("b.jpg".into())]
        );
    }

    #[test]
    fn test_bulk_keys_replace_row_actions() {
        let mut st = state();
        st.gallery.toggle_bulk();
        let mut list = GalleryList::new(st.backend_url.clone());
        list.sync(&st);
        assert!(list.handle_key(key('e'), &st).is_empty());
        assert_eq!(
            list.handle_key(key(' '), &st),
            vec![Action::ToggleSelect("a.jpg".into())]
        );
        assert_eq!(list.handle_key(key('D'), &st), vec![Action::RequestBulkDelete]);
    }

    #[test]
    fn test_copy_resolves_image_url() {
        let st = state();
        let mut list = GalleryList::new("http://pi:5000/");
        list.sync(&st);
        assert_eq!(
            list.handle_key(key('y'), &st),
            vec![Action::CopyToClipboard(
                "http://pi:5000/detected_images/a.jpg".into()
            )]
        );
        list.on_action(&Action::SelectLast, &st);
        assert_eq!(
            list.handle_key(key('y'), &st),
            vec![Action::CopyToClipboard(
                "http://pi:5000/detected_images/b.jpg".into()
            )]
        );
    }
}
