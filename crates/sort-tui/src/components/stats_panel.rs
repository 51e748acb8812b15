//! StatsPanel: totals and the per-category breakdown chart.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{label_color, style_muted, style_secondary, C_PRIMARY},
    widgets::{meter::draw_meter, pane_chrome::pane_chrome},
};

pub struct StatsPanel;

impl StatsPanel {
    pub fn new() -> Self {
        Self
    }
}

fn stat_line<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<16}", label), style_secondary()),
        Span::styled(
            value,
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
    ])
}

impl Component for StatsPanel {
    fn id(&self) -> ComponentId {
        ComponentId::StatsPanel
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let block = pane_chrome("stats", None, focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width < 12 {
            return;
        }
        let inner = Rect {
            x: inner.x + 1,
            width: inner.width.saturating_sub(2),
            ..inner
        };

        let Some(stats) = &state.gallery.stats else {
            frame.render_widget(
                Paragraph::new(Span::styled("No statistics loaded", style_muted())),
                inner,
            );
            return;
        };

        let mut lines = vec![
            stat_line("Total Images", stats.total_images.to_string()),
            stat_line("Classified", stats.total_classified.to_string()),
            stat_line("Unclassified", stats.unclassified.to_string()),
            stat_line(
                "Avg Confidence",
                format!("{:.2}%", stats.average_confidence),
            ),
            Line::from(""),
        ];
        let rows = state.gallery.breakdown();
        if rows.is_empty() {
            lines.push(Line::from(Span::styled(
                "No classifications available",
                style_muted(),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Classification Breakdown",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )));
        }
        let header_h = lines.len() as u16;
        frame.render_widget(
            Paragraph::new(lines),
            Rect {
                height: header_h.min(inner.height),
                ..inner
            },
        );

        // One bar per category, tallest first.
        let label_w = 12u16;
        for (i, row) in rows.iter().enumerate() {
            let y = inner.y + header_h + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let color = label_color(&row.label);
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("● ", Style::default().fg(color)),
                    Span::styled(
                        crate::components::truncate(&row.label, label_w as usize - 2),
                        style_secondary(),
                    ),
                ])),
                Rect {
                    x: inner.x,
                    y,
                    width: label_w.min(inner.width),
                    height: 1,
                },
            );
            let label = format!("{:>3} {:>6}", row.count, row.percent_label());
            draw_meter(
                frame,
                Rect {
                    x: inner.x + label_w,
                    y,
                    width: inner.width.saturating_sub(label_w),
                    height: 1,
                },
                row.percent / 100.0,
                &label,
                color,
            );
        }
    }
}
