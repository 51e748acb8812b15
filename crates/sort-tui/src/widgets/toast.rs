//! Toast notifications: transient messages stacked in the top-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// How long a toast of this kind stays on screen.
    pub fn lifetime(self) -> Duration {
        match self {
            Severity::Info | Severity::Success => Duration::from_secs(3),
            Severity::Warning => Duration::from_secs(4),
            Severity::Error => Duration::from_secs(5),
        }
    }

    fn color(self) -> Color {
        match self {
            Severity::Info => C_TOAST_INFO,
            Severity::Success => C_TOAST_SUCCESS,
            Severity::Warning => C_TOAST_WARNING,
            Severity::Error => C_TOAST_ERROR,
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Severity::Info => "·",
            Severity::Success => "✓",
            Severity::Warning => "!",
            Severity::Error => "✗",
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Persistent "working…" line, shown above the toasts until dismissed.
struct Spinner {
    message: String,
    frame: usize,
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    spinner: Option<Spinner>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinner: None,
            max_visible: 4,
        }
    }

    /// Show `message`; an identical message already on screen is replaced.
    pub fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        self.toasts.retain(|t| t.message != message);
        self.toasts.push_back(Toast {
            message,
            severity,
            expires: Instant::now() + severity.lifetime(),
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.notify(Severity::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(Severity::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.notify(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(Severity::Error, message);
    }

    pub fn spinner(&mut self, message: impl Into<String>) {
        self.spinner = Some(Spinner {
            message: message.into(),
            frame: 0,
        });
    }

    pub fn dismiss_spinner(&mut self) {
        self.spinner = None;
    }

    /// Drop expired toasts and advance the spinner.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        if let Some(s) = self.spinner.as_mut() {
            s.frame = (s.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinner.is_none()
    }

    /// Messages currently queued, oldest first.
    #[cfg(test)]
    pub fn messages(&self) -> impl Iterator<Item = (Severity, &str)> {
        self.toasts.iter().map(|t| (t.severity, t.message.as_str()))
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() {
            return;
        }
        let max_width = (area.width / 2).clamp(30, 64);
        let bottom = area.y + area.height;
        let mut y = area.y + 1;

        let mut rows: Vec<(String, Color)> = Vec::new();
        if let Some(s) = &self.spinner {
            let icon = SPINNER_FRAMES[s.frame % SPINNER_FRAMES.len()];
            rows.push((format!(" {} {} ", icon, s.message), C_TOAST_INFO));
        }
        rows.extend(
            self.toasts
                .iter()
                .rev()
                .take(self.max_visible)
                .map(|t| (format!(" {} {} ", t.severity.icon(), t.message), t.severity.color())),
        );

        for (text, color) in rows {
            if y >= bottom {
                break;
            }
            let w = (text.chars().count() as u16).min(max_width);
            let rect = Rect {
                x: area.x + area.width.saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, rect);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))),
                rect,
            );
            y += 1;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}
