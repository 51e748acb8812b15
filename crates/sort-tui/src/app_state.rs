//! AppState: shared read-only data passed to all components during render/event.
//!
//! The App event-loop is the only thing that writes to AppState.

use crate::action::Workspace;
use crate::gallery::Gallery;
use crate::session::SessionController;
use crate::widgets::status_bar::InputMode;

pub struct AppState {
    // ── Live session ───────────────────────────────────────────────────────
    pub session: SessionController,

    // ── Gallery ────────────────────────────────────────────────────────────
    pub gallery: Gallery,
    pub default_confidence: f64,

    // ── Backend ────────────────────────────────────────────────────────────
    pub backend_url: String,
    /// "push" or "poll", for the header.
    pub refresh_source: &'static str,

    // ── UI ─────────────────────────────────────────────────────────────────
    pub workspace: Workspace,
    pub input_mode: InputMode,
    pub logs: Vec<String>,
}

impl AppState {
    pub fn new(
        session: SessionController,
        backend_url: String,
        refresh_source: &'static str,
        default_confidence: f64,
    ) -> Self {
        Self {
            session,
            gallery: Gallery::new(),
            default_confidence,
            backend_url,
            refresh_source,
            workspace: Workspace::Live,
            input_mode: InputMode::Normal,
            logs: Vec::new(),
        }
    }

    pub fn backend_active(&self) -> bool {
        self.session.state().backend_active
    }

    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}
