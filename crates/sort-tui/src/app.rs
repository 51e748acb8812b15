//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - The event loop draws when something changed, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.
//! - The session controller returns `Vec<Effect>`; App turns each Effect into
//!   a `ScheduledTask` in its slot, a one-off request, or a toast.

use std::io;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use sort_proto::availability;
use sort_proto::bulk::{self, BulkDeleteReport};
use sort_proto::client::{ApiError, BackendClient};
use sort_proto::config::Config;
use sort_proto::protocol::{ClassificationRecord, Stats};

use crate::{
    action::{Action, ComponentId, Workspace},
    app_state::AppState,
    component::Component,
    components::{
        edit_modal::EditModal, gallery_list::GalleryList, header::Header,
        help_overlay::HelpOverlay, live_panel::LivePanel, stats_panel::StatsPanel, truncate,
    },
    gallery::{self, Gallery, DELETE_CONFIRM},
    refresh::{self, RefreshRequest},
    scheduler::ScheduledTask,
    session::{Effect, SessionController, SessionEvent, Timings},
    widgets::{
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

pub enum AppMessage {
    Event(Event),
    Session(SessionEvent),
    /// Records + stats; `announce` is set for operator-requested refreshes.
    GalleryLoaded {
        result: Result<(Vec<ClassificationRecord>, Stats), ApiError>,
        announce: bool,
    },
    Saved(Result<(), ApiError>),
    Deleted(Result<(), ApiError>),
    BulkDeleted(BulkDeleteReport),
    Refresh(RefreshRequest),
    /// The reload delay elapsed.
    Reload,
}

impl From<RefreshRequest> for AppMessage {
    fn from(req: RefreshRequest) -> Self {
        AppMessage::Refresh(req)
    }
}

const LOG_CAP: usize = 500;
const PHASE_TICK: Duration = Duration::from_secs(1);

/// One background job per slot; replacing or clearing a slot cancels the
/// job that was there.
#[derive(Default)]
struct Tasks {
    poll: Option<ScheduledTask>,
    monitor: Option<ScheduledTask>,
    availability: Option<ScheduledTask>,
    phase: Option<ScheduledTask>,
    gallery: Option<ScheduledTask>,
    watcher: Option<ScheduledTask>,
    reload: Option<ScheduledTask>,
}

enum ConfirmTarget {
    Delete(String),
    BulkDelete(Vec<String>),
}

/// A destructive action waiting for `y`.
struct PendingConfirm {
    target: ConfirmTarget,
    prompt: String,
}

pub struct App {
    state: AppState,
    config: Config,
    client: BackendClient,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    live_panel: LivePanel,
    stats_panel: StatsPanel,
    gallery_list: GalleryList,
    edit_modal: EditModal,
    help_overlay: HelpOverlay,

    toast: ToastManager,
    show_keys_bar: bool,
    pending_confirm: Option<PendingConfirm>,
    should_quit: bool,

    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,
    tasks: Tasks,
}

impl App {
    pub fn new(config: Config, client: BackendClient) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(1024);
        let refresh_source = if config.push.events_url.is_some() {
            "push"
        } else {
            "status poll"
        };
        let state = AppState::new(
            SessionController::new(Timings::from(&config.session)),
            client.base_url().to_string(),
            refresh_source,
            config.gallery.default_confidence,
        );
        Self {
            state,
            header: Header::new(),
            live_panel: LivePanel::new(),
            stats_panel: StatsPanel::new(),
            gallery_list: GalleryList::new(client.base_url()),
            edit_modal: EditModal::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            show_keys_bar: true,
            pending_confirm: None,
            should_quit: false,
            tx,
            rx: Some(rx),
            tasks: Tasks::default(),
            config,
            client,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut rx = self.rx.take().context("event loop already running")?;

        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard events ──────────────────────────────────
        // Polls with a timeout so the thread notices the loop has gone away.
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            if event_tx.is_closed() {
                break;
            }
            match event::poll(Duration::from_millis(250)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                Ok(false) => {}
                Err(_) => break,
            }
        });

        self.push_log(format!("smartsort started, backend {}", self.client.base_url()));
        self.start_background();

        // Component maintenance + toast expiry/spinner: 100ms.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 256;
                    let mut redraw = self.handle_message(msg);
                    let mut drained = 0usize;
                    while drained < MAX_DRAIN {
                        let Ok(next) = rx.try_recv() else { break };
                        drained += 1;
                        redraw |= self.handle_message(next);
                    }
                    needs_redraw = redraw;
                }

                _ = ui_tick.tick() => {
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.live_panel.tick(s));
                        all.extend(self.gallery_list.tick(s));
                        all
                    };
                    for action in tick_actions {
                        self.dispatch(action);
                    }
                    self.toast.tick();
                    self.sync_input_mode();
                    needs_redraw = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        info!("smartsort shutting down");
        self.tasks = Tasks::default();
        drop(rx);
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        Ok(())
    }

    /// Start everything a fresh page would: availability probe, readiness
    /// monitor, gallery load + auto-refresh, refresh watcher.
    fn start_background(&mut self) {
        let effects = self.state.session.start();
        self.apply_effects(effects);
        self.start_monitor();
        self.load_gallery(false);
        self.start_gallery_refresh();
        self.start_watcher();
    }

    fn start_monitor(&mut self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.tasks.monitor = Some(ScheduledTask::interval(
            self.config.session.monitor_interval(),
            move || {
                let client = client.clone();
                let tx = tx.clone();
                async move {
                    if availability::monitor_ready(&client).await {
                        let _ = tx.send(AppMessage::Session(SessionEvent::MonitorReady)).await;
                    }
                }
            },
        ));
    }

    fn start_gallery_refresh(&mut self) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let period = Duration::from_secs(self.config.gallery.refresh_interval_secs);
        self.tasks.gallery = Some(ScheduledTask::interval(period, move || {
            let client = client.clone();
            let tx = tx.clone();
            async move {
                let result = gallery::load(&client).await;
                let _ = tx
                    .send(AppMessage::GalleryLoaded {
                        result,
                        announce: false,
                    })
                    .await;
            }
        }));
    }

    fn start_watcher(&mut self) {
        let tx = self.tx.clone();
        let push = &self.config.push;
        let task = match &push.events_url {
            Some(url) => {
                info!("[refresh] watching push channel {}", url);
                ScheduledTask::spawn(refresh::watch_push(
                    url.clone(),
                    Duration::from_millis(push.reload_delay_ms),
                    tx,
                ))
            }
            None => {
                info!("[refresh] no push channel, polling system status");
                ScheduledTask::spawn(refresh::watch_status(
                    self.client.clone(),
                    Duration::from_millis(push.fallback_poll_ms),
                    tx,
                ))
            }
        };
        self.tasks.watcher = Some(task);
    }

    fn load_gallery(&mut self, announce: bool) {
        self.state.gallery.loading = true;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = gallery::load(&client).await;
            let _ = tx.send(AppMessage::GalleryLoaded { result, announce }).await;
        });
    }

    // ── Message handling ──────────────────────────────────────────────────────

    /// Returns true when the screen needs a redraw.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.dispatch(action);
                }
                true
            }
            AppMessage::Event(Event::Resize(_, _)) => true,
            AppMessage::Event(_) => false,

            AppMessage::Session(event) => {
                self.apply_session(event);
                true
            }

            AppMessage::GalleryLoaded { result, announce } => {
                self.toast.dismiss_spinner();
                match result {
                    Ok((records, stats)) => {
                        self.state.gallery.set_data(records, stats);
                        self.gallery_list.sync(&self.state);
                        if announce {
                            self.toast.success("Data refreshed!");
                        }
                    }
                    Err(e) => {
                        warn!("[gallery] load failed: {}", e);
                        self.state.gallery.set_error(format!("Error loading data: {}", e));
                        if announce {
                            self.toast.error("Error loading data. Please try again.");
                        }
                    }
                }
                true
            }

            AppMessage::Saved(result) => {
                self.toast.dismiss_spinner();
                let (severity, message) = gallery::save_message(&result);
                self.push_log(message.clone());
                self.toast.notify(severity, message);
                if result.is_ok() {
                    self.edit_modal.hide();
                    self.sync_input_mode();
                    self.load_gallery(false);
                }
                true
            }

            AppMessage::Deleted(result) => {
                self.toast.dismiss_spinner();
                let (severity, message) = gallery::delete_message(&result);
                self.push_log(message.clone());
                self.toast.notify(severity, message);
                if result.is_ok() {
                    self.load_gallery(false);
                }
                true
            }

            AppMessage::BulkDeleted(report) => {
                self.toast.dismiss_spinner();
                self.state.gallery.finish_bulk();
                let (ok, err) = report.messages();
                if let Some(msg) = ok {
                    self.push_log(msg.clone());
                    self.toast.success(msg);
                }
                if let Some(msg) = err {
                    self.push_log(msg.clone());
                    self.toast.error(msg);
                }
                self.load_gallery(false);
                true
            }

            AppMessage::Refresh(req) => {
                let message = req
                    .message
                    .unwrap_or_else(|| "Refreshing page...".to_string());
                info!("[app] reload requested: {}", message);
                self.push_log(message.clone());
                self.toast.info(message);
                let tx = self.tx.clone();
                self.tasks.reload = Some(ScheduledTask::after(
                    Duration::from_millis(self.config.push.reload_delay_ms),
                    async move {
                        let _ = tx.send(AppMessage::Reload).await;
                    },
                ));
                true
            }

            AppMessage::Reload => {
                self.reload();
                true
            }
        }
    }

    /// Full reset of both controllers, as if the page were loaded anew.
    /// The monitor, the gallery timer and the refresh watcher keep running.
    fn reload(&mut self) {
        info!("[app] reloading");
        self.tasks.poll = None;
        self.tasks.phase = None;
        self.tasks.availability = None;
        self.tasks.reload = None;

        self.state.session = SessionController::new(Timings::from(&self.config.session));
        self.state.gallery = Gallery::new();
        self.gallery_list.sync(&self.state);
        self.live_panel.override_open = false;
        self.edit_modal.hide();
        self.pending_confirm = None;
        self.sync_input_mode();

        let effects = self.state.session.start();
        self.apply_effects(effects);
        self.load_gallery(false);
        self.push_log("reloaded".to_string());
    }

    fn apply_session(&mut self, event: SessionEvent) {
        let effects = self.state.session.handle(event);
        self.apply_effects(effects);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartPolling => {
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    self.tasks.poll = Some(ScheduledTask::interval(
                        self.config.session.poll_interval(),
                        move || {
                            let client = client.clone();
                            let tx = tx.clone();
                            async move {
                                let result = client.latest_classification().await;
                                let _ = tx
                                    .send(AppMessage::Session(SessionEvent::Poll(result)))
                                    .await;
                            }
                        },
                    ));
                }
                Effect::StopPolling => self.tasks.poll = None,
                Effect::StartPhaseTimer { generation } => {
                    let tx = self.tx.clone();
                    self.tasks.phase = Some(ScheduledTask::interval(PHASE_TICK, move || {
                        let tx = tx.clone();
                        async move {
                            let _ = tx
                                .send(AppMessage::Session(SessionEvent::PhaseTick { generation }))
                                .await;
                        }
                    }));
                }
                Effect::StopPhaseTimer => self.tasks.phase = None,
                Effect::ProbeAvailability { after } => {
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    self.tasks.availability = Some(ScheduledTask::after(after, async move {
                        let event = match availability::probe(&client).await {
                            Ok(probe) => SessionEvent::Activated(probe),
                            Err(e) => SessionEvent::AvailabilityFailed(e.to_string()),
                        };
                        let _ = tx.send(AppMessage::Session(event)).await;
                    }));
                }
                Effect::StopAvailability => self.tasks.availability = None,
                Effect::PostOverride(req) => {
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = client.manual_override(&req).await;
                        let _ = tx
                            .send(AppMessage::Session(SessionEvent::OverridePosted(result)))
                            .await;
                    });
                }
                Effect::Notify(severity, message) => {
                    self.push_log(message.clone());
                    self.toast.notify(severity, message);
                }
            }
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        // A pending confirmation swallows everything but its answer.
        if self.pending_confirm.is_some() {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => vec![Action::Confirm],
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    vec![Action::CancelConfirm]
                }
                _ => vec![],
            };
        }

        if self.edit_modal.visible {
            return self.edit_modal.handle_key(key, &self.state);
        }

        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('K') => return vec![Action::ToggleKeys],
                KeyCode::Tab | KeyCode::BackTab => return vec![Action::NextWorkspace],
                KeyCode::Char('1') => return vec![Action::SwitchWorkspace(Workspace::Live)],
                KeyCode::Char('2') => return vec![Action::SwitchWorkspace(Workspace::Gallery)],
                _ => {}
            }
        }

        let s = &self.state;
        match s.workspace {
            Workspace::Live => self.live_panel.handle_key(key, s),
            Workspace::Gallery => self.gallery_list.handle_key(key, s),
        }
    }

    fn dispatch(&mut self, action: Action) {
        // Components see the action first so they can react to it.
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.header.on_action(&action, s));
            out.extend(self.live_panel.on_action(&action, s));
            out.extend(self.stats_panel.on_action(&action, s));
            out.extend(self.gallery_list.on_action(&action, s));
            out.extend(self.edit_modal.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        for a in secondary {
            self.apply_action(a);
        }
        self.sync_input_mode();
    }

    fn apply_action(&mut self, action: Action) {
        if action != Action::Noop {
            debug!("apply_action: {:?}", action);
        }
        match action {
            // ── Live session ──────────────────────────────────────────────────
            Action::Guess(bucket) => self.apply_session(SessionEvent::Guess(bucket)),
            Action::Override(bucket) => self.apply_session(SessionEvent::Override {
                category: bucket,
                at: Utc::now(),
            }),

            // ── Gallery ───────────────────────────────────────────────────────
            Action::ToggleView => self.state.gallery.toggle_view(),
            Action::ToggleBulk => self.state.gallery.toggle_bulk(),
            Action::ToggleSelect(filename) => self.state.gallery.toggle_selected(&filename),
            Action::SelectAll => self.state.gallery.select_all(),
            Action::RequestBulkDelete => match self.state.gallery.selection() {
                Ok(files) => {
                    self.pending_confirm = Some(PendingConfirm {
                        prompt: self.state.gallery.bulk_confirm_prompt(),
                        target: ConfirmTarget::BulkDelete(files),
                    });
                }
                Err(msg) => self.toast.warning(msg),
            },
            Action::RequestDelete(filename) => {
                self.pending_confirm = Some(PendingConfirm {
                    target: ConfirmTarget::Delete(filename),
                    prompt: DELETE_CONFIRM.to_string(),
                });
            }
            Action::Confirm => {
                if let Some(pending) = self.pending_confirm.take() {
                    self.run_confirmed(pending.target);
                }
            }
            Action::CancelConfirm => self.pending_confirm = None,
            Action::SaveClassification {
                filename,
                classification,
                confidence,
            } => match gallery::build_classify(&filename, &classification, &confidence) {
                Ok(req) => {
                    info!(
                        "[gallery] reclassifying {} as {} ({}%)",
                        req.filename, req.classification, req.confidence
                    );
                    self.toast.spinner("Saving classification...");
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = client.classify(&req).await;
                        let _ = tx.send(AppMessage::Saved(result)).await;
                    });
                }
                Err(msg) => self.toast.warning(msg),
            },
            Action::RefreshGallery => {
                self.toast.spinner("Refreshing data...");
                self.load_gallery(true);
            }
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        self.toast.success(format!("copied: {}", truncate(&text, 40)));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }

            // ── Layout ────────────────────────────────────────────────────────
            Action::SwitchWorkspace(ws) => self.state.workspace = ws,
            Action::NextWorkspace => self.state.workspace = self.state.workspace.next(),
            Action::ToggleKeys => self.show_keys_bar = !self.show_keys_bar,
            Action::Quit => self.should_quit = true,

            // Handled by components in dispatch().
            Action::OpenOverride
            | Action::CloseOverride
            | Action::SelectUp(_)
            | Action::SelectDown(_)
            | Action::SelectFirst
            | Action::SelectLast
            | Action::EditRecord(_)
            | Action::CancelEdit
            | Action::ToggleHelp
            | Action::Noop => {}
        }
    }

    fn run_confirmed(&mut self, target: ConfirmTarget) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        match target {
            ConfirmTarget::Delete(filename) => {
                info!("[gallery] deleting {}", filename);
                self.toast.spinner("Deleting classification...");
                tokio::spawn(async move {
                    let result = client.delete_classification(&filename).await;
                    let _ = tx.send(AppMessage::Deleted(result)).await;
                });
            }
            ConfirmTarget::BulkDelete(files) => {
                info!("[gallery] bulk deleting {} classifications", files.len());
                self.toast
                    .spinner(format!("Deleting {} classifications...", files.len()));
                tokio::spawn(async move {
                    let report = bulk::bulk_delete(&client, &files).await;
                    let _ = tx.send(AppMessage::BulkDeleted(report)).await;
                });
            }
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        use crate::theme::C_BG;
        use ratatui::widgets::Block;
        let area = frame.area();

        frame.render_widget(
            Block::default().style(ratatui::style::Style::default().bg(C_BG)),
            area,
        );

        // ── Outer layout: header | separator | body | log | (keys) ───────────
        // A pending prompt forces the keys bar on so the question is visible.
        let show_keys = self.show_keys_bar || self.state.input_mode != InputMode::Normal;
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(if show_keys { 1 } else { 0 }),
            ])
            .split(area);

        self.header.draw(frame, outer[0], false, &self.state);
        status_bar::draw_separator(frame, outer[1]);

        match self.state.workspace {
            Workspace::Live => self.draw_live(frame, outer[2]),
            Workspace::Gallery => self.draw_gallery(frame, outer[2]),
        }

        status_bar::draw_log_bar(
            frame,
            outer[3],
            self.state.last_log(),
            self.state.backend_active(),
        );
        if show_keys {
            status_bar::draw_keys_bar(
                frame,
                outer[4],
                self.state.input_mode,
                self.state.workspace,
                self.state.gallery.bulk_mode,
                self.pending_confirm.as_ref().map(|p| p.prompt.as_str()),
            );
        }

        // ── Modals (on top of everything but toasts) ─────────────────────────
        self.edit_modal.draw(frame, area, true, &self.state);
        self.help_overlay.draw(frame, area, false, &self.state);

        self.toast.draw(frame, area);
    }

    fn draw_live(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        let focus = self.focused();
        self.live_panel.draw(
            frame,
            cols[0],
            focus == self.live_panel.id(),
            &self.state,
        );
        self.stats_panel.draw(
            frame,
            cols[1],
            focus == self.stats_panel.id(),
            &self.state,
        );
    }

    fn draw_gallery(&mut self, frame: &mut ratatui::Frame, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
            .split(area);
        let focus = self.focused();
        self.stats_panel.draw(
            frame,
            cols[0],
            focus == self.stats_panel.id(),
            &self.state,
        );
        self.gallery_list.draw(
            frame,
            cols[1],
            focus == self.gallery_list.id(),
            &self.state,
        );
    }

    /// The component that receives keys.
    fn focused(&self) -> ComponentId {
        if self.edit_modal.visible {
            ComponentId::EditModal
        } else if self.help_overlay.visible {
            ComponentId::HelpOverlay
        } else {
            match self.state.workspace {
                Workspace::Live => ComponentId::LivePanel,
                Workspace::Gallery => ComponentId::GalleryList,
            }
        }
    }

    fn push_log(&mut self, msg: String) {
        self.state.logs.push(msg);
        if self.state.logs.len() > LOG_CAP {
            self.state.logs.remove(0);
        }
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if self.pending_confirm.is_some() {
            InputMode::Confirm
        } else if self.edit_modal.visible {
            InputMode::Edit
        } else if self.live_panel.override_open {
            InputMode::Override
        } else {
            InputMode::Normal
        };
    }
}
