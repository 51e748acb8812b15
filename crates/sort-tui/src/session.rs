//! Live session controller: the scan → guess → reveal loop.
//!
//! Pure state machine, no I/O.  The App feeds it `SessionEvent`s (poll
//! results, availability probes, 1-second phase ticks, operator input) and
//! carries out the returned `Effect`s (start/stop timers, post overrides,
//! show toasts).  Keeping the timers outside makes every transition
//! testable without a clock.
//!
//! ```text
//!  Waiting ──probe ok / monitor ready──▶ Ready
//!  Ready ──new "Unknown"──▶ UnknownPrompt ──3s──▶ Ready
//!  Ready ──new label──▶ Processing ──3s──▶ Guessing
//!  Guessing ──guess / 5s expiry ("unknown")──▶ GuessRevealed ──3s──▶ FinalResult
//!  FinalResult ──3s cooldown (restarted by an override)──▶ Ready
//!  any ──poll failure──▶ Waiting
//! ```
//!
//! Two guards keep exactly one cycle in flight: `is_scanning` and the
//! timestamp of the last event acted on.  Polls keep arriving during a
//! cycle; they are observed and dropped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sort_proto::availability::Probe;
use sort_proto::bucket::{simplify, Bucket};
use sort_proto::client::ApiError;
use sort_proto::config::SessionConfig;
use sort_proto::protocol::{LatestClassification, ManualOverrideRequest};
use tracing::{debug, info, warn};

use crate::widgets::toast::Severity;

/// Where the live interface currently is.  Timed phases carry the number of
/// whole seconds left before they advance on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Backend not (yet) active; nothing runs except availability checks.
    Waiting,
    Ready,
    UnknownPrompt { remaining: u32 },
    Processing { remaining: u32 },
    Guessing { remaining: u32 },
    GuessRevealed { remaining: u32 },
    FinalResult { remaining: u32 },
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Waiting => "WAITING",
            Phase::Ready => "READY",
            Phase::UnknownPrompt { .. } => "UNKNOWN",
            Phase::Processing { .. } => "PROCESSING",
            Phase::Guessing { .. } => "GUESSING",
            Phase::GuessRevealed { .. } => "REVEAL",
            Phase::FinalResult { .. } => "RESULT",
        }
    }
}

/// Inputs to the controller.
#[derive(Debug)]
pub enum SessionEvent {
    /// The startup probe sequence found the backend usable.
    Activated(Probe),
    /// Every startup probe failed.
    AvailabilityFailed(String),
    /// The 1 s monitor saw `system_ready || detection_active`.
    MonitorReady,
    /// One `/api/latest_classification` round trip.
    Poll(Result<LatestClassification, ApiError>),
    /// One second of the phase timer identified by `generation`.
    PhaseTick { generation: u64 },
    /// Operator guess during the guessing window.
    Guess(Bucket),
    /// Operator replaces the shown result.
    Override { category: Bucket, at: DateTime<Utc> },
    /// Outcome of the override POST.
    OverridePosted(Result<(), ApiError>),
}

/// Side effects requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartPolling,
    StopPolling,
    /// Replace the phase timer with a fresh 1 s ticker tagged `generation`.
    StartPhaseTimer { generation: u64 },
    StopPhaseTimer,
    /// Run the startup probe sequence after `after`.
    ProbeAvailability { after: Duration },
    StopAvailability,
    PostOverride(ManualOverrideRequest),
    Notify(Severity, String),
}

/// Phase durations in seconds.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub processing: u32,
    pub guess: u32,
    pub reveal: u32,
    pub cooldown: u32,
    pub unknown_prompt: u32,
    pub availability_retry: Duration,
}

impl From<&SessionConfig> for Timings {
    fn from(cfg: &SessionConfig) -> Self {
        // A zero-length phase would never see its expiring tick.
        Self {
            processing: cfg.processing_secs.max(1),
            guess: cfg.guess_secs.max(1),
            reveal: cfg.reveal_secs.max(1),
            cooldown: cfg.cooldown_secs.max(1),
            unknown_prompt: cfg.unknown_prompt_secs.max(1),
            availability_retry: cfg.availability_retry(),
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

/// Everything the live interface knows.  Cycle-scoped fields are cleared
/// when a cycle ends; `last_processed_timestamp` survives so the same
/// backend result is never acted on twice.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub backend_active: bool,
    pub is_scanning: bool,
    pub last_processed_timestamp: Option<String>,
    pub user_guess: Option<Bucket>,
    pub actual_classification: Option<String>,
    pub actual_confidence: Option<f64>,
    pub current_timer: u32,
    pub override_choice: Option<Bucket>,
    pub phase: Phase,
    timer_generation: u64,
}

impl SessionState {
    fn new(guess_secs: u32) -> Self {
        Self {
            backend_active: false,
            is_scanning: false,
            last_processed_timestamp: None,
            user_guess: None,
            actual_classification: None,
            actual_confidence: None,
            current_timer: guess_secs,
            override_choice: None,
            phase: Phase::Waiting,
            timer_generation: 0,
        }
    }

    fn clear_cycle(&mut self) {
        self.is_scanning = false;
        self.user_guess = None;
        self.actual_classification = None;
        self.actual_confidence = None;
        self.override_choice = None;
    }
}

/// The revealed comparison between guess and detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessOutcome {
    pub guess: Bucket,
    pub actual: Bucket,
    pub correct: bool,
}

impl GuessOutcome {
    pub fn title(&self) -> &'static str {
        if self.correct {
            "Correct!"
        } else {
            "Incorrect"
        }
    }

    pub fn message(&self) -> String {
        if self.correct {
            format!("Great job! You correctly identified it as {}.", self.actual)
        } else {
            format!(
                "Not quite. You guessed {}, but it's actually {}.",
                self.guess, self.actual
            )
        }
    }
}

/// What the result card shows during the cooldown.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalResult {
    pub badge: String,
    pub confidence: f64,
    pub manual_override: bool,
}

impl FinalResult {
    pub fn confidence_label(&self) -> String {
        if self.manual_override {
            format!("Confidence: {:.2}% (Manual Override)", self.confidence)
        } else {
            format!("Confidence: {:.2}%", self.confidence)
        }
    }
}

pub struct SessionController {
    state: SessionState,
    timings: Timings,
}

impl SessionController {
    pub fn new(timings: Timings) -> Self {
        Self {
            state: SessionState::new(timings.guess),
            timings,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Effects to run once when the controller is first installed.
    pub fn start(&self) -> Vec<Effect> {
        vec![Effect::ProbeAvailability {
            after: Duration::ZERO,
        }]
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Activated(probe) => {
                info!("[session] backend available via {}", probe.label());
                self.activate()
            }
            SessionEvent::MonitorReady => {
                // Monitor only ever turns the gate on; turning it off is the
                // poll loop's job.
                if self.state.backend_active {
                    Vec::new()
                } else {
                    info!("[session] monitor detected system ready");
                    self.activate()
                }
            }
            SessionEvent::AvailabilityFailed(reason) => {
                if self.state.backend_active {
                    return Vec::new();
                }
                debug!("[session] system not ready: {}", reason);
                self.state.phase = Phase::Waiting;
                vec![Effect::ProbeAvailability {
                    after: self.timings.availability_retry,
                }]
            }
            SessionEvent::Poll(result) => self.on_poll(result),
            SessionEvent::PhaseTick { generation } => self.on_tick(generation),
            SessionEvent::Guess(guess) => self.on_guess(guess),
            SessionEvent::Override { category, at } => self.on_override(category, at),
            SessionEvent::OverridePosted(result) => self.on_override_posted(result),
        }
    }

    // ── Derived views ─────────────────────────────────────────────────────────

    /// Seconds left in the guessing window.
    pub fn countdown(&self) -> Option<u32> {
        match self.state.phase {
            Phase::Guessing { .. } => Some(self.state.current_timer),
            _ => None,
        }
    }

    pub fn guess_outcome(&self) -> Option<GuessOutcome> {
        if !matches!(self.state.phase, Phase::GuessRevealed { .. }) {
            return None;
        }
        let guess = self.state.user_guess?;
        let actual = simplify(self.state.actual_classification.as_deref()?);
        Some(GuessOutcome {
            guess,
            actual,
            correct: guess == actual,
        })
    }

    pub fn final_result(&self) -> Option<FinalResult> {
        if !matches!(self.state.phase, Phase::FinalResult { .. }) {
            return None;
        }
        if let Some(choice) = self.state.override_choice {
            return Some(FinalResult {
                badge: choice.label().to_string(),
                confidence: 100.0,
                manual_override: true,
            });
        }
        let actual = self.state.actual_classification.as_deref()?;
        Some(FinalResult {
            badge: simplify(actual).label().to_string(),
            confidence: self.state.actual_confidence.unwrap_or(0.0),
            manual_override: false,
        })
    }

    /// Headline and subtitle for the current phase.
    pub fn status_line(&self) -> (&'static str, &'static str) {
        match self.state.phase {
            Phase::Waiting => (
                "Waiting for System",
                "Start the detection system and press ENTER in its terminal",
            ),
            Phase::Ready => ("Ready to Scan", "Scan Trash"),
            Phase::UnknownPrompt { .. } => {
                ("Unknown Object", "Please scan again with a clearer view")
            }
            Phase::Processing { .. } => ("Processing Classification", "Running AI inference..."),
            Phase::Guessing { .. } => ("Make Your Guess", "Where does this item go?"),
            Phase::GuessRevealed { .. } => ("Guess Submitted", "Checking against the detector"),
            Phase::FinalResult { .. } => ("Classification Result", "Ready to Scan in a moment"),
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    fn activate(&mut self) -> Vec<Effect> {
        if self.state.backend_active {
            return vec![Effect::StopAvailability];
        }
        self.state.backend_active = true;
        self.state.clear_cycle();
        self.state.phase = Phase::Ready;
        self.state.timer_generation += 1;
        vec![
            Effect::StopAvailability,
            Effect::StopPhaseTimer,
            Effect::StartPolling,
        ]
    }

    fn on_poll(&mut self, result: Result<LatestClassification, ApiError>) -> Vec<Effect> {
        if !self.state.backend_active {
            return Vec::new();
        }
        let latest = match result {
            Ok(latest) => latest,
            Err(e) => return self.go_offline(e),
        };

        if !latest.is_dispatchable()
            || self.state.is_scanning
            || self.state.phase != Phase::Ready
            || latest.timestamp == self.state.last_processed_timestamp
        {
            return Vec::new();
        }

        let label = latest.classification.clone().unwrap_or_default();
        self.state.last_processed_timestamp = latest.timestamp.clone();
        self.state.actual_classification = Some(label.clone());
        self.state.actual_confidence = Some(latest.confidence);

        if latest.is_unknown() {
            info!("[session] unknown object at {:?}", latest.timestamp);
            return self.enter_timed(Phase::UnknownPrompt {
                remaining: self.timings.unknown_prompt,
            });
        }

        info!(
            "[session] new classification {} ({:.2}%) at {:?}",
            label, latest.confidence, latest.timestamp
        );
        self.state.is_scanning = true;
        self.enter_timed(Phase::Processing {
            remaining: self.timings.processing,
        })
    }

    fn go_offline(&mut self, err: ApiError) -> Vec<Effect> {
        warn!("[session] poll failed, backend presumed down: {}", err);
        self.state.backend_active = false;
        self.state.clear_cycle();
        self.state.phase = Phase::Waiting;
        self.state.timer_generation += 1;
        vec![
            Effect::StopPolling,
            Effect::StopPhaseTimer,
            Effect::Notify(
                Severity::Error,
                "Backend offline, waiting for the system".to_string(),
            ),
        ]
    }

    fn on_tick(&mut self, generation: u64) -> Vec<Effect> {
        if !self.state.backend_active || generation != self.state.timer_generation {
            return Vec::new();
        }
        match self.state.phase {
            Phase::Waiting | Phase::Ready => Vec::new(),
            Phase::UnknownPrompt { remaining } => match remaining.saturating_sub(1) {
                0 => self.finish_cycle(),
                left => {
                    self.state.phase = Phase::UnknownPrompt { remaining: left };
                    Vec::new()
                }
            },
            Phase::Processing { remaining } => {
                match remaining.saturating_sub(1) {
                    0 => {
                        self.state.current_timer = self.timings.guess;
                        self.state.phase = Phase::Guessing {
                            remaining: self.timings.guess,
                        };
                    }
                    left => self.state.phase = Phase::Processing { remaining: left },
                }
                Vec::new()
            }
            Phase::Guessing { remaining } => {
                let left = remaining.saturating_sub(1);
                self.state.current_timer = left;
                if left == 0 {
                    debug!("[session] guess window expired");
                    self.submit_guess(Bucket::Unknown);
                } else {
                    self.state.phase = Phase::Guessing { remaining: left };
                }
                Vec::new()
            }
            Phase::GuessRevealed { remaining } => {
                match remaining.saturating_sub(1) {
                    0 => {
                        self.state.phase = Phase::FinalResult {
                            remaining: self.timings.cooldown,
                        }
                    }
                    left => self.state.phase = Phase::GuessRevealed { remaining: left },
                }
                Vec::new()
            }
            Phase::FinalResult { remaining } => match remaining.saturating_sub(1) {
                0 => self.finish_cycle(),
                left => {
                    self.state.phase = Phase::FinalResult { remaining: left };
                    Vec::new()
                }
            },
        }
    }

    fn on_guess(&mut self, guess: Bucket) -> Vec<Effect> {
        if !self.state.backend_active || !matches!(self.state.phase, Phase::Guessing { .. }) {
            return Vec::new();
        }
        self.submit_guess(guess);
        // The reveal runs its full length from the moment of the guess.
        self.restart_timer()
    }

    fn submit_guess(&mut self, guess: Bucket) {
        info!("[session] guess: {}", guess);
        self.state.user_guess = Some(guess);
        self.state.phase = Phase::GuessRevealed {
            remaining: self.timings.reveal,
        };
    }

    fn on_override(&mut self, category: Bucket, at: DateTime<Utc>) -> Vec<Effect> {
        if !self.state.backend_active || !matches!(self.state.phase, Phase::FinalResult { .. }) {
            return Vec::new();
        }
        info!("[session] manual override: {}", category);
        self.state.override_choice = Some(category);
        self.state.phase = Phase::FinalResult {
            remaining: self.timings.cooldown,
        };
        let mut effects = vec![Effect::PostOverride(ManualOverrideRequest::new(
            category.label(),
            at,
        ))];
        effects.extend(self.restart_timer());
        effects
    }

    fn on_override_posted(&mut self, result: Result<(), ApiError>) -> Vec<Effect> {
        if !self.state.backend_active {
            return Vec::new();
        }
        let notice = match result {
            Ok(()) => (
                Severity::Success,
                "Classification updated with manual override!",
            ),
            Err(ApiError::Rejected(reason)) => {
                warn!("[session] override rejected: {}", reason);
                (
                    Severity::Warning,
                    "Failed to save manual override. Please try again.",
                )
            }
            Err(e) => {
                warn!("[session] override post failed: {}", e);
                (
                    Severity::Error,
                    "Error saving manual override. Please try again.",
                )
            }
        };
        vec![Effect::Notify(notice.0, notice.1.to_string())]
    }

    fn enter_timed(&mut self, phase: Phase) -> Vec<Effect> {
        self.state.phase = phase;
        self.restart_timer()
    }

    fn restart_timer(&mut self) -> Vec<Effect> {
        self.state.timer_generation += 1;
        vec![Effect::StartPhaseTimer {
            generation: self.state.timer_generation,
        }]
    }

    fn finish_cycle(&mut self) -> Vec<Effect> {
        debug!("[session] cycle complete, ready to scan");
        self.state.clear_cycle();
        self.state.phase = Phase::Ready;
        self.state.timer_generation += 1;
        vec![Effect::StopPhaseTimer]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn latest(label: &str, confidence: f64, ts: &str) -> LatestClassification {
        LatestClassification {
            classification: Some(label.to_string()),
            confidence,
            timestamp: Some(ts.to_string()),
            detection_active: true,
        }
    }

    fn active() -> SessionController {
        let mut s = SessionController::new(Timings::default());
        s.handle(SessionEvent::Activated(Probe::Status));
        s
    }

    fn generation(effects: &[Effect]) -> u64 {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::StartPhaseTimer { generation } => Some(*generation),
                _ => None,
            })
            .expect("phase timer started")
    }

    fn tick(s: &mut SessionController, generation: u64, n: u32) -> Vec<Effect> {
        let mut out = Vec::new();
        for _ in 0..n {
            out = s.handle(SessionEvent::PhaseTick { generation });
        }
        out
    }

    #[test]
    fn test_starts_waiting_and_probes_immediately() {
        let s = SessionController::new(Timings::default());
        assert_eq!(s.phase(), Phase::Waiting);
        assert!(!s.state().backend_active);
        assert_eq!(
            s.start(),
            vec![Effect::ProbeAvailability {
                after: Duration::ZERO
            }]
        );
    }

    #[test]
    fn test_failed_probe_retries_after_two_seconds() {
        let mut s = SessionController::new(Timings::default());
        let effects = s.handle(SessionEvent::AvailabilityFailed("refused".into()));
        assert_eq!(
            effects,
            vec![Effect::ProbeAvailability {
                after: Duration::from_secs(2)
            }]
        );
        assert_eq!(s.phase(), Phase::Waiting);
    }

    #[test]
    fn test_activation_starts_polling() {
        let mut s = SessionController::new(Timings::default());
        let effects = s.handle(SessionEvent::Activated(Probe::Latest));
        assert!(effects.contains(&Effect::StartPolling));
        assert!(effects.contains(&Effect::StopAvailability));
        assert_eq!(s.phase(), Phase::Ready);
        assert!(s.state().backend_active);
    }

    #[test]
    fn test_full_cycle_with_correct_guess() {
        let mut s = active();

        let effects = s.handle(SessionEvent::Poll(Ok(latest("plastic", 91.2, "T1"))));
        let gen = generation(&effects);
        assert!(s.state().is_scanning);
        assert_eq!(s.phase(), Phase::Processing { remaining: 3 });

        tick(&mut s, gen, 3);
        assert_eq!(s.phase(), Phase::Guessing { remaining: 5 });
        assert_eq!(s.countdown(), Some(5));

        tick(&mut s, gen, 3);
        assert_eq!(s.countdown(), Some(2));
        let effects = s.handle(SessionEvent::Guess(Bucket::Recycle));
        let gen = generation(&effects);
        let outcome = s.guess_outcome().unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.title(), "Correct!");

        tick(&mut s, gen, 3);
        let result = s.final_result().unwrap();
        assert_eq!(result.badge, "recycle");
        assert_eq!(result.confidence_label(), "Confidence: 91.20%");

        let effects = tick(&mut s, gen, 3);
        assert_eq!(effects, vec![Effect::StopPhaseTimer]);
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.state().last_processed_timestamp.as_deref(), Some("T1"));
        assert!(!s.state().is_scanning);
        assert_eq!(s.state().user_guess, None);
        assert_eq!(s.state().actual_classification, None);
        assert_eq!(s.state().actual_confidence, None);
    }

    #[test]
    fn test_countdown_expiry_submits_unknown() {
        let mut s = active();
        let gen = generation(&s.handle(SessionEvent::Poll(Ok(latest("food", 77.0, "T1")))));
        tick(&mut s, gen, 3);
        tick(&mut s, gen, 4);
        assert_eq!(s.countdown(), Some(1));
        tick(&mut s, gen, 1);
        assert_eq!(s.state().user_guess, Some(Bucket::Unknown));
        let outcome = s.guess_outcome().unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.actual, Bucket::Organic);
        assert_eq!(
            outcome.message(),
            "Not quite. You guessed unknown, but it's actually organic."
        );
    }

    #[test]
    fn test_no_second_cycle_while_scanning() {
        let mut s = active();
        let gen = generation(&s.handle(SessionEvent::Poll(Ok(latest("metal", 80.0, "T1")))));
        assert!(s
            .handle(SessionEvent::Poll(Ok(latest("paper", 60.0, "T2"))))
            .is_empty());
        assert_eq!(s.state().last_processed_timestamp.as_deref(), Some("T1"));
        assert_eq!(s.state().actual_classification.as_deref(), Some("metal"));

        // Finish the cycle; T2 is then picked up.
        tick(&mut s, gen, 3);
        let gen = generation(&s.handle(SessionEvent::Guess(Bucket::Waste)));
        tick(&mut s, gen, 6);
        assert_eq!(s.phase(), Phase::Ready);
        s.handle(SessionEvent::Poll(Ok(latest("paper", 60.0, "T2"))));
        assert!(s.state().is_scanning);
        assert_eq!(s.state().last_processed_timestamp.as_deref(), Some("T2"));
    }

    #[test]
    fn test_repeated_timestamp_never_dispatches() {
        let mut s = active();
        let gen = generation(&s.handle(SessionEvent::Poll(Ok(latest("glass", 90.0, "T1")))));
        tick(&mut s, gen, 3);
        let gen = generation(&s.handle(SessionEvent::Guess(Bucket::Recycle)));
        tick(&mut s, gen, 6);
        assert!(!s.state().is_scanning);

        let effects = s.handle(SessionEvent::Poll(Ok(latest("glass", 90.0, "T1"))));
        assert!(effects.is_empty());
        assert_eq!(s.phase(), Phase::Ready);
    }

    #[test]
    fn test_inactive_detector_is_ignored() {
        let mut s = active();
        let mut idle = latest("plastic", 50.0, "T1");
        idle.detection_active = false;
        assert!(s.handle(SessionEvent::Poll(Ok(idle))).is_empty());
        assert!(s
            .handle(SessionEvent::Poll(Ok(LatestClassification::default())))
            .is_empty());
        assert_eq!(s.state().last_processed_timestamp, None);
    }

    #[test]
    fn test_unknown_takes_prompt_path_without_scanning() {
        let mut s = active();
        let effects = s.handle(SessionEvent::Poll(Ok(latest("Unknown", 12.0, "T9"))));
        let gen = generation(&effects);
        assert_eq!(s.phase(), Phase::UnknownPrompt { remaining: 3 });
        assert!(!s.state().is_scanning);

        // Polls during the prompt are dropped, no guess window ever opens.
        assert!(s
            .handle(SessionEvent::Poll(Ok(latest("plastic", 88.0, "T10"))))
            .is_empty());
        tick(&mut s, gen, 2);
        assert!(!s.state().is_scanning);
        assert_eq!(tick(&mut s, gen, 1), vec![Effect::StopPhaseTimer]);
        assert_eq!(s.phase(), Phase::Ready);
        assert!(!s.state().is_scanning);
        assert_eq!(s.state().last_processed_timestamp.as_deref(), Some("T9"));
    }

    #[test]
    fn test_poll_failure_goes_offline_until_monitor_recovers() {
        let mut s = active();
        let gen = generation(&s.handle(SessionEvent::Poll(Ok(latest("metal", 70.0, "T1")))));

        let effects = s.handle(SessionEvent::Poll(Err(ApiError::Rejected("boom".into()))));
        assert!(effects.contains(&Effect::StopPolling));
        assert!(effects.contains(&Effect::StopPhaseTimer));
        assert!(!s.state().backend_active);
        assert!(!s.state().is_scanning);
        assert_eq!(s.phase(), Phase::Waiting);

        // Late poll results and stale ticks are no-ops.
        assert!(s
            .handle(SessionEvent::Poll(Ok(latest("paper", 70.0, "T2"))))
            .is_empty());
        assert!(s.handle(SessionEvent::PhaseTick { generation: gen }).is_empty());
        assert!(s.handle(SessionEvent::Guess(Bucket::Waste)).is_empty());

        let effects = s.handle(SessionEvent::MonitorReady);
        assert!(effects.contains(&Effect::StartPolling));
        assert!(s.state().backend_active);
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.state().last_processed_timestamp.as_deref(), Some("T1"));
    }

    #[test]
    fn test_monitor_never_turns_gate_off() {
        let mut s = active();
        assert!(s.handle(SessionEvent::MonitorReady).is_empty());
        assert!(s.state().backend_active);
    }

    #[test]
    fn test_stale_timer_generation_is_ignored() {
        let mut s = active();
        let first = generation(&s.handle(SessionEvent::Poll(Ok(latest("paper", 66.0, "T1")))));
        tick(&mut s, first, 3);
        let second = generation(&s.handle(SessionEvent::Guess(Bucket::Recycle)));
        assert_ne!(first, second);
        tick(&mut s, first, 10);
        assert_eq!(s.phase(), Phase::GuessRevealed { remaining: 3 });
    }

    #[test]
    fn test_guess_outside_window_is_ignored() {
        let mut s = active();
        assert!(s.handle(SessionEvent::Guess(Bucket::Recycle)).is_empty());
        assert_eq!(s.state().user_guess, None);
    }

    #[test]
    fn test_override_posts_and_restarts_cooldown() {
        let mut s = active();
        let gen = generation(&s.handle(SessionEvent::Poll(Ok(latest("clothes", 64.5, "T1")))));
        tick(&mut s, gen, 3);
        let gen = generation(&s.handle(SessionEvent::Guess(Bucket::Waste)));
        tick(&mut s, gen, 4);
        assert_eq!(s.phase(), Phase::FinalResult { remaining: 2 });

        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let effects = s.handle(SessionEvent::Override {
            category: Bucket::Organic,
            at,
        });
        assert!(effects.contains(&Effect::PostOverride(ManualOverrideRequest::new(
            "organic", at
        ))));
        let gen = generation(&effects);
        assert_eq!(s.phase(), Phase::FinalResult { remaining: 3 });
        let result = s.final_result().unwrap();
        assert_eq!(result.badge, "organic");
        assert_eq!(
            result.confidence_label(),
            "Confidence: 100.00% (Manual Override)"
        );

        // A failed post is reported but the cooldown still completes.
        let effects = s.handle(SessionEvent::OverridePosted(Err(ApiError::Rejected(
            "No classifications found to override".into(),
        ))));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Notify(Severity::Warning, _)]
        ));
        tick(&mut s, gen, 3);
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.state().override_choice, None);
    }

    #[test]
    fn test_override_only_from_final_result() {
        let mut s = active();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        assert!(s
            .handle(SessionEvent::Override {
                category: Bucket::Waste,
                at
            })
            .is_empty());
    }

    #[test]
    fn test_at_most_one_cycle_over_many_polls() {
        let mut s = active();
        let mut gen = 0;
        let mut cycles = 0;
        for i in 0..200u32 {
            let ts = format!("T{}", i / 7);
            let was_scanning = s.state().is_scanning;
            let effects = s.handle(SessionEvent::Poll(Ok(latest("plastic", 80.0, &ts))));
            if !effects.is_empty() {
                assert!(!was_scanning, "cycle opened while another was in flight");
                cycles += 1;
                gen = generation(&effects);
            }
            // Two polls per second of phase timer.
            if i % 2 == 1 {
                s.handle(SessionEvent::PhaseTick { generation: gen });
            }
        }
        assert!(cycles > 1);
    }
}
