use indexmap::IndexSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::{Navigator, Page};
use crate::common::{Frame, Label};
use crate::config::{MATCH_THRESHOLD, SESSION_SECONDS};
use crate::error::{AppError, SessionError};
use crate::pose::PoseEstimate;
use crate::render::Renderer;
use crate::session::result::{Capture, SessionResult};
use crate::session::state::{Phase, SessionState};
use crate::store::ResultStore;

/// Fixed game rules for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionRules {
    /// A match needs a probability strictly above this.
    pub match_threshold: f64,
    pub session_seconds: u32,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            match_threshold: MATCH_THRESHOLD,
            session_seconds: SESSION_SECONDS,
        }
    }
}

/// What a frame did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Session is paused, ended or not started; nothing was evaluated.
    Ignored,
    /// No label selected, frame shown for display only.
    Displayed,
    /// Selected label scored below the threshold.
    Confidence(f64),
    /// Selected label matched; the session is paused until the confirmation completes.
    Matched(Capture),
}

/// The game session state machine: `Loading -> Active <-> Paused -> Ended`.
pub struct SessionController {
    rules: SessionRules,
    state: SessionState,
    store: Arc<dyn ResultStore>,
    navigator: Arc<dyn Navigator>,
    renderer: Arc<dyn Renderer>,
    cancel_token: CancellationToken,
    result: Option<SessionResult>,
}

impl SessionController {
    pub fn new(
        rules: SessionRules,
        store: Arc<dyn ResultStore>,
        navigator: Arc<dyn Navigator>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            rules,
            state: SessionState::loading(),
            store,
            navigator,
            renderer,
            cancel_token: CancellationToken::new(),
            result: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn rules(&self) -> SessionRules {
        self.rules
    }

    /// Cancelled once the session ends; the repeating tasks stop on it.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// The handoff produced by `end`, once it has run.
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn start(&mut self, labels: Vec<Label>) -> Result<(), SessionError> {
        if self.state.phase != Phase::Loading {
            return Err(SessionError::AlreadyStarted);
        }
        if labels.is_empty() {
            return Err(SessionError::EmptyLabels);
        }
        let mut set = IndexSet::with_capacity(labels.len());
        for label in labels {
            if set.contains(&label) {
                return Err(SessionError::DuplicateLabel(label));
            }
            set.insert(label);
        }

        self.state = SessionState {
            phase: Phase::Active,
            score: 0,
            time_remaining: self.rules.session_seconds,
            labels: set,
            completed: IndexSet::new(),
            selected: None,
            captures: Vec::new(),
        };
        info!(
            "Session started with {} labels and {}s on the clock",
            self.state.labels.len(),
            self.state.time_remaining
        );

        self.renderer.show_labels(&self.state.label_board());
        self.renderer.show_selected(None);
        self.renderer.show_score(0);
        self.renderer.show_time(self.state.time_remaining);
        Ok(())
    }

    pub fn select_label(&mut self, label: Label) -> Result<(), SessionError> {
        if self.state.phase != Phase::Active {
            warn!("Ignoring selection of {} while {:?}", label, self.state.phase);
            return Err(SessionError::NotActive(self.state.phase));
        }
        if !self.state.labels.contains(&label) {
            return Err(SessionError::UnknownLabel(label));
        }
        if self.state.is_completed(&label) {
            return Err(SessionError::LabelCompleted(label));
        }

        info!("Selected label {}", label);
        self.renderer.show_selected(Some(&label));
        self.state.selected = Some(label);
        Ok(())
    }

    /// Evaluates one classified frame. A match pauses the session; call
    /// `finish_confirmation` once the confirmation has been shown.
    pub fn on_frame(
        &mut self,
        frame: &Frame,
        estimate: &PoseEstimate,
    ) -> Result<FrameOutcome, AppError> {
        if self.state.phase != Phase::Active {
            return Ok(FrameOutcome::Ignored);
        }

        let outcome = match self.state.selected.clone() {
            None => FrameOutcome::Displayed,
            Some(label) => {
                let probability = estimate.classification.probability_of(&label);
                self.renderer.show_confidence(probability);

                if probability > self.rules.match_threshold {
                    // Snapshot first so a failed encode leaves the state untouched.
                    let capture = Capture {
                        image: frame.snapshot()?,
                        label: label.clone(),
                    };

                    self.state.phase = Phase::Paused;
                    self.state.score += 1;
                    self.state.captures.push(capture.clone());
                    info!(
                        "Matched {} at {:.2} (score {})",
                        label, probability, self.state.score
                    );
                    self.renderer.show_score(self.state.score);
                    FrameOutcome::Matched(capture)
                } else {
                    debug!("{} at {:.2}", label, probability);
                    FrameOutcome::Confidence(probability)
                }
            }
        };

        self.renderer.draw_frame(frame, estimate.pose.as_ref());
        Ok(outcome)
    }

    /// Closes the match sequence: the selected label becomes completed and the
    /// session resumes, or ends when every label is done.
    pub fn finish_confirmation(&mut self) -> Option<SessionResult> {
        if self.state.phase != Phase::Paused {
            debug!("Confirmation finished while {:?}", self.state.phase);
            return None;
        }

        if let Some(label) = self.state.selected.take() {
            self.state.completed.insert(label);
        }
        self.state.phase = Phase::Active;

        self.renderer.show_selected(None);
        self.renderer.show_confidence(0.0);
        self.renderer.show_labels(&self.state.label_board());

        if self.state.all_completed() {
            info!("All {} labels completed", self.state.labels.len());
            return self.end();
        }
        None
    }

    /// One second of the countdown. Ends the session when time runs out, paused or not.
    pub fn tick(&mut self) -> Option<SessionResult> {
        if !matches!(self.state.phase, Phase::Active | Phase::Paused) {
            return None;
        }

        self.state.time_remaining = self.state.time_remaining.saturating_sub(1);
        self.renderer.show_time(self.state.time_remaining);

        if self.state.time_remaining == 0 {
            info!(
                "Time is up with {}/{} labels completed",
                self.state.completed.len(),
                self.state.labels.len()
            );
            return self.end();
        }
        None
    }

    /// Hands the result to the store and leaves the page. Runs at most once;
    /// later calls return `None`.
    pub fn end(&mut self) -> Option<SessionResult> {
        if !matches!(self.state.phase, Phase::Active | Phase::Paused) {
            debug!("Ignoring end while {:?}", self.state.phase);
            return None;
        }

        let result = SessionResult::new(
            self.state.score,
            self.state.time_remaining,
            self.state.captures.clone(),
        );
        if let Err(e) = result.write_to(self.store.as_ref()) {
            error!("Failed to store session result: {}", e);
        }

        self.state.phase = Phase::Ended;
        self.cancel_token.cancel();
        info!("Session ended with final score {}", result.final_score());

        self.navigator.navigate(Page::Score);
        self.result = Some(result.clone());
        Some(result)
    }
}
