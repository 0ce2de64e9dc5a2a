use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::common::Label;
use crate::session::{Phase, SessionController};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Headless stand-in for the label board: whenever nothing is selected it
/// picks the next label, first from its script, then in board order.
pub struct AutoPlayer {
    picks: VecDeque<Label>,
}

impl AutoPlayer {
    pub fn new(picks: Vec<Label>) -> Self {
        Self {
            picks: picks.into(),
        }
    }

    /// Selects a label if the session is waiting for one. Returns the pick.
    pub fn choose(&mut self, controller: &mut SessionController) -> Option<Label> {
        let state = controller.state();
        if state.phase() != Phase::Active || state.selected_label().is_some() {
            return None;
        }

        let next = loop {
            match self.picks.pop_front() {
                Some(label) if state.remaining_labels().any(|l| l == &label) => break Some(label),
                Some(label) => debug!("Skipping scripted pick {}", label),
                None => break state.remaining_labels().next().cloned(),
            }
        }?;

        match controller.select_label(next.clone()) {
            Ok(()) => Some(next),
            Err(e) => {
                warn!("Player could not select {}: {}", next, e);
                None
            }
        }
    }

    pub async fn run(
        mut self,
        controller: Arc<Mutex<SessionController>>,
        cancel_token: CancellationToken,
    ) {
        let mut interval = time::interval(POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => {
                    let mut controller = controller.lock().await;
                    self.choose(&mut controller);
                }
            }
        }
    }
}
