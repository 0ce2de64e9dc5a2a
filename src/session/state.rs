use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::common::Label;
use crate::render::LabelButton;
use crate::session::result::Capture;

/// Lifecycle of a session. `Active` and `Paused` alternate once per match; `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Loading,
    Active,
    Paused,
    Ended,
}

/// Mutable session data, owned by a single controller.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(super) phase: Phase,
    pub(super) score: u32,
    pub(super) time_remaining: u32,
    pub(super) labels: IndexSet<Label>,
    pub(super) completed: IndexSet<Label>,
    pub(super) selected: Option<Label>,
    pub(super) captures: Vec<Capture>,
}

impl SessionState {
    pub(super) fn loading() -> Self {
        Self {
            phase: Phase::Loading,
            score: 0,
            time_remaining: 0,
            labels: IndexSet::new(),
            completed: IndexSet::new(),
            selected: None,
            captures: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn completed_labels(&self) -> impl Iterator<Item = &Label> {
        self.completed.iter()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn is_completed(&self, label: &Label) -> bool {
        self.completed.contains(label)
    }

    pub fn all_completed(&self) -> bool {
        !self.labels.is_empty() && self.completed.len() == self.labels.len()
    }

    pub fn selected_label(&self) -> Option<&Label> {
        self.selected.as_ref()
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// Labels still open for selection, in session order.
    pub fn remaining_labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter().filter(move |l| !self.completed.contains(*l))
    }

    pub fn label_board(&self) -> Vec<LabelButton> {
        self.labels
            .iter()
            .map(|label| LabelButton {
                label: label.clone(),
                enabled: !self.completed.contains(label),
            })
            .collect()
    }
}
