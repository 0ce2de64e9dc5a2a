use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

use super::{LabelButton, Renderer};
use crate::app::ResultsView;
use crate::common::{Frame, Label, Snapshot};
use crate::pose::Pose;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    Frame { with_pose: bool },
    Confidence(f64),
    Score(u32),
    Time(u32),
    Labels(Vec<LabelButton>),
    Selected(Option<Label>),
    CaptureShown,
    CaptureHidden,
    Results { score: String, captures: Vec<Label> },
    Alert(String),
}

/// Renderer that keeps every call, for inspecting a session after the fact.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.log().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RenderEvent::Alert(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: RenderEvent) {
        self.log().push(event);
    }

    fn log(&self) -> MutexGuard<'_, Vec<RenderEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| {
            warn!("Render log lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Renderer for RecordingRenderer {
    fn draw_frame(&self, _frame: &Frame, pose: Option<&Pose>) {
        self.push(RenderEvent::Frame {
            with_pose: pose.is_some(),
        });
    }

    fn show_confidence(&self, probability: f64) {
        self.push(RenderEvent::Confidence(probability));
    }

    fn show_score(&self, score: u32) {
        self.push(RenderEvent::Score(score));
    }

    fn show_time(&self, seconds: u32) {
        self.push(RenderEvent::Time(seconds));
    }

    fn show_labels(&self, buttons: &[LabelButton]) {
        self.push(RenderEvent::Labels(buttons.to_vec()));
    }

    fn show_selected(&self, label: Option<&Label>) {
        self.push(RenderEvent::Selected(label.cloned()));
    }

    fn show_capture(&self, _snapshot: &Snapshot) {
        self.push(RenderEvent::CaptureShown);
    }

    fn hide_capture(&self) {
        self.push(RenderEvent::CaptureHidden);
    }

    fn show_results(&self, results: &ResultsView) {
        self.push(RenderEvent::Results {
            score: results.score_text(),
            captures: results.captures().iter().map(|c| c.label.clone()).collect(),
        });
    }

    fn alert(&self, message: &str) {
        self.push(RenderEvent::Alert(message.to_string()));
    }
}
