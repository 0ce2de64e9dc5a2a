pub mod recording;
pub mod tracing_renderer;

pub use recording::{RecordingRenderer, RenderEvent};
pub use tracing_renderer::TracingRenderer;

use serde::{Deserialize, Serialize};

use crate::app::ResultsView;
use crate::common::{Frame, Label, Snapshot};
use crate::pose::Pose;

/// One selectable control on the label board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelButton {
    pub label: Label,
    pub enabled: bool,
}

/// Display surface for every page. Calls are fire-and-forget.
pub trait Renderer: Send + Sync {
    fn draw_frame(&self, frame: &Frame, pose: Option<&Pose>);
    fn show_confidence(&self, probability: f64);
    fn show_score(&self, score: u32);
    fn show_time(&self, seconds: u32);
    fn show_labels(&self, buttons: &[LabelButton]);
    fn show_selected(&self, label: Option<&Label>);
    fn show_capture(&self, snapshot: &Snapshot);
    fn hide_capture(&self);
    fn show_results(&self, results: &ResultsView);
    fn alert(&self, message: &str);
}
