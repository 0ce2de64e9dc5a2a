use tracing::{debug, info, warn};

use super::{LabelButton, Renderer};
use crate::app::ResultsView;
use crate::common::{Frame, Label, Snapshot};
use crate::pose::Pose;

/// Headless renderer that reports what would be drawn through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingRenderer {
    min_part_confidence: f64,
}

impl TracingRenderer {
    pub fn new(min_part_confidence: f64) -> Self {
        Self {
            min_part_confidence,
        }
    }
}

impl Renderer for TracingRenderer {
    fn draw_frame(&self, frame: &Frame, pose: Option<&Pose>) {
        match pose {
            Some(pose) => debug!(
                "Frame {} with {} keypoints and {} bones",
                frame.id(),
                pose.confident_keypoints(self.min_part_confidence).count(),
                pose.skeleton(self.min_part_confidence).len()
            ),
            None => debug!("Frame {} without pose", frame.id()),
        }
    }

    fn show_confidence(&self, probability: f64) {
        debug!("Confidence bar at {:.0}%", probability * 100.0);
    }

    fn show_score(&self, score: u32) {
        info!("Score: {}", score);
    }

    fn show_time(&self, seconds: u32) {
        debug!("Time: {}", seconds);
    }

    fn show_labels(&self, buttons: &[LabelButton]) {
        let board: Vec<String> = buttons
            .iter()
            .map(|b| {
                if b.enabled {
                    b.label.to_string()
                } else {
                    format!("[{}]", b.label)
                }
            })
            .collect();
        info!("Labels: {}", board.join(" "));
    }

    fn show_selected(&self, label: Option<&Label>) {
        match label {
            Some(label) => info!("Selected pose: {}", label),
            None => debug!("No pose selected"),
        }
    }

    fn show_capture(&self, snapshot: &Snapshot) {
        match snapshot.decode() {
            Ok(image) => info!("Captured pose ({}x{})", image.width(), image.height()),
            Err(e) => warn!("Captured pose cannot be shown: {}", e),
        }
    }

    fn hide_capture(&self) {
        debug!("Capture overlay hidden");
    }

    fn show_results(&self, results: &ResultsView) {
        info!("Final score: {}", results.score_text());
        for capture in results.captures() {
            info!("Captured {}", capture.label);
        }
    }

    fn alert(&self, message: &str) {
        warn!("{}", message);
    }
}
