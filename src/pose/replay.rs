use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::common::{Frame, Label};
use crate::error::AppError;
use crate::pose::classifier::{Classification, PoseClassifier, PoseEstimate, Prediction};
use crate::pose::model::{ModelLoader, ModelLocation, ModelMetadata};
use crate::pose::skeleton::Pose;

const REPLAY_FILE: &str = "replay.json";

/// One scripted model output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub probabilities: IndexMap<Label, f64>,
    #[serde(default)]
    pub pose: Option<Pose>,
}

/// Classifier that plays back recorded outputs, one per frame, cycling at the end.
pub struct ReplayClassifier {
    labels: Vec<Label>,
    steps: Vec<ReplayStep>,
    cursor: AtomicUsize,
}

impl ReplayClassifier {
    pub fn new(labels: Vec<Label>, steps: Vec<ReplayStep>) -> Self {
        Self {
            labels,
            steps,
            cursor: AtomicUsize::new(0),
        }
    }

    fn next_step(&self) -> Option<&ReplayStep> {
        if self.steps.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.steps.len();
        self.steps.get(index)
    }
}

#[async_trait]
impl PoseClassifier for ReplayClassifier {
    fn labels(&self) -> Vec<Label> {
        self.labels.clone()
    }

    async fn classify(&self, frame: &Frame) -> Result<PoseEstimate, AppError> {
        let Some(step) = self.next_step() else {
            return Ok(PoseEstimate {
                pose: None,
                classification: self
                    .labels
                    .iter()
                    .map(|label| (label.clone(), 0.0))
                    .collect(),
            });
        };
        debug!("Replaying classification for frame {}", frame.id());

        // Report every model label, in model order, like a real classifier head.
        let predictions = self
            .labels
            .iter()
            .map(|label| {
                Prediction::new(
                    label.clone(),
                    step.probabilities.get(label).copied().unwrap_or(0.0),
                )
            })
            .collect();

        Ok(PoseEstimate {
            pose: step.pose.clone(),
            classification: Classification::new(predictions),
        })
    }
}

/// Loads a model directory on the local filesystem: `model.json` must be
/// present, `metadata.json` gives the labels and `replay.json` the scripted outputs.
#[derive(Debug, Clone, Default)]
pub struct ReplayModelLoader;

impl ReplayModelLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelLoader for ReplayModelLoader {
    async fn load(&self, location: &ModelLocation) -> Result<Arc<dyn PoseClassifier>, AppError> {
        let model_path = location.model_url();
        tokio::fs::metadata(&model_path)
            .await
            .map_err(|e| AppError::ModelLoad(format!("cannot read {model_path}: {e}")))?;

        let metadata_path = location.metadata_url();
        let metadata = tokio::fs::read_to_string(&metadata_path)
            .await
            .map_err(|e| AppError::ModelLoad(format!("cannot read {metadata_path}: {e}")))?;
        let metadata = ModelMetadata::parse(&metadata)?;

        let replay_path = location.join(REPLAY_FILE);
        let steps: Vec<ReplayStep> = match tokio::fs::read_to_string(&replay_path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| AppError::ModelLoad(format!("invalid {replay_path}: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(AppError::ModelLoad(format!(
                    "cannot read {replay_path}: {e}"
                )));
            }
        };

        info!(
            "Loaded model {} with {} labels and {} replay steps",
            metadata.model_name.as_deref().unwrap_or(location.as_str()),
            metadata.labels.len(),
            steps.len()
        );
        Ok(Arc::new(ReplayClassifier::new(metadata.labels, steps)))
    }
}
