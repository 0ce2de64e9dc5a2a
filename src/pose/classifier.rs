use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::{Frame, Label};
use crate::error::AppError;
use crate::pose::skeleton::Pose;

/// One (label, probability) pair produced by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "className")]
    pub label: Label,
    pub probability: f64,
}

impl Prediction {
    pub fn new(label: impl Into<Label>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// Classifier output for a single frame, in the order the model reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification {
    predictions: Vec<Prediction>,
}

impl Classification {
    pub fn new(predictions: Vec<Prediction>) -> Self {
        Self { predictions }
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// Probability reported for `label`; a label the model did not report counts as 0.
    pub fn probability_of(&self, label: &Label) -> f64 {
        self.predictions
            .iter()
            .find(|p| &p.label == label)
            .map(|p| p.probability)
            .unwrap_or(0.0)
    }
}

impl<L: Into<Label>> FromIterator<(L, f64)> for Classification {
    fn from_iter<T: IntoIterator<Item = (L, f64)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(label, probability)| Prediction::new(label, probability))
                .collect(),
        )
    }
}

/// What the model says about a frame: the estimated pose for display and the classification.
#[derive(Debug, Clone, Default)]
pub struct PoseEstimate {
    pub pose: Option<Pose>,
    pub classification: Classification,
}

/// Pretrained pose classifier. The model itself is opaque; only its output shape matters.
#[async_trait]
pub trait PoseClassifier: Send + Sync {
    /// Class labels in model order.
    fn labels(&self) -> Vec<Label>;

    async fn classify(&self, frame: &Frame) -> Result<PoseEstimate, AppError>;
}
