use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::common::Label;
use crate::error::AppError;
use crate::pose::classifier::PoseClassifier;

const MODEL_FILE: &str = "model.json";
const METADATA_FILE: &str = "metadata.json";

/// Where the pretrained model lives. File names are appended verbatim, so the
/// location is expected to end with a separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLocation(String);

impl ModelLocation {
    /// Builds a location from the navigation parameter; absent or blank is a configuration error.
    pub fn from_param(param: Option<&str>) -> Result<Self, AppError> {
        match param.map(str::trim) {
            Some(location) if !location.is_empty() => Ok(Self(location.to_string())),
            _ => Err(AppError::ConfigurationMissing),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn model_url(&self) -> String {
        self.join(MODEL_FILE)
    }

    pub fn metadata_url(&self) -> String {
        self.join(METADATA_FILE)
    }

    pub fn join(&self, file: &str) -> String {
        format!("{}{}", self.0, file)
    }
}

impl fmt::Display for ModelLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The parts of `metadata.json` the game reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub labels: Vec<Label>,
    #[serde(rename = "modelName", default)]
    pub model_name: Option<String>,
    #[serde(rename = "timeStamp", default)]
    pub time_stamp: Option<String>,
}

impl ModelMetadata {
    pub fn parse(json: &str) -> Result<Self, AppError> {
        let metadata: ModelMetadata = serde_json::from_str(json)
            .map_err(|e| AppError::ModelLoad(format!("invalid {METADATA_FILE}: {e}")))?;
        if metadata.labels.is_empty() {
            return Err(AppError::ModelLoad(format!(
                "{METADATA_FILE} declares no labels"
            )));
        }
        let mut seen = HashSet::with_capacity(metadata.labels.len());
        let repeated = metadata
            .labels
            .iter()
            .find(|label| !seen.insert(label.as_str()))
            .cloned();
        if let Some(label) = repeated {
            return Err(AppError::ModelLoad(format!(
                "{METADATA_FILE} lists label {label} more than once"
            )));
        }
        Ok(metadata)
    }
}

/// Loads a classifier from a model location.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, location: &ModelLocation) -> Result<Arc<dyn PoseClassifier>, AppError>;
}
