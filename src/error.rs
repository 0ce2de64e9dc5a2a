use thiserror::Error;

use crate::common::Label;
use crate::session::Phase;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Model URL not found!")]
    ConfigurationMissing,
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    #[error("Session Error: {0}")]
    Session(#[from] SessionError),
    #[error("Frame source error: {0}")]
    FrameSource(String),
    #[error("Classifier error: {0}")]
    Classifier(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid snapshot: {0}")]
    Snapshot(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl AppError {
    /// Errors that abort the game page and send the player back to setup.
    pub fn is_setup_failure(&self) -> bool {
        matches!(self, AppError::ConfigurationMissing | AppError::ModelLoad(_))
    }
}

// Rejections raised by the session controller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("A session needs at least one label")]
    EmptyLabels,
    #[error("Label {0} appears more than once")]
    DuplicateLabel(Label),
    #[error("Label {0} is not part of this session")]
    UnknownLabel(Label),
    #[error("Label {0} has already been completed")]
    LabelCompleted(Label),
    #[error("Operation not allowed while the session is {0:?}")]
    NotActive(Phase),
    #[error("The session is already started.")]
    AlreadyStarted,
}
