pub mod classifier;
pub mod model;
pub mod replay;
pub mod skeleton;

pub use classifier::{Classification, PoseClassifier, PoseEstimate, Prediction};
pub use model::{ModelLoader, ModelLocation, ModelMetadata};
pub use replay::{ReplayClassifier, ReplayModelLoader, ReplayStep};
pub use skeleton::{Keypoint, Pose, Position};
