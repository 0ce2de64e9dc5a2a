use serde::{Deserialize, Serialize};

/// Pairs of body parts joined by a bone when drawing the skeleton.
const CONNECTED_PARTS: [(&str, &str); 12] = [
    ("leftHip", "leftShoulder"),
    ("leftElbow", "leftShoulder"),
    ("leftElbow", "leftWrist"),
    ("leftHip", "leftKnee"),
    ("leftKnee", "leftAnkle"),
    ("rightHip", "rightShoulder"),
    ("rightElbow", "rightShoulder"),
    ("rightElbow", "rightWrist"),
    ("rightHip", "rightKnee"),
    ("rightKnee", "rightAnkle"),
    ("leftShoulder", "rightShoulder"),
    ("leftHip", "rightHip"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub part: String,
    pub score: f64,
    pub position: Position,
}

/// Estimated body pose for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    #[serde(default)]
    pub score: f64,
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn keypoint(&self, part: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|k| k.part == part)
    }

    /// Keypoints worth drawing at the given confidence floor.
    pub fn confident_keypoints(&self, min_confidence: f64) -> impl Iterator<Item = &Keypoint> {
        self.keypoints
            .iter()
            .filter(move |k| k.score >= min_confidence)
    }

    /// Bones whose two ends are both confident.
    pub fn skeleton(&self, min_confidence: f64) -> Vec<(&Keypoint, &Keypoint)> {
        CONNECTED_PARTS
            .iter()
            .filter_map(|(a, b)| {
                let a = self.keypoint(a)?;
                let b = self.keypoint(b)?;
                (a.score >= min_confidence && b.score >= min_confidence).then_some((a, b))
            })
            .collect()
    }
}
