use serde::{Deserialize, Serialize};

use crate::common::{Label, Snapshot};
use crate::error::AppError;
use crate::session::scoring;
use crate::store::{CAPTURED_POSES_KEY, FINAL_SCORE_KEY, ResultStore};

/// A stored snapshot and the label it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub image: Snapshot,
    pub label: Label,
}

/// Final payload handed across the page boundary when a session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    final_score: f64,
    captures: Vec<Capture>,
}

impl SessionResult {
    pub fn new(score: u32, time_remaining: u32, captures: Vec<Capture>) -> Self {
        Self {
            final_score: scoring::final_score(score, time_remaining),
            captures,
        }
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    /// Writes the two handoff keys.
    pub fn write_to(&self, store: &dyn ResultStore) -> Result<(), AppError> {
        let captures = serde_json::to_string(&self.captures)?;
        store.put(FINAL_SCORE_KEY, self.final_score.to_string());
        store.put(CAPTURED_POSES_KEY, captures);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn handoff_layout_matches_the_results_page() {
        let store = MemoryStore::new();
        let result = SessionResult::new(
            4,
            35,
            vec![Capture {
                image: Snapshot::from_data_uri("data:image/png;base64,AAAA"),
                label: Label::from("sit"),
            }],
        );
        result.write_to(&store).unwrap();

        assert_eq!(store.get(FINAL_SCORE_KEY).as_deref(), Some("4.3"));
        let captures: serde_json::Value =
            serde_json::from_str(&store.get(CAPTURED_POSES_KEY).unwrap()).unwrap();
        assert_eq!(
            captures,
            serde_json::json!([{"image": "data:image/png;base64,AAAA", "label": "sit"}])
        );
    }

    #[test]
    fn whole_scores_serialize_without_a_fraction() {
        let store = MemoryStore::new();
        SessionResult::new(2, 0, Vec::new()).write_to(&store).unwrap();
        assert_eq!(store.get(FINAL_SCORE_KEY).as_deref(), Some("2"));
        assert_eq!(store.get(CAPTURED_POSES_KEY).as_deref(), Some("[]"));
    }
}
