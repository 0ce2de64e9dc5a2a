use std::sync::Arc;
use tracing::{info, warn};

use super::navigation::{Navigator, Page};
use crate::render::Renderer;
use crate::session::Capture;
use crate::store::{CAPTURED_POSES_KEY, FINAL_SCORE_KEY, ResultStore};

/// What the results page shows. Missing or unreadable values degrade to an empty state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsView {
    score: Option<f64>,
    captures: Vec<Capture>,
}

impl ResultsView {
    pub fn load(store: &dyn ResultStore) -> Self {
        let score = store
            .get(FINAL_SCORE_KEY)
            .and_then(|raw| match raw.trim().parse::<f64>() {
                Ok(score) if score.is_finite() => Some(score),
                _ => {
                    warn!("Ignoring unreadable final score {:?}", raw);
                    None
                }
            });

        let captures = store
            .get(CAPTURED_POSES_KEY)
            .and_then(|raw| match serde_json::from_str::<Vec<Capture>>(&raw) {
                Ok(captures) => Some(captures),
                Err(e) => {
                    warn!("Ignoring unreadable capture log: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self { score, captures }
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Score with one decimal place, or nothing when there is no score.
    pub fn score_text(&self) -> String {
        self.score
            .map(|score| format!("{score:.1}"))
            .unwrap_or_default()
    }

    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    pub fn is_empty(&self) -> bool {
        self.score.is_none() && self.captures.is_empty()
    }
}

pub struct ScoreView {
    store: Arc<dyn ResultStore>,
    renderer: Arc<dyn Renderer>,
    navigator: Arc<dyn Navigator>,
}

impl ScoreView {
    pub fn new(
        store: Arc<dyn ResultStore>,
        renderer: Arc<dyn Renderer>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            renderer,
            navigator,
        }
    }

    pub fn show(&self) -> ResultsView {
        let results = ResultsView::load(self.store.as_ref());
        info!(
            "Showing results: score {:?}, {} captures",
            results.score(),
            results.captures().len()
        );
        self.renderer.show_results(&results);
        results
    }

    /// Handles the play-again button.
    pub fn play_again(&self) {
        self.store.clear();
        self.navigator.navigate(Page::Setup);
    }
}
