use std::sync::Arc;
use tracing::info;

use super::navigation::{Navigator, Page};
use crate::render::Renderer;
use crate::store::ResultStore;

/// Entry page: takes the model location and starts a fresh game.
pub struct SetupView {
    store: Arc<dyn ResultStore>,
    renderer: Arc<dyn Renderer>,
    navigator: Arc<dyn Navigator>,
}

impl SetupView {
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

    /// Handles the start button. Returns whether the game page was opened.
    pub fn submit(&self, model_url: &str) -> bool {
        self.store.clear();

        let model_url = model_url.trim();
        if model_url.is_empty() {
            self.renderer.alert("Please enter a model URL.");
            return false;
        }

        info!("Starting game with model {}", model_url);
        self.navigator.navigate(Page::Game {
            model_url: Some(model_url.to_string()),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ChannelNavigator;
    use crate::render::RecordingRenderer;
    use crate::store::MemoryStore;

    #[test]
    fn submit_clears_old_results_and_opens_the_game() {
        let store = MemoryStore::new();
        store.put("finalScore", "5.5".to_string());
        let (navigator, mut pages) = ChannelNavigator::new();
        let view = SetupView::new(
            Arc::new(store.clone()),
            Arc::new(RecordingRenderer::new()),
            Arc::new(navigator),
        );

        assert!(view.submit("https://models.test/poses/"));
        assert!(store.is_empty());
        assert_eq!(
            pages.try_recv().unwrap(),
            Page::Game {
                model_url: Some("https://models.test/poses/".to_string())
            }
        );
    }

    #[test]
    fn empty_input_alerts_and_stays() {
        let renderer = RecordingRenderer::new();
        let (navigator, mut pages) = ChannelNavigator::new();
        let view = SetupView::new(
            Arc::new(MemoryStore::new()),
            Arc::new(renderer.clone()),
            Arc::new(navigator),
        );

        assert!(!view.submit("  "));
        assert_eq!(renderer.alerts(), vec!["Please enter a model URL.".to_string()]);
        assert!(pages.try_recv().is_err());
    }
}
