use std::sync::Arc;
use tracing::{error, info};

use super::navigation::{Navigator, Page};
use super::player::AutoPlayer;
use crate::capture::FrameSource;
use crate::common::Label;
use crate::config::Configuration;
use crate::coordinator::CoordinatorBuilder;
use crate::error::AppError;
use crate::pose::{ModelLoader, ModelLocation};
use crate::render::Renderer;
use crate::session::SessionResult;
use crate::store::ResultStore;

const MODEL_LOAD_ALERT: &str = "Failed to load model. Please check the URL and try again.";
const CAMERA_ALERT: &str = "Failed to start the camera.";

/// The active-session page: loads the model, starts the camera and plays one session.
pub struct GameView {
    configuration: Configuration,
    loader: Arc<dyn ModelLoader>,
    renderer: Arc<dyn Renderer>,
    store: Arc<dyn ResultStore>,
    navigator: Arc<dyn Navigator>,
}

impl GameView {
    pub fn new(
        configuration: Configuration,
        loader: Arc<dyn ModelLoader>,
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn ResultStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            configuration,
            loader,
            renderer,
            store,
            navigator,
        }
    }

    /// Plays a session to its end. Setup failures alert the player, redirect
    /// to the setup page and are returned.
    pub async fn run(
        &self,
        model_url: Option<&str>,
        mut frame_source: Box<dyn FrameSource>,
        picks: Vec<Label>,
    ) -> Result<Option<SessionResult>, AppError> {
        let location = match ModelLocation::from_param(model_url) {
            Ok(location) => location,
            Err(e) => return Err(self.redirect(e, None)),
        };

        let classifier = match self.loader.load(&location).await {
            Ok(classifier) => classifier,
            Err(e) => return Err(self.redirect(e, Some(MODEL_LOAD_ALERT))),
        };

        if let Err(e) = frame_source.start().await {
            return Err(self.redirect(e, Some(CAMERA_ALERT)));
        }

        let built = CoordinatorBuilder::new(self.configuration.clone())
            .classifier(classifier)
            .frame_source(frame_source)
            .renderer(self.renderer.clone())
            .store(self.store.clone())
            .navigator(self.navigator.clone())
            .build();
        let mut coordinator = match built {
            Ok(coordinator) => coordinator,
            // A label set the session cannot start with means the model is unusable.
            Err(AppError::Session(e)) => {
                let e = AppError::ModelLoad(format!("model labels rejected: {e}"));
                return Err(self.redirect(e, Some(MODEL_LOAD_ALERT)));
            }
            Err(e) => return Err(e),
        };

        let controller = coordinator.controller();
        let cancel_token = controller.lock().await.cancellation();
        let player = tokio::spawn(AutoPlayer::new(picks).run(controller, cancel_token));

        let result = coordinator.join().await;
        if let Err(e) = player.await {
            error!("Player task failed: {}", e);
        }
        info!("Game over");
        Ok(result)
    }

    fn redirect(&self, e: AppError, message: Option<&str>) -> AppError {
        error!("Cannot start game: {}", e);
        match message {
            Some(message) => self.renderer.alert(message),
            None => self.renderer.alert(&e.to_string()),
        }
        self.navigator.navigate(Page::Setup);
        e
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ChannelNavigator;
    use crate::capture::ImageDirSource;
    use crate::pose::{PoseClassifier, ReplayClassifier, ReplayModelLoader};
    use crate::render::RecordingRenderer;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Hands out a fixed label set without reading any files.
    struct FixedLabels(Vec<&'static str>);

    #[async_trait]
    impl ModelLoader for FixedLabels {
        async fn load(&self, _location: &ModelLocation) -> Result<Arc<dyn PoseClassifier>, AppError> {
            let labels = self.0.iter().map(|l| Label::from(*l)).collect();
            Ok(Arc::new(ReplayClassifier::new(labels, Vec::new())))
        }
    }

    fn view_with(
        loader: Arc<dyn ModelLoader>,
        renderer: &RecordingRenderer,
    ) -> (GameView, UnboundedReceiver<Page>) {
        let (navigator, pages) = ChannelNavigator::new();
        (
            GameView::new(
                Configuration::default(),
                loader,
                Arc::new(renderer.clone()),
                Arc::new(MemoryStore::new()),
                Arc::new(navigator),
            ),
            pages,
        )
    }

    fn view(renderer: &RecordingRenderer) -> (GameView, UnboundedReceiver<Page>) {
        view_with(Arc::new(ReplayModelLoader::new()), renderer)
    }

    fn frames() -> Box<dyn FrameSource> {
        Box::new(ImageDirSource::from_images(
            vec![DynamicImage::ImageRgb8(ImageBuffer::from_pixel(4, 4, Rgb([0, 0, 0])))],
            4,
            false,
        ))
    }

    #[tokio::test]
    async fn missing_model_url_redirects_to_setup() {
        let renderer = RecordingRenderer::new();
        let (view, mut pages) = view(&renderer);

        let result = view.run(None, frames(), Vec::new()).await;
        assert!(matches!(result, Err(AppError::ConfigurationMissing)));
        assert_eq!(renderer.alerts(), vec!["Model URL not found!".to_string()]);
        assert_eq!(pages.try_recv().unwrap(), Page::Setup);
    }

    #[tokio::test]
    async fn unloadable_model_redirects_to_setup() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = RecordingRenderer::new();
        let (view, mut pages) = view(&renderer);

        let model_url = format!("{}/", dir.path().display());
        let result = view.run(Some(model_url.as_str()), frames(), Vec::new()).await;
        assert!(matches!(result, Err(AppError::ModelLoad(_))));
        assert_eq!(renderer.alerts(), vec![MODEL_LOAD_ALERT.to_string()]);
        assert_eq!(pages.try_recv().unwrap(), Page::Setup);
    }

    #[tokio::test]
    async fn repeated_labels_in_metadata_redirect_to_setup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("model.json"), "{}").unwrap();
        std::fs::write(dir.path().join("metadata.json"), r#"{"labels":["sit","sit"]}"#).unwrap();
        let renderer = RecordingRenderer::new();
        let (view, mut pages) = view(&renderer);

        let model_url = format!("{}/", dir.path().display());
        let result = view.run(Some(model_url.as_str()), frames(), Vec::new()).await;
        assert!(matches!(result, Err(AppError::ModelLoad(_))));
        assert!(result.is_err_and(|e| e.is_setup_failure()));
        assert_eq!(renderer.alerts(), vec![MODEL_LOAD_ALERT.to_string()]);
        assert_eq!(pages.try_recv().unwrap(), Page::Setup);
    }

    #[tokio::test]
    async fn classifier_labels_the_session_rejects_redirect_to_setup() {
        let renderer = RecordingRenderer::new();
        let (view, mut pages) = view_with(Arc::new(FixedLabels(vec!["sit", "sit"])), &renderer);

        let result = view.run(Some("models/"), frames(), Vec::new()).await;
        assert!(matches!(result, Err(AppError::ModelLoad(_))));
        assert_eq!(renderer.alerts(), vec![MODEL_LOAD_ALERT.to_string()]);
        assert_eq!(pages.try_recv().unwrap(), Page::Setup);
    }
}
