pub mod game;
pub mod navigation;
pub mod player;
pub mod score;
pub mod setup;

pub use game::GameView;
pub use navigation::{ChannelNavigator, Navigator, Page};
pub use player::AutoPlayer;
pub use score::{ResultsView, ScoreView};
pub use setup::SetupView;

use std::sync::Arc;
use tracing::info;

use crate::capture::{FrameSource, ImageDirSource};
use crate::common::Label;
use crate::config::Configuration;
use crate::error::AppError;
use crate::pose::ModelLoader;
use crate::render::Renderer;
use crate::store::{MemoryStore, ResultStore};

type FrameSourceFactory = Box<dyn Fn(&Configuration) -> Box<dyn FrameSource> + Send + Sync>;

/// Walks the pages from setup to results in one process.
pub struct App {
    configuration: Configuration,
    loader: Arc<dyn ModelLoader>,
    renderer: Arc<dyn Renderer>,
    store: Arc<dyn ResultStore>,
    frame_source: FrameSourceFactory,
    picks: Vec<Label>,
}

impl App {
    pub fn new(
        configuration: Configuration,
        loader: Arc<dyn ModelLoader>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            configuration,
            loader,
            renderer,
            store: Arc::new(MemoryStore::new()),
            frame_source: Box::new(|configuration: &Configuration| -> Box<dyn FrameSource> {
                Box::new(ImageDirSource::new(
                    "frames",
                    configuration.frame_size,
                    configuration.flip,
                ))
            }),
            picks: Vec::new(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ResultStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_frame_source<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Configuration) -> Box<dyn FrameSource> + Send + Sync + 'static,
    {
        self.frame_source = Box::new(factory);
        self
    }

    /// Labels the player will pick, in order, before falling back to board order.
    pub fn with_picks(mut self, picks: Vec<Label>) -> Self {
        self.picks = picks;
        self
    }

    /// Submits `model_url` on the setup page and follows navigation until the
    /// results page is shown.
    pub async fn run(&self, model_url: &str) -> Result<ResultsView, AppError> {
        let (navigator, mut pages) = ChannelNavigator::new();
        let navigator: Arc<dyn Navigator> = Arc::new(navigator);
        navigator.navigate(Page::Setup);

        while let Ok(page) = pages.try_recv() {
            info!("Opening {:?}", page);
            match page {
                Page::Setup => {
                    let setup = SetupView::new(
                        self.store.clone(),
                        self.renderer.clone(),
                        navigator.clone(),
                    );
                    if !setup.submit(model_url) {
                        return Err(AppError::ConfigurationMissing);
                    }
                }
                Page::Game { model_url } => {
                    let game = GameView::new(
                        self.configuration.clone(),
                        self.loader.clone(),
                        self.renderer.clone(),
                        self.store.clone(),
                        navigator.clone(),
                    );
                    game.run(
                        model_url.as_deref(),
                        (self.frame_source)(&self.configuration),
                        self.picks.clone(),
                    )
                    .await?;
                }
                Page::Score => {
                    let score = ScoreView::new(
                        self.store.clone(),
                        self.renderer.clone(),
                        navigator.clone(),
                    );
                    return Ok(score.show());
                }
            }
        }

        Err(AppError::InvalidConfiguration(
            "navigation stopped before the results page".to_string(),
        ))
    }
}
