use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// The three views of the game. Moving between them is a full navigation:
/// only the result store and the model location survive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Setup,
    Game { model_url: Option<String> },
    Score,
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, page: Page);
}

/// Navigator that queues requested pages for whoever drives the app.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    page_tx: UnboundedSender<Page>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, UnboundedReceiver<Page>) {
        let (page_tx, page_rx) = mpsc::unbounded_channel();
        (Self { page_tx }, page_rx)
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, page: Page) {
        debug!("Navigating to {:?}", page);
        if let Err(e) = self.page_tx.send(page) {
            warn!("Navigation dropped, nobody is listening: {:?}", e.0);
        }
    }
}
