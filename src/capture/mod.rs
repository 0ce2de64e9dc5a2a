pub mod image_dir;

pub use image_dir::ImageDirSource;

use async_trait::async_trait;

use crate::common::Frame;
use crate::error::AppError;

/// Supplies video frames on demand.
#[async_trait]
pub trait FrameSource: Send {
    /// Prepares the source; frames are available once this returns.
    async fn start(&mut self) -> Result<(), AppError>;

    /// Returns the most recent frame without blocking.
    fn latest(&mut self) -> Result<Frame, AppError>;
}
