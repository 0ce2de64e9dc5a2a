use async_trait::async_trait;
use image::DynamicImage;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::FrameSource;
use crate::common::Frame;
use crate::error::AppError;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Webcam stand-in that cycles through still images from a directory.
/// Frames come out square and, when `flip` is set, mirrored like a selfie camera.
pub struct ImageDirSource {
    dir: Option<PathBuf>,
    size: u32,
    flip: bool,
    frames: Vec<DynamicImage>,
    cursor: usize,
}

impl ImageDirSource {
    pub fn new(dir: impl Into<PathBuf>, size: u32, flip: bool) -> Self {
        Self {
            dir: Some(dir.into()),
            size,
            flip,
            frames: Vec::new(),
            cursor: 0,
        }
    }

    /// Source over images already in memory; ready without `start`.
    pub fn from_images(images: Vec<DynamicImage>, size: u32, flip: bool) -> Self {
        let frames = images
            .into_iter()
            .map(|image| prepare(image, size, flip))
            .collect();
        Self {
            dir: None,
            size,
            flip,
            frames,
            cursor: 0,
        }
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

fn prepare(image: DynamicImage, size: u32, flip: bool) -> DynamicImage {
    let image = image.resize_to_fill(size, size, FilterType::Triangle);
    if flip { image.fliph() } else { image }
}

#[async_trait]
impl FrameSource for ImageDirSource {
    async fn start(&mut self) -> Result<(), AppError> {
        let Some(dir) = self.dir.clone() else {
            return Ok(());
        };

        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if Self::is_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let (size, flip) = (self.size, self.flip);
        let frames = tokio::task::spawn_blocking(move || {
            paths
                .into_iter()
                .filter_map(|path| match image::open(&path) {
                    Ok(image) => {
                        debug!("Loaded frame image {}", path.display());
                        Some(prepare(image, size, flip))
                    }
                    Err(e) => {
                        warn!("Skipping unreadable image {}: {}", path.display(), e);
                        None
                    }
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| AppError::FrameSource(e.to_string()))?;

        if frames.is_empty() {
            return Err(AppError::FrameSource(format!(
                "no images found in {}",
                dir.display()
            )));
        }
        info!("Frame source ready with {} images", frames.len());
        self.frames = frames;
        self.cursor = 0;
        Ok(())
    }

    fn latest(&mut self) -> Result<Frame, AppError> {
        if self.frames.is_empty() {
            return Err(AppError::FrameSource(
                "frame source has not been started".to_string(),
            ));
        }
        let image = self.frames[self.cursor % self.frames.len()].clone();
        self.cursor = self.cursor.wrapping_add(1);
        Ok(Frame::new(image))
    }
}
