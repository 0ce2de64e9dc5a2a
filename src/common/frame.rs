use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// A single video frame. Cloning shares the underlying image buffer.
#[derive(Clone)]
pub struct Frame {
    frame_id: Uuid,
    image: Arc<DynamicImage>,
    captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            frame_id: Uuid::new_v4(),
            image: Arc::new(image),
            captured_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.frame_id
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Encodes the frame as a PNG data URI.
    pub fn snapshot(&self) -> Result<Snapshot, AppError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(Snapshot(format!(
            "{}{}",
            PNG_DATA_URI_PREFIX,
            STANDARD.encode(&bytes)
        )))
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("frame_id", &self.frame_id)
            .field("dimensions", &self.dimensions())
            .field("captured_at", &self.captured_at)
            .finish()
    }
}

/// Opaque still image of a frame, stored as a data URI string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn from_data_uri(data_uri: impl Into<String>) -> Self {
        Self(data_uri.into())
    }

    pub fn as_data_uri(&self) -> &str {
        &self.0
    }

    /// Decodes the image back out of a PNG data URI, if it is one.
    pub fn decode(&self) -> Result<DynamicImage, AppError> {
        let payload = self
            .0
            .strip_prefix(PNG_DATA_URI_PREFIX)
            .ok_or_else(|| AppError::Snapshot("not a PNG data URI".to_string()))?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| AppError::Snapshot(format!("bad base64 payload: {e}")))?;
        Ok(image::load_from_memory_with_format(&bytes, ImageFormat::Png)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn solid(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
            width,
            height,
            Rgb([1, 2, 3]),
        ))
    }

    #[test]
    fn cloning_frame_shares_image_buffer() {
        let f1 = Frame::new(solid(16, 16));
        let f2 = f1.clone();
        assert!(Arc::ptr_eq(&f1.image, &f2.image));
        assert_eq!(f1.id(), f2.id());
    }

    #[test]
    fn snapshot_is_a_png_data_uri_of_the_frame() {
        let frame = Frame::new(solid(8, 4));
        let snapshot = frame.snapshot().unwrap();
        assert!(snapshot.as_data_uri().starts_with("data:image/png;base64,"));

        let decoded = snapshot.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
        assert_eq!(decoded.to_rgb8().get_pixel(3, 2), &Rgb([1, 2, 3]));
    }

    #[test]
    fn decoding_a_foreign_data_uri_fails() {
        let snapshot = Snapshot::from_data_uri("data:image/jpeg;base64,AAAA");
        assert!(matches!(snapshot.decode(), Err(AppError::Snapshot(_))));

        let snapshot = Snapshot::from_data_uri("data:image/png;base64,@@not base64@@");
        assert!(matches!(snapshot.decode(), Err(AppError::Snapshot(_))));
    }
}
