use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use uuid::Uuid;

use crate::error::FrameError;

// Matches the browser's default screenshot quality for image/jpeg.
pub const JPEG_QUALITY: u8 = 92;

/// A single still captured from a camera source.
#[derive(Clone)]
pub struct Frame {
    camera_id: Uuid,
    image: Arc<DynamicImage>,
    captured_at: DateTime<Utc>,
    frame_id: Uuid,
}

impl Frame {
    pub fn new(
        camera_id: Uuid,
        image: Arc<DynamicImage>,
        captured_at: DateTime<Utc>,
        frame_id: Uuid,
    ) -> Self {
        Self {
            camera_id,
            image,
            captured_at,
            frame_id,
        }
    }

    /// Stamps a freshly captured image with the current time and a new id.
    pub fn capture(camera_id: Uuid, image: Arc<DynamicImage>) -> Self {
        Self::new(camera_id, image, Utc::now(), Uuid::new_v4())
    }

    pub fn camera_id(&self) -> Uuid {
        self.camera_id
    }

    pub fn frame_id(&self) -> Uuid {
        self.frame_id
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn to_jpeg(&self) -> Result<Vec<u8>, FrameError> {
        // JPEG has no alpha channel.
        let rgb = self.image.to_rgb8();
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(|e| FrameError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("camera_id", &self.camera_id)
            .field("frame_id", &self.frame_id)
            .field("captured_at", &self.captured_at)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn solid_frame(width: u32, height: u32) -> Frame {
    use image::{ImageBuffer, Rgb};

    let img = DynamicImage::ImageRgb8(ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(
        width,
        height,
        Rgb([200, 180, 160]),
    ));
    Frame::capture(Uuid::new_v4(), Arc::new(img))
}
