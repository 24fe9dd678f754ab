use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use uuid::Uuid;

use crate::camera::CameraSource;
use crate::common::Frame;
use crate::error::FrameError;

/// Serves the same image on every read. Used by the command line runner.
pub struct StillImageCamera {
    id: Uuid,
    image: Arc<DynamicImage>,
}

impl StillImageCamera {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| FrameError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::info!(
            "Loaded still image {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            image: Arc::new(image),
        }
    }
}

impl CameraSource for StillImageCamera {
    fn current_frame(&self) -> Option<Frame> {
        Some(Frame::capture(self.id, Arc::clone(&self.image)))
    }
}
