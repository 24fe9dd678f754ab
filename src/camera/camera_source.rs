use std::sync::Arc;

use image::DynamicImage;
use tokio::sync::watch;
use uuid::Uuid;

use crate::common::Frame;

/// Read-only access to whatever the camera is currently showing.
///
/// The device itself is owned by the view; a scan controller only samples it.
pub trait CameraSource: Send + Sync {
    fn current_frame(&self) -> Option<Frame>;
}

/// Publishing side of a live camera stream, held by the view.
pub struct CameraFeed {
    id: Uuid,
    frame_tx: watch::Sender<Option<Arc<DynamicImage>>>,
}

impl CameraFeed {
    pub fn new() -> (Self, WatchCamera) {
        let id = Uuid::new_v4();
        let (frame_tx, frame_rx) = watch::channel(None);
        (Self { id, frame_tx }, WatchCamera { id, frame_rx })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replaces the latest image. Readers never see a backlog.
    pub fn publish(&self, image: DynamicImage) {
        self.frame_tx.send_replace(Some(Arc::new(image)));
    }

    /// Signals that no image is available, e.g. while the device warms up.
    pub fn clear(&self) {
        self.frame_tx.send_replace(None);
    }

    pub fn camera(&self) -> WatchCamera {
        WatchCamera {
            id: self.id,
            frame_rx: self.frame_tx.subscribe(),
        }
    }
}

#[derive(Clone)]
pub struct WatchCamera {
    id: Uuid,
    frame_rx: watch::Receiver<Option<Arc<DynamicImage>>>,
}

impl CameraSource for WatchCamera {
    fn current_frame(&self) -> Option<Frame> {
        // Closed feed: the view has torn the stream down.
        if self.frame_rx.has_changed().is_err() {
            return None;
        }
        self.frame_rx
            .borrow()
            .as_ref()
            .map(|image| Frame::capture(self.id, Arc::clone(image)))
    }
}
