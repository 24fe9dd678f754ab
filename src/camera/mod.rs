pub mod camera_source;
pub mod still_image;

pub use camera_source::{CameraFeed, CameraSource, WatchCamera};
pub use still_image::StillImageCamera;
