pub mod camera;
pub mod common;
pub mod config;
pub mod error;
pub mod extraction;
pub mod scan;

pub use error::{AppError, ExtractionError, FrameError, ScanError};

pub use camera::{CameraFeed, CameraSource, StillImageCamera, WatchCamera};
pub use common::Frame;
pub use crate::config::{Configuration, ScanConfig, ScanMode};
pub use extraction::{NameExtractor, OpenRouterExtractor, SimulatedExtractor};
pub use scan::{ScanController, ScanControllerBuilder, ScanSnapshot, ScanStatus, TriggerOutcome};
