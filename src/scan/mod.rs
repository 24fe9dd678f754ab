pub mod controller;
pub mod feedback;
pub mod status;

pub use controller::{ScanController, ScanControllerBuilder};
pub use feedback::{AudioCue, CueSound, FeedbackSink, NoopFeedback, TracingFeedback};
pub use status::{ScanSnapshot, ScanStatus, TriggerOutcome};
