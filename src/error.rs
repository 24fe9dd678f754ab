use std::time::Duration;

use thiserror::Error;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Scan Error: {0}")]
    Scan(#[from] ScanError),
    #[error("Frame Error: {0}")]
    Frame(#[from] FrameError),
    #[error("Scan cancelled before a name was verified")]
    Cancelled,
    #[error("Scan did not verify a name: {0}")]
    Unverified(String),
}

// Errors surfaced by one scan attempt. Everything except `Configuration` is
// soft: it becomes a `Failed` status and the session stays retryable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("No frame available from the camera")]
    Capture,
    #[error("no name found")]
    ExtractionUnresolved,
    #[error("{0}")]
    ExtractionTransport(String),
    #[error("Name extraction timed out after {}ms", .0.as_millis())]
    ExtractionTimeout(Duration),
    #[error("{0}")]
    Configuration(String),
}

impl ScanError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::Configuration(_))
    }
}

// Errors raised by an extraction collaborator while talking to its backend.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] FrameError),
}

impl From<ExtractionError> for ScanError {
    fn from(error: ExtractionError) -> Self {
        ScanError::ExtractionTransport(error.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Failed to load image from '{path}': {reason}")]
    Load { path: String, reason: String },
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Invalid image payload: {0}")]
    Payload(String),
}
