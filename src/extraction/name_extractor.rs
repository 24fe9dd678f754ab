use async_trait::async_trait;

use crate::common::Frame;
use crate::error::{ExtractionError, ScanError};

/// Sentinel a vision model answers with when the card shows no readable name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Turns one still frame into the name printed on the ID card in it.
#[async_trait]
pub trait NameExtractor: Send + Sync {
    /// Fails fast when the collaborator cannot work at all, e.g. a missing
    /// credential. Called before the first capture.
    fn ensure_configured(&self) -> Result<(), ScanError> {
        Ok(())
    }

    /// Takes ownership of the frame; it is dropped once the call finishes.
    async fn extract(&self, frame: Frame) -> Result<String, ExtractionError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedName {
    Name(String),
    Unresolved,
}

impl ExtractedName {
    pub fn classify(raw: &str) -> Self {
        let name = raw.trim();
        if name.is_empty() || name == UNKNOWN_NAME {
            ExtractedName::Unresolved
        } else {
            ExtractedName::Name(name.to_string())
        }
    }
}
