pub mod extraction_service;
pub mod name_extractor;
pub mod openrouter;
pub mod payload;
pub mod simulated;

#[cfg(test)]
pub(crate) mod scripted;

pub use extraction_service::{BoundedExtraction, ExtractionService};
pub use name_extractor::{ExtractedName, NameExtractor, UNKNOWN_NAME};
pub use openrouter::OpenRouterExtractor;
pub use payload::ImagePayload;
pub use simulated::SimulatedExtractor;
