use std::time::Duration;

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use crate::common::Frame;
use crate::error::ExtractionError;
use crate::extraction::{NameExtractor, UNKNOWN_NAME};

pub const DEMO_NAMES: [&str; 3] = ["John Doe", "Jane Smith", "Alice Johnson"];

/// Demo collaborator: pretends to analyse for a while, then "finds" one of a
/// fixed set of names. Never touches the network.
pub struct SimulatedExtractor {
    names: Vec<String>,
    step: Duration,
    steps: u32,
}

impl Default for SimulatedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedExtractor {
    pub fn new() -> Self {
        Self {
            names: DEMO_NAMES.iter().map(|name| name.to_string()).collect(),
            step: Duration::from_millis(100),
            steps: 20,
        }
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ramp(mut self, step: Duration, steps: u32) -> Self {
        self.step = step;
        self.steps = steps;
        self
    }

    pub fn ramp_duration(&self) -> Duration {
        self.step * self.steps
    }
}

#[async_trait]
impl NameExtractor for SimulatedExtractor {
    async fn extract(&self, frame: Frame) -> Result<String, ExtractionError> {
        tracing::info!("Simulating analysis of frame {}", frame.frame_id());
        drop(frame);
        for done in 1..=self.steps {
            tokio::time::sleep(self.step).await;
            tracing::trace!("Simulated analysis {}%", done * 100 / self.steps);
        }
        let name = self
            .names
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        Ok(name)
    }

    fn name(&self) -> &'static str {
        "SimulatedExtractor"
    }
}
