use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::task::{Context, Poll};
use futures::Future;
use tower::timeout::error::Elapsed;
use tower::timeout::Timeout;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};

use crate::common::Frame;
use crate::error::ScanError;
use crate::extraction::{ExtractedName, NameExtractor};

/// Adapts a [`NameExtractor`] to a tower service so it can be layered.
#[derive(Clone)]
pub struct ExtractionService {
    inner: Arc<dyn NameExtractor>,
}

impl ExtractionService {
    pub fn new(inner: Arc<dyn NameExtractor>) -> Self {
        Self { inner }
    }

    pub fn with_timeout(self, timeout: Duration) -> BoundedExtraction {
        BoundedExtraction {
            service: ServiceBuilder::new().timeout(timeout).service(self),
            timeout,
        }
    }
}

impl Service<Frame> for ExtractionService {
    type Response = ExtractedName;
    type Error = ScanError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, frame: Frame) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let frame_id = frame.frame_id();
            let raw = inner.extract(frame).await.map_err(|e| {
                tracing::error!("{} failed on frame {}: {}", inner.name(), frame_id, e);
                ScanError::from(e)
            })?;
            tracing::debug!("{} answered {:?} for frame {}", inner.name(), raw, frame_id);
            Ok(ExtractedName::classify(&raw))
        })
    }
}

/// An extraction service that gives up after a fixed deadline.
#[derive(Clone)]
pub struct BoundedExtraction {
    service: Timeout<ExtractionService>,
    timeout: Duration,
}

impl BoundedExtraction {
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run(&self, frame: Frame) -> Result<ExtractedName, ScanError> {
        self.service
            .clone()
            .oneshot(frame)
            .await
            .map_err(|e| self.classify_error(e))
    }

    fn classify_error(&self, error: BoxError) -> ScanError {
        if error.is::<Elapsed>() {
            tracing::warn!("Extraction exceeded {}ms", self.timeout.as_millis());
            return ScanError::ExtractionTimeout(self.timeout);
        }
        match error.downcast::<ScanError>() {
            Ok(scan_error) => *scan_error,
            Err(other) => ScanError::ExtractionTransport(other.to_string()),
        }
    }
}
