use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::camera::CameraSource;
use crate::config::{ScanConfig, ScanMode};
use crate::error::ScanError;
use crate::extraction::{BoundedExtraction, ExtractedName, ExtractionService, NameExtractor};
use crate::scan::feedback::{AudioCue, FeedbackSink, NoopFeedback};
use crate::scan::status::{
    ScanSnapshot, ScanStatus, TriggerOutcome, ANALYZING_MESSAGE,
    ANALYZING_PROGRESS, COMPLETE_PROGRESS, NOT_FOUND_MESSAGE, NO_FRAME_MESSAGE,
};

type ResolvedCallback = Arc<dyn Fn(String) + Send + Sync>;
type CancelCallback = Arc<dyn Fn() + Send + Sync>;

/// Mutable session bookkeeping. Never held across an `.await`.
#[derive(Default)]
struct SessionState {
    epoch: u64,
    active: bool,
    in_flight: bool,
    verified: bool,
    delivered: bool,
    attempts: u64,
    ticker: Option<CancellationToken>,
}

struct Inner {
    camera: Arc<dyn CameraSource>,
    extractor: Arc<dyn NameExtractor>,
    extraction: BoundedExtraction,
    feedback: Arc<dyn FeedbackSink>,
    mode: ScanMode,
    confirmation_delay: Duration,
    on_resolved: Option<ResolvedCallback>,
    on_cancel: Option<CancelCallback>,
    state: Mutex<SessionState>,
    snapshot_tx: watch::Sender<ScanSnapshot>,
}

/// Drives one ID-scan session: capture a still, ask the extractor for a
/// name, and report either a verified name or a retryable failure.
///
/// Only one extraction call is ever outstanding. Results are tagged with the
/// epoch that started them; anything that lands after `cancel()`, a restart,
/// or drop is discarded. Must be used from within a Tokio runtime.
pub struct ScanController {
    inner: Arc<Inner>,
}

impl ScanController {
    pub fn builder(config: ScanConfig) -> ScanControllerBuilder {
        ScanControllerBuilder::new(config)
    }

    /// Opens (or reopens) the session. In auto mode this also starts the
    /// periodic ticker; the first tick fires one full interval from now.
    pub fn start(&self) -> Result<(), ScanError> {
        self.inner.extractor.ensure_configured()?;

        let mut state = self.inner.state();
        self.inner.reset(&mut state);
        state.active = true;
        let epoch = state.epoch;

        if let ScanMode::Auto { interval } = self.inner.mode {
            let token = CancellationToken::new();
            state.ticker = Some(token.clone());
            tokio::spawn(run_ticker(Arc::clone(&self.inner), token, interval));
            info!(
                "Scan session {} started in auto mode every {}ms",
                epoch,
                interval.as_millis()
            );
        } else {
            info!("Scan session {} started in manual mode", epoch);
        }
        Ok(())
    }

    /// Starts one attempt unless another is still in flight.
    pub fn trigger_scan(&self) -> TriggerOutcome {
        self.inner.trigger()
    }

    /// Abandons the session. A late extraction result is ignored and the
    /// resolved callback will not fire for it.
    pub fn cancel(&self) {
        let on_cancel = {
            let mut state = self.inner.state();
            let was_active = state.active;
            self.inner.reset(&mut state);
            info!("Scan session cancelled, now at epoch {}", state.epoch);
            if was_active {
                self.inner.on_cancel.clone()
            } else {
                None
            }
        };
        if let Some(on_cancel) = on_cancel {
            on_cancel();
        }
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.inner.state().in_flight
    }

    pub fn attempts(&self) -> u64 {
        self.inner.state().attempts
    }
}

impl Drop for ScanController {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        self.inner.reset(&mut state);
    }
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, epoch: u64, status: ScanStatus, progress: u8, message: impl Into<String>) {
        self.snapshot_tx.send_replace(ScanSnapshot {
            epoch,
            status,
            progress,
            message: message.into(),
        });
    }

    /// Invalidates everything belonging to the current epoch.
    fn reset(&self, state: &mut SessionState) {
        if let Some(ticker) = state.ticker.take() {
            ticker.cancel();
        }
        state.epoch += 1;
        state.active = false;
        state.in_flight = false;
        state.verified = false;
        state.delivered = false;
        self.snapshot_tx.send_replace(ScanSnapshot::idle(state.epoch));
    }

    fn trigger(self: &Arc<Self>) -> TriggerOutcome {
        let mut state = self.state();
        if !state.active {
            return TriggerOutcome::Inactive;
        }
        if state.verified {
            return TriggerOutcome::Resolved;
        }
        if state.in_flight {
            debug!("Scan attempt already in flight, ignoring trigger");
            return TriggerOutcome::InFlight;
        }

        let epoch = state.epoch;
        let Some(frame) = self.camera.current_frame() else {
            warn!("{}", ScanError::Capture);
            self.publish(epoch, ScanStatus::Capturing, 0, NO_FRAME_MESSAGE);
            return TriggerOutcome::NoFrame;
        };

        state.in_flight = true;
        state.attempts += 1;
        let attempt = state.attempts;
        self.publish(epoch, ScanStatus::Analyzing, ANALYZING_PROGRESS, ANALYZING_MESSAGE);
        drop(state);

        info!(
            "Scan attempt {} (epoch {}) analyzing frame {}",
            attempt,
            epoch,
            frame.frame_id()
        );
        self.feedback.play(AudioCue::ScanStarted);

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let result = inner.extraction.run(frame).await;
            inner.complete(epoch, attempt, result);
        });

        TriggerOutcome::Started { epoch, attempt }
    }

    fn complete(self: &Arc<Self>, epoch: u64, attempt: u64, result: Result<ExtractedName, ScanError>) {
        let mut state = self.state();
        if state.epoch != epoch || !state.active {
            debug!(
                "Dropping result of attempt {} from stale epoch {} (current {})",
                attempt, epoch, state.epoch
            );
            return;
        }
        state.in_flight = false;

        match result {
            Ok(ExtractedName::Name(name)) => {
                state.verified = true;
                if let Some(ticker) = state.ticker.take() {
                    ticker.cancel();
                }
                self.publish(
                    epoch,
                    ScanStatus::Succeeded(name.clone()),
                    COMPLETE_PROGRESS,
                    format!("Verified: {name}"),
                );
                drop(state);

                info!("Scan attempt {} verified {:?}", attempt, name);
                self.feedback.play(AudioCue::Verified);

                let inner = Arc::clone(self);
                let delay = self.confirmation_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    inner.deliver(epoch, name);
                });
            }
            Ok(ExtractedName::Unresolved) => {
                warn!("Scan attempt {} found no name", attempt);
                self.publish(
                    epoch,
                    ScanStatus::Failed(ScanError::ExtractionUnresolved.to_string()),
                    0,
                    NOT_FOUND_MESSAGE,
                );
            }
            Err(error) => {
                warn!("Scan attempt {} failed: {}", attempt, error);
                let message = error.to_string();
                self.publish(epoch, ScanStatus::Failed(message.clone()), 0, message);
            }
        }
    }

    fn deliver(&self, epoch: u64, name: String) {
        let on_resolved = {
            let mut state = self.state();
            if state.epoch != epoch || !state.active || state.delivered {
                debug!("Skipping delivery for stale epoch {}", epoch);
                return;
            }
            state.delivered = true;
            self.on_resolved.clone()
        };
        if let Some(on_resolved) = on_resolved {
            on_resolved(name);
        }
    }
}

async fn run_ticker(inner: Arc<Inner>, token: CancellationToken, interval: Duration) {
    let mut ticks = tokio::time::interval_at(Instant::now() + interval, interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticks.tick() => {
                let outcome = inner.trigger();
                debug!("Scan tick: {:?}", outcome);
            }
        }
    }
    debug!("Scan ticker stopped");
}

pub struct ScanControllerBuilder {
    config: ScanConfig,
    camera: Option<Arc<dyn CameraSource>>,
    extractor: Option<Arc<dyn NameExtractor>>,
    feedback: Arc<dyn FeedbackSink>,
    on_resolved: Option<ResolvedCallback>,
    on_cancel: Option<CancelCallback>,
}

impl ScanControllerBuilder {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            camera: None,
            extractor: None,
            feedback: Arc::new(NoopFeedback),
            on_resolved: None,
            on_cancel: None,
        }
    }

    pub fn camera(mut self, camera: Arc<dyn CameraSource>) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn NameExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn feedback(mut self, feedback: Arc<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    // Called once per verified session, after the confirmation delay.
    pub fn on_resolved(mut self, callback: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.on_resolved = Some(Arc::new(callback));
        self
    }

    pub fn on_cancel(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> Result<ScanController, ScanError> {
        let camera = self
            .camera
            .ok_or_else(|| ScanError::Configuration("Camera source not set".to_string()))?;
        let extractor = self
            .extractor
            .ok_or_else(|| ScanError::Configuration("Name extractor not set".to_string()))?;
        let extraction = ExtractionService::new(Arc::clone(&extractor))
            .with_timeout(self.config.extraction_timeout());
        let (snapshot_tx, _) = watch::channel(ScanSnapshot::idle(0));

        Ok(ScanController {
            inner: Arc::new(Inner {
                camera,
                extractor,
                extraction,
                feedback: self.feedback,
                mode: self.config.trigger_mode(),
                confirmation_delay: self.config.confirmation_delay(),
                on_resolved: self.on_resolved,
                on_cancel: self.on_cancel,
                state: Mutex::new(SessionState::default()),
                snapshot_tx,
            }),
        })
    }
}
