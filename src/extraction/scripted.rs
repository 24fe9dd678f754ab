use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::common::Frame;
use crate::error::{ExtractionError, ScanError};
use crate::extraction::{NameExtractor, UNKNOWN_NAME};

type Reply = Result<String, String>;

enum Step {
    Reply(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// Test double that answers from a queue and records concurrency.
pub(crate) struct ScriptedExtractor {
    script: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    configuration_error: Option<String>,
}

impl ScriptedExtractor {
    pub(crate) fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            configuration_error: None,
        }
    }

    pub(crate) fn unconfigured(message: &str) -> Self {
        Self {
            configuration_error: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub(crate) fn push_reply(&self, reply: Result<&str, &str>) {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        self.script.lock().unwrap().push_back(Step::Reply(reply));
    }

    /// The next call blocks until the returned sender answers (or is dropped,
    /// which leaves the call hanging forever).
    pub(crate) fn push_gated(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().unwrap().push_back(Step::Gated(rx));
        tx
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameExtractor for ScriptedExtractor {
    fn ensure_configured(&self) -> Result<(), ScanError> {
        match &self.configuration_error {
            Some(message) => Err(ScanError::Configuration(message.clone())),
            None => Ok(()),
        }
    }

    async fn extract(&self, _frame: Frame) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let step = self.script.lock().unwrap().pop_front();
        let reply = match step {
            Some(Step::Reply(reply)) => reply,
            Some(Step::Gated(rx)) => match rx.await {
                Ok(reply) => reply,
                Err(_) => futures::future::pending::<Reply>().await,
            },
            None => Ok(UNKNOWN_NAME.to_string()),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply.map_err(ExtractionError::Api)
    }

    fn name(&self) -> &'static str {
        "ScriptedExtractor"
    }
}
