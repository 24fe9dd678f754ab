use std::fmt;

pub const ANALYZING_PROGRESS: u8 = 30;
pub const COMPLETE_PROGRESS: u8 = 100;

pub const ALIGN_MESSAGE: &str = "Align your ID card";
pub const ANALYZING_MESSAGE: &str = "AI Analyzing...";
pub const NOT_FOUND_MESSAGE: &str = "Could not find name";
pub const NO_FRAME_MESSAGE: &str = "Waiting for camera...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Capturing,
    Analyzing,
    Succeeded(String),
    Failed(String),
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Idle => "Idle",
            ScanStatus::Capturing => "Capturing",
            ScanStatus::Analyzing => "Analyzing",
            ScanStatus::Succeeded(_) => "Succeeded",
            ScanStatus::Failed(_) => "Failed",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ScanStatus::Capturing | ScanStatus::Analyzing)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Succeeded(name) => write!(f, "Succeeded({name})"),
            ScanStatus::Failed(reason) => write!(f, "Failed({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// What a scanning view renders: the status, the progress bar and the
/// status line, stamped with the session epoch that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSnapshot {
    pub epoch: u64,
    pub status: ScanStatus,
    pub progress: u8,
    pub message: String,
}

impl ScanSnapshot {
    pub fn idle(epoch: u64) -> Self {
        Self {
            epoch,
            status: ScanStatus::Idle,
            progress: 0,
            message: ALIGN_MESSAGE.to_string(),
        }
    }
}

/// Result of asking a controller to start an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started { epoch: u64, attempt: u64 },
    /// An extraction call is already outstanding; nothing was done.
    InFlight,
    /// The camera had no frame; status stays `Capturing`.
    NoFrame,
    /// The session was never started or has been cancelled.
    Inactive,
    /// A name was already verified in this session.
    Resolved,
}

impl TriggerOutcome {
    pub fn started(&self) -> bool {
        matches!(self, TriggerOutcome::Started { .. })
    }
}
