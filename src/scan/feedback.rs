use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Short beep when a frame is sent off for analysis.
    ScanStarted,
    /// Confirmation once a name has been verified.
    Verified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Sine,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CueSound {
    Tone {
        waveform: Waveform,
        start_hz: f32,
        end_hz: f32,
        duration: Duration,
        gain: f32,
    },
    Clip {
        path: &'static str,
        volume: f32,
    },
}

impl AudioCue {
    pub fn sound(&self) -> CueSound {
        match self {
            AudioCue::ScanStarted => CueSound::Tone {
                waveform: Waveform::Square,
                start_hz: 1200.0,
                end_hz: 800.0,
                duration: Duration::from_millis(100),
                gain: 0.1,
            },
            AudioCue::Verified => CueSound::Clip {
                path: "sounds/success.mp3",
                volume: 0.5,
            },
        }
    }
}

/// Side-effect hook for scan feedback. Implementations swallow their own
/// failures; a missing speaker never fails a scan.
pub trait FeedbackSink: Send + Sync {
    fn play(&self, cue: AudioCue);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFeedback;

impl FeedbackSink for NoopFeedback {
    fn play(&self, _cue: AudioCue) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

impl FeedbackSink for TracingFeedback {
    fn play(&self, cue: AudioCue) {
        tracing::debug!("Feedback cue {:?}: {:?}", cue, cue.sound());
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_beep_sweeps_down() {
        match AudioCue::ScanStarted.sound() {
            CueSound::Tone {
                waveform,
                start_hz,
                end_hz,
                duration,
                ..
            } => {
                assert_eq!(waveform, Waveform::Square);
                assert!(start_hz > end_hz);
                assert_eq!(duration, Duration::from_millis(100));
            }
            other => panic!("unexpected sound {other:?}"),
        }
    }

    #[test]
    fn verified_cue_is_a_clip() {
        assert!(matches!(AudioCue::Verified.sound(), CueSound::Clip { .. }));
    }
}
