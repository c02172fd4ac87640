use thiserror::Error;

/// Errors surfaced by the audio capture lifecycle
#[derive(Debug, Error)]
pub enum CaptureError {
    /// `start()` was called while a session is active
    #[error("Already recording")]
    AlreadyRecording,

    /// `end()` was called with no active session
    #[error("No active recording")]
    NoActiveRecording,

    /// The platform denied microphone access or has no capture device
    #[error("Microphone unavailable: {0}")]
    PermissionOrDevice(String),

    #[error("Invalid gain {0}: must be a finite, non-negative number")]
    InvalidGain(f32),

    /// The session ended before any non-silent audio arrived
    #[error("Recording ended before any sound was captured")]
    EndedBeforeSignal,

    #[error("Failed to encode WAV: {0}")]
    Encode(String),

    #[error("Buffering task failed: {0}")]
    BufferTask(String),
}

impl From<hound::Error> for CaptureError {
    fn from(err: hound::Error) -> Self {
        CaptureError::Encode(err.to_string())
    }
}

/// Errors raised while collecting samples and building a model
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Sample limit reached ({0} samples)")]
    Full(usize),

    #[error("A sample named {0} already exists")]
    Duplicate(String),

    #[error("Sample {name} is not a valid WAV file: {reason}")]
    InvalidWav { name: String, reason: String },

    /// Building needs a wakeword name and at least one sample
    #[error("Wakeword name and at least one sample are required")]
    NotReady,

    #[error("Model builder failed: {0:#}")]
    Builder(anyhow::Error),
}
