pub mod audio;
pub mod config;
pub mod error;
pub mod samples;

pub use audio::{
    encode_wav, AudioCapture, AudioChunk, AudioFile, CpalMicrophone, EncodedRecording,
    FixtureFeed, FixtureMicrophone, GainControl, MicrophoneSource, SilenceGate, StartSignal,
};
pub use config::Config;
pub use error::{CaptureError, SampleError};
pub use samples::{ModelArtifact, Sample, SampleSet, WakewordModelBuilder};
