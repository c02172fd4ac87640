pub mod backend;
pub mod capture;
pub mod cpal_source;
pub mod file;
pub mod fixture;
pub mod gate;
pub mod wav;

pub use backend::{AudioChunk, GainControl, MicrophoneSource, DEFAULT_CHUNK_FRAMES};
pub use capture::{AudioCapture, StartSignal};
pub use cpal_source::{list_input_devices, CpalMicrophone};
pub use file::AudioFile;
pub use fixture::{FixtureFeed, FixtureMicrophone};
pub use gate::SilenceGate;
pub use wav::{encode_wav, EncodedRecording};
