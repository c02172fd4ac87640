//! Wakeword sample collection
//!
//! This module provides:
//! - `SampleSet`: named WAV samples for one wakeword, recorded or uploaded
//! - Sample and model file naming
//! - `WakewordModelBuilder`: the contract of the external model-building library

mod builder;
mod naming;
mod set;

pub use builder::{ModelArtifact, WakewordModelBuilder};
pub use naming::{model_file_name, sample_file_name};
pub use set::{Sample, SampleSet, MAX_SAMPLES, MAX_UPLOAD_BATCH};
