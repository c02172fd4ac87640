use chrono::Local;
use tracing::{info, warn};

use super::builder::{ModelArtifact, WakewordModelBuilder};
use super::naming::{model_file_name, sample_file_name};
use crate::audio::{AudioFile, EncodedRecording};
use crate::error::SampleError;

/// Maximum number of samples kept for one wakeword
pub const MAX_SAMPLES: usize = 10;

/// Uploads are accepted only while fewer than this many samples exist
pub const MAX_UPLOAD_BATCH: usize = 6;

/// A named WAV sample
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: String,
    pub wav_bytes: Vec<u8>,
}

/// Samples collected for one wakeword
#[derive(Debug, Default)]
pub struct SampleSet {
    wakeword_name: String,
    samples: Vec<Sample>,
}

impl SampleSet {
    pub fn new(wakeword_name: &str) -> Self {
        Self {
            wakeword_name: wakeword_name.trim().to_string(),
            samples: Vec::new(),
        }
    }

    pub fn wakeword_name(&self) -> &str {
        &self.wakeword_name
    }

    pub fn set_wakeword_name(&mut self, name: &str) {
        self.wakeword_name = name.trim().to_string();
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// More samples may be recorded or uploaded
    pub fn can_record(&self) -> bool {
        self.samples.len() < MAX_SAMPLES
    }

    pub fn can_build(&self) -> bool {
        !self.wakeword_name.is_empty() && !self.samples.is_empty()
    }

    /// Add a finished recording under a generated name
    ///
    /// Returns the name the sample was stored under.
    pub fn add_recording(&mut self, recording: &EncodedRecording) -> Result<String, SampleError> {
        let name = sample_file_name(&self.wakeword_name, Local::now());
        self.push(Sample {
            name: name.clone(),
            wav_bytes: recording.as_bytes().to_vec(),
        })?;
        Ok(name)
    }

    /// Add an existing WAV file after checking it parses
    pub fn add_wav(&mut self, name: &str, wav_bytes: Vec<u8>) -> Result<(), SampleError> {
        AudioFile::from_bytes(name, &wav_bytes).map_err(|e| SampleError::InvalidWav {
            name: name.to_string(),
            reason: format!("{:#}", e),
        })?;

        self.push(Sample {
            name: name.to_string(),
            wav_bytes,
        })
    }

    /// Add a batch of uploaded files
    ///
    /// Only the first `MAX_UPLOAD_BATCH - len()` files are considered. Invalid
    /// files are skipped and reported; the names of accepted files are returned.
    pub fn add_uploads(
        &mut self,
        files: impl IntoIterator<Item = (String, Vec<u8>)>,
    ) -> (Vec<String>, Vec<SampleError>) {
        let room = MAX_UPLOAD_BATCH.saturating_sub(self.samples.len());
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for (name, bytes) in files.into_iter().take(room) {
            match self.add_wav(&name, bytes) {
                Ok(()) => accepted.push(name),
                Err(e) => {
                    warn!("Rejected upload: {}", e);
                    rejected.push(e);
                }
            }
        }

        (accepted, rejected)
    }

    pub fn remove(&mut self, name: &str) -> Option<Sample> {
        let index = self.samples.iter().position(|s| s.name == name)?;
        info!("Removed sample {}", name);
        Some(self.samples.remove(index))
    }

    fn push(&mut self, sample: Sample) -> Result<(), SampleError> {
        if !self.can_record() {
            return Err(SampleError::Full(MAX_SAMPLES));
        }
        if self.samples.iter().any(|s| s.name == sample.name) {
            return Err(SampleError::Duplicate(sample.name));
        }

        info!(
            "Added sample {} ({} bytes, {}/{})",
            sample.name,
            sample.wav_bytes.len(),
            self.samples.len() + 1,
            MAX_SAMPLES
        );
        self.samples.push(sample);
        Ok(())
    }

    /// Feed every sample to the builder, in insertion order, and export the model
    pub fn build_model<B: WakewordModelBuilder + ?Sized>(
        &self,
        builder: &mut B,
    ) -> Result<ModelArtifact, SampleError> {
        if !self.can_build() {
            return Err(SampleError::NotReady);
        }

        info!(
            "Building wakeword model '{}' from {} samples",
            self.wakeword_name,
            self.samples.len()
        );

        for sample in &self.samples {
            builder
                .ingest_sample(&sample.name, &sample.wav_bytes)
                .map_err(SampleError::Builder)?;
        }

        let bytes = builder.export_model().map_err(SampleError::Builder)?;
        let file_name = model_file_name(&self.wakeword_name);

        info!("Model {} built ({} bytes)", file_name, bytes.len());

        Ok(ModelArtifact { file_name, bytes })
    }
}
