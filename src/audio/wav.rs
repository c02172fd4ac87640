//! WAV container encoding for finished recordings
//!
//! Recordings are written as single-channel 32-bit IEEE float PCM at the
//! capture device's native rate. hound emits a WAVE_FORMAT_EXTENSIBLE fmt
//! chunk for float data, so the float subformat GUID sits at bytes 44..60.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{debug, info};

use crate::error::CaptureError;

/// A finished recording as a complete WAV file
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecording {
    bytes: Vec<u8>,
    sample_rate: u32,
    sample_count: usize,
}

impl EncodedRecording {
    /// Raw bytes of the WAV file
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// `data:` URI suitable as a playback source
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:audio/wav;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn duration_seconds(&self) -> f64 {
        self.sample_count as f64 / self.sample_rate as f64
    }

    /// Write the WAV file to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("Failed to write WAV file: {:?}", path))?;

        info!(
            "Saved recording to {} ({:.2}s, {} bytes)",
            path.display(),
            self.duration_seconds(),
            self.bytes.len()
        );

        Ok(())
    }
}

/// Encode mono f32 samples into a WAV container
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<EncodedRecording, CaptureError> {
    if sample_rate == 0 {
        return Err(CaptureError::Encode("sample rate must be non-zero".to_string()));
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(64 + samples.len() * 4));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    let bytes = cursor.into_inner();
    debug!(
        "Encoded {} samples at {}Hz into {} bytes",
        samples.len(),
        sample_rate,
        bytes.len()
    );

    Ok(EncodedRecording {
        bytes,
        sample_rate,
        sample_count: samples.len(),
    })
}
