use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::CaptureError;

/// Frames per processing block delivered by a microphone source
pub const DEFAULT_CHUNK_FRAMES: usize = 4096;

/// One processing block of mono 32-bit float PCM
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// Raw audio samples (f32 PCM, mono)
    pub samples: Vec<f32>,
    /// Timestamp in milliseconds since the source was opened
    pub timestamp_ms: u64,
}

impl AudioChunk {
    pub fn new(samples: Vec<f32>, timestamp_ms: u64) -> Self {
        Self {
            samples,
            timestamp_ms,
        }
    }

    /// True when every sample is exactly zero
    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Microphone capture capability
///
/// Implementations:
/// - `CpalMicrophone`: real input device via cpal
/// - `FixtureMicrophone`: synthetic chunks for tests
#[async_trait::async_trait]
pub trait MicrophoneSource: Send {
    /// Native sample rate of the device, fixed for a session
    fn sample_rate(&self) -> u32;

    /// Activate the device and start delivering chunks
    ///
    /// Returns a channel receiver that yields chunks in arrival order.
    /// The channel closes after `close()` once delivered chunks are drained.
    async fn open(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>, CaptureError>;

    /// Stop the device tracks and release the stream
    async fn close(&mut self);

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Gain stage parameter shared between the caller and the buffering task
#[derive(Debug, Clone)]
pub struct GainControl {
    bits: Arc<AtomicU32>,
}

impl GainControl {
    pub fn new(gain: f32) -> Result<Self, CaptureError> {
        let control = Self::default();
        control.set(gain)?;
        Ok(control)
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, gain: f32) -> Result<(), CaptureError> {
        if !gain.is_finite() || gain < 0.0 {
            return Err(CaptureError::InvalidGain(gain));
        }
        self.bits.store(gain.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    /// Multiply every sample of the chunk by the current gain
    pub fn apply(&self, chunk: &mut AudioChunk) {
        let gain = self.get();
        if gain == 1.0 {
            return;
        }
        for sample in &mut chunk.samples {
            *sample *= gain;
        }
    }
}

impl Default for GainControl {
    fn default() -> Self {
        Self {
            bits: Arc::new(AtomicU32::new(1.0f32.to_bits())),
        }
    }
}
