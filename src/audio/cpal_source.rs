// Microphone source backed by cpal
//
// cpal streams are not Send on every platform, so each open stream lives on a
// dedicated thread that owns it until close() signals the thread to drop it.

use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use super::backend::{AudioChunk, MicrophoneSource, DEFAULT_CHUNK_FRAMES};
use crate::error::CaptureError;

/// List the names of available input devices
pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::PermissionOrDevice(e.to_string()))?
        .map(|device| device_display_name(&device))
        .collect();
    Ok(devices)
}

fn device_display_name(device: &cpal::Device) -> String {
    device
        .name()
        .unwrap_or_else(|_| "Unknown input".to_string())
}

fn pick_input_device(preferred_name: Option<&str>) -> Result<cpal::Device, CaptureError> {
    let host = cpal::default_host();

    if let Some(name) = preferred_name {
        if let Ok(mut devices) = host.input_devices() {
            if let Some(device) = devices.find(|d| device_display_name(d) == name) {
                return Ok(device);
            }
        }
        warn!("Input device '{}' not found, falling back to default", name);
    }

    host.default_input_device()
        .ok_or_else(|| CaptureError::PermissionOrDevice("No input device available".to_string()))
}

/// Microphone input from a real capture device
pub struct CpalMicrophone {
    device: cpal::Device,
    device_name: String,
    config: cpal::StreamConfig,
    sample_format: SampleFormat,
    chunk_frames: usize,
    stream_thread: Option<StreamThread>,
}

struct StreamThread {
    stop_tx: std_mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl CpalMicrophone {
    /// Use the default input device
    pub fn new() -> Result<Self, CaptureError> {
        Self::with_device(None)
    }

    /// Use the named input device, or the default one when absent or not found
    pub fn with_device(preferred_name: Option<&str>) -> Result<Self, CaptureError> {
        let device = pick_input_device(preferred_name)?;
        let device_name = device_display_name(&device);

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::PermissionOrDevice(e.to_string()))?;

        info!(
            "Input device: {} ({} Hz, {} channels, {:?})",
            device_name,
            supported.sample_rate().0,
            supported.channels(),
            supported.sample_format()
        );

        Ok(Self {
            device,
            device_name,
            sample_format: supported.sample_format(),
            config: supported.config(),
            chunk_frames: DEFAULT_CHUNK_FRAMES,
            stream_thread: None,
        })
    }

    /// Set the number of frames per delivered chunk
    pub fn with_chunk_frames(mut self, frames: usize) -> Self {
        self.chunk_frames = frames.max(1);
        self
    }

    fn spawn_stream_thread(
        &self,
        chunk_tx: mpsc::UnboundedSender<AudioChunk>,
        ready_tx: oneshot::Sender<Result<(), CaptureError>>,
    ) -> StreamThread {
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let device = self.device.clone();
        let config = self.config.clone();
        let sample_format = self.sample_format;
        let chunk_frames = self.chunk_frames;

        let handle = thread::spawn(move || {
            let stream = match build_stream(&device, &config, sample_format, chunk_frames, chunk_tx)
            {
                Ok(stream) => stream,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            if let Err(e) = stream.play() {
                let _ = ready_tx.send(Err(CaptureError::PermissionOrDevice(format!(
                    "Failed to start stream: {}",
                    e
                ))));
                return;
            }

            let _ = ready_tx.send(Ok(()));

            // Block until close(); a disconnected sender also ends the stream
            let _ = stop_rx.recv();
            drop(stream);
        });

        StreamThread { stop_tx, handle }
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sample_format: SampleFormat,
    chunk_frames: usize,
    chunk_tx: mpsc::UnboundedSender<AudioChunk>,
) -> Result<cpal::Stream, CaptureError> {
    match sample_format {
        SampleFormat::I8 => build_stream_typed::<i8>(device, config, chunk_frames, chunk_tx),
        SampleFormat::I16 => build_stream_typed::<i16>(device, config, chunk_frames, chunk_tx),
        SampleFormat::I32 => build_stream_typed::<i32>(device, config, chunk_frames, chunk_tx),
        SampleFormat::I64 => build_stream_typed::<i64>(device, config, chunk_frames, chunk_tx),
        SampleFormat::U8 => build_stream_typed::<u8>(device, config, chunk_frames, chunk_tx),
        SampleFormat::U16 => build_stream_typed::<u16>(device, config, chunk_frames, chunk_tx),
        SampleFormat::U32 => build_stream_typed::<u32>(device, config, chunk_frames, chunk_tx),
        SampleFormat::U64 => build_stream_typed::<u64>(device, config, chunk_frames, chunk_tx),
        SampleFormat::F32 => build_stream_typed::<f32>(device, config, chunk_frames, chunk_tx),
        SampleFormat::F64 => build_stream_typed::<f64>(device, config, chunk_frames, chunk_tx),
        other => Err(CaptureError::PermissionOrDevice(format!(
            "Unsupported sample format: {:?}",
            other
        ))),
    }
}

fn build_stream_typed<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    chunk_frames: usize,
    chunk_tx: mpsc::UnboundedSender<AudioChunk>,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let mut blocker = ChunkBlocker::new(
        config.channels.max(1) as usize,
        chunk_frames,
        config.sample_rate.0,
    );

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for chunk in blocker.push_typed(data) {
                    // Receiver is gone once the session is finalized
                    if chunk_tx.send(chunk).is_err() {
                        return;
                    }
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| CaptureError::PermissionOrDevice(e.to_string()))
}

/// Down-mixes interleaved callback data to mono and re-blocks it into
/// fixed-size chunks
struct ChunkBlocker {
    channels: usize,
    chunk_frames: usize,
    sample_rate: u32,
    pending: Vec<f32>,
    frame_acc: Vec<f32>,
    frames_emitted: u64,
}

impl ChunkBlocker {
    fn new(channels: usize, chunk_frames: usize, sample_rate: u32) -> Self {
        Self {
            channels,
            chunk_frames,
            sample_rate,
            pending: Vec::with_capacity(chunk_frames),
            frame_acc: Vec::with_capacity(channels),
            frames_emitted: 0,
        }
    }

    /// Convert device samples of any cpal format to f32, then block them
    fn push_typed<T>(&mut self, data: &[T]) -> Vec<AudioChunk>
    where
        T: Sample,
        f32: FromSample<T>,
    {
        self.push(data.iter().map(|&s| s.to_sample::<f32>()))
    }

    fn push(&mut self, samples: impl Iterator<Item = f32>) -> Vec<AudioChunk> {
        let mut ready = Vec::new();

        for sample in samples {
            self.frame_acc.push(sample);
            if self.frame_acc.len() < self.channels {
                continue;
            }

            let mono = self.frame_acc.iter().sum::<f32>() / self.channels as f32;
            self.frame_acc.clear();
            self.pending.push(mono);

            if self.pending.len() == self.chunk_frames {
                let timestamp_ms = self.frames_emitted * 1000 / self.sample_rate.max(1) as u64;
                self.frames_emitted += self.chunk_frames as u64;
                let samples = std::mem::replace(&mut self.pending, Vec::with_capacity(self.chunk_frames));
                ready.push(AudioChunk::new(samples, timestamp_ms));
            }
        }

        ready
    }
}

#[async_trait::async_trait]
impl MicrophoneSource for CpalMicrophone {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    async fn open(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>, CaptureError> {
        if self.stream_thread.is_some() {
            self.close().await;
        }

        info!("Opening microphone stream on {}", self.device_name);

        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let stream_thread = self.spawn_stream_thread(chunk_tx, ready_tx);

        let ready = ready_rx.await.unwrap_or_else(|_| {
            Err(CaptureError::PermissionOrDevice(
                "Audio stream thread exited unexpectedly".to_string(),
            ))
        });

        match ready {
            Ok(()) => {
                self.stream_thread = Some(stream_thread);
                info!("Microphone stream started");
                Ok(chunk_rx)
            }
            Err(e) => {
                let _ = stream_thread.handle.join();
                Err(e)
            }
        }
    }

    async fn close(&mut self) {
        let Some(stream_thread) = self.stream_thread.take() else {
            return;
        };

        info!("Stopping microphone stream");
        let _ = stream_thread.stop_tx.send(());

        let joined = tokio::task::spawn_blocking(move || stream_thread.handle.join()).await;
        if !matches!(joined, Ok(Ok(()))) {
            error!("Audio stream thread panicked");
        }
    }

    fn name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for CpalMicrophone {
    fn drop(&mut self) {
        if let Some(stream_thread) = self.stream_thread.take() {
            let _ = stream_thread.stop_tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocker_downmixes_and_reblocks() {
        let mut blocker = ChunkBlocker::new(2, 3, 1000);

        let first = blocker.push([0.2, 0.4, 1.0, 0.0, -0.5, -0.5, 0.1].into_iter());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].samples.len(), 3);
        assert!((first[0].samples[0] - 0.3).abs() < 1e-6);
        assert!((first[0].samples[1] - 0.5).abs() < 1e-6);
        assert!((first[0].samples[2] + 0.5).abs() < 1e-6);
        assert_eq!(first[0].timestamp_ms, 0);

        let second = blocker.push([0.1, 0.0, 0.0, 0.0, 0.0].into_iter());
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].timestamp_ms, 3);
    }

    #[test]
    fn blocker_converts_integer_and_wide_formats() {
        let mut blocker = ChunkBlocker::new(1, 3, 8000);
        let chunks = blocker.push_typed::<u8>(&[128, 255, 0]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].samples[0], 0.0);
        assert!(chunks[0].samples[1] > 0.99);
        assert!((chunks[0].samples[2] + 1.0).abs() < 1e-6);

        let chunks = blocker.push_typed::<i32>(&[0, i32::MAX, i32::MIN]);
        assert_eq!(chunks[0].samples[0], 0.0);
        assert!(chunks[0].samples[1] > 0.99);
        assert!((chunks[0].samples[2] + 1.0).abs() < 1e-6);

        let chunks = blocker.push_typed::<f64>(&[0.25, -0.5, 0.0]);
        assert!((chunks[0].samples[0] - 0.25).abs() < 1e-6);
        assert!((chunks[0].samples[1] + 0.5).abs() < 1e-6);
        assert_eq!(chunks[0].timestamp_ms, 0);
    }

    #[test]
    fn blocker_holds_partial_block() {
        let mut blocker = ChunkBlocker::new(1, 4, 16000);
        assert!(blocker.push([0.5, 0.5].into_iter()).is_empty());
    }
}
