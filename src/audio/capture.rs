use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::backend::{AudioChunk, GainControl, MicrophoneSource};
use super::gate::SilenceGate;
use super::wav::{encode_wav, EncodedRecording};
use crate::error::CaptureError;

/// Resolves once the first non-silent chunk of a session has been captured
///
/// Stays pending while the session is active and only silence arrives.
/// If the session ends first it resolves with `CaptureError::EndedBeforeSignal`.
#[derive(Debug)]
pub struct StartSignal {
    rx: oneshot::Receiver<()>,
}

impl Future for StartSignal {
    type Output = Result<(), CaptureError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| CaptureError::EndedBeforeSignal))
    }
}

/// Chunks collected by the buffering task over one session
struct SessionBuffer {
    chunks: Vec<Vec<f32>>,
    dropped: usize,
}

struct ActiveSession {
    sample_rate: u32,
    buffer_task: JoinHandle<SessionBuffer>,
}

/// Records one session at a time from a microphone source
///
/// Chunks flow from the source through the gain stage and the silence gate
/// into a buffer owned by a spawned task. `end()` closes the source, collects
/// the buffer and encodes it as WAV.
pub struct AudioCapture<S: MicrophoneSource> {
    source: S,
    gain: GainControl,
    session: Option<ActiveSession>,
}

impl<S: MicrophoneSource> AudioCapture<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            gain: GainControl::default(),
            session: None,
        }
    }

    /// Set the gain applied to the microphone signal
    ///
    /// Takes effect for chunks captured from now on, including those of a
    /// session already in progress.
    pub fn set_gain(&self, gain: f32) -> Result<(), CaptureError> {
        self.gain.set(gain)?;
        debug!("Gain set to {}", gain);
        Ok(())
    }

    pub fn gain(&self) -> f32 {
        self.gain.get()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Start a recording session
    ///
    /// Returns once the microphone is open. Await the returned signal to know
    /// when sound has actually begun; silence before that is discarded.
    pub async fn start(&mut self) -> Result<StartSignal, CaptureError> {
        if self.session.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }

        info!("Starting recording on {}", self.source.name());

        let chunk_rx = self.source.open().await.map_err(|e| {
            warn!("Failed to open microphone: {}", e);
            e
        })?;
        let sample_rate = self.source.sample_rate();

        let (gate, started_rx) = SilenceGate::new();
        let buffer_task = tokio::spawn(buffer_chunks(chunk_rx, gate, self.gain.clone()));

        self.session = Some(ActiveSession {
            sample_rate,
            buffer_task,
        });

        info!("Recorder ready ({}Hz, gain {}), waiting for sound", sample_rate, self.gain());

        Ok(StartSignal { rx: started_rx })
    }

    /// Stop the session and encode everything buffered so far
    pub async fn end(&mut self) -> Result<EncodedRecording, CaptureError> {
        let session = self.session.take().ok_or(CaptureError::NoActiveRecording)?;

        info!("Stopping recording");

        self.source.close().await;

        let buffer = session.buffer_task.await.map_err(|e| {
            error!("Buffering task failed: {}", e);
            CaptureError::BufferTask(e.to_string())
        })?;

        let total: usize = buffer.chunks.iter().map(Vec::len).sum();
        let mut samples = Vec::with_capacity(total);
        for chunk in buffer.chunks {
            samples.extend_from_slice(&chunk);
        }

        let recording = encode_wav(&samples, session.sample_rate)?;

        info!(
            "Recording finished: {:.2}s ({} samples, {} leading silent chunks skipped)",
            recording.duration_seconds(),
            recording.sample_count(),
            buffer.dropped
        );

        Ok(recording)
    }
}

impl<S: MicrophoneSource> Drop for AudioCapture<S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            warn!("Recorder dropped with an active session, discarding audio");
            session.buffer_task.abort();
        }
    }
}

/// Buffering task: gain stage, then silence gate, then append
async fn buffer_chunks(
    mut chunk_rx: mpsc::UnboundedReceiver<AudioChunk>,
    mut gate: SilenceGate,
    gain: GainControl,
) -> SessionBuffer {
    let mut chunks = Vec::new();

    while let Some(mut chunk) = chunk_rx.recv().await {
        if chunk.is_empty() {
            continue;
        }

        gain.apply(&mut chunk);

        if gate.admit(&chunk) {
            if chunks.is_empty() {
                info!("Recording started at {}ms", chunk.timestamp_ms);
            }
            chunks.push(chunk.samples);
        }
    }

    debug!("Chunk channel closed after {} buffered chunks", chunks.len());

    SessionBuffer {
        chunks,
        dropped: gate.dropped(),
    }
}
