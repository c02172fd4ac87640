//! Synthetic microphone for deterministic capture tests
//!
//! Chunks pushed through a [`FixtureFeed`] before the source is first opened
//! are queued and delivered first, in push order. Once the source has been
//! opened, chunks pushed while it is closed are dropped.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::backend::{AudioChunk, MicrophoneSource};
use crate::error::CaptureError;

#[derive(Default)]
struct FeedState {
    sender: Option<mpsc::UnboundedSender<AudioChunk>>,
    pending: Vec<AudioChunk>,
    opened_once: bool,
    next_timestamp_ms: u64,
}

/// Handle used by tests to push chunks into a [`FixtureMicrophone`]
#[derive(Clone)]
pub struct FixtureFeed {
    state: Arc<Mutex<FeedState>>,
    sample_rate: u32,
}

impl FixtureFeed {
    /// Deliver a chunk, or queue it until the source is first opened
    pub fn push(&self, samples: Vec<f32>) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let frames = samples.len() as u64;
        let chunk = AudioChunk::new(samples, state.next_timestamp_ms);
        state.next_timestamp_ms += frames * 1000 / self.sample_rate.max(1) as u64;

        if let Some(tx) = &state.sender {
            // Receiver is gone if the session was dropped
            let _ = tx.send(chunk);
        } else if !state.opened_once {
            state.pending.push(chunk);
        } else {
            debug!("Fixture microphone closed, dropping chunk");
        }
    }

    /// Push a chunk of `frames` exact zeros
    pub fn push_silence(&self, frames: usize) {
        self.push(vec![0.0; frames]);
    }
}

/// Microphone source backed by synthetic chunks
pub struct FixtureMicrophone {
    state: Arc<Mutex<FeedState>>,
    sample_rate: u32,
    deny_access: bool,
    open: bool,
}

impl FixtureMicrophone {
    pub fn new(sample_rate: u32) -> (Self, FixtureFeed) {
        let state = Arc::new(Mutex::new(FeedState::default()));
        let source = Self {
            state: Arc::clone(&state),
            sample_rate,
            deny_access: false,
            open: false,
        };
        let feed = FixtureFeed { state, sample_rate };
        (source, feed)
    }

    /// Fail every `open()` as if microphone permission were denied
    pub fn denying_access(mut self) -> Self {
        self.deny_access = true;
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FeedState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait::async_trait]
impl MicrophoneSource for FixtureMicrophone {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn open(&mut self) -> Result<mpsc::UnboundedReceiver<AudioChunk>, CaptureError> {
        if self.deny_access {
            return Err(CaptureError::PermissionOrDevice(
                "permission denied by fixture".to_string(),
            ));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut state = self.lock();
            for chunk in state.pending.drain(..) {
                // Receiver is alive in this scope
                let _ = tx.send(chunk);
            }
            state.sender = Some(tx);
            state.opened_once = true;
        }
        self.open = true;

        info!("Fixture microphone opened ({}Hz)", self.sample_rate);

        Ok(rx)
    }

    async fn close(&mut self) {
        {
            let mut state = self.lock();
            state.sender = None;
            state.pending.clear();
        }
        self.open = false;
        info!("Fixture microphone closed");
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
