//! Leading-silence gate
//!
//! Drops chunks until the first one carrying any non-zero sample, then opens
//! for the rest of the session. Only exact zeros count as silence.

use tokio::sync::oneshot;
use tracing::debug;

use super::backend::AudioChunk;

pub struct SilenceGate {
    open: bool,
    started_tx: Option<oneshot::Sender<()>>,
    dropped: usize,
}

impl SilenceGate {
    /// Create a gate and the receiver completed when it opens
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (started_tx, started_rx) = oneshot::channel();
        let gate = Self {
            open: false,
            started_tx: Some(started_tx),
            dropped: 0,
        };
        (gate, started_rx)
    }

    /// Decide whether a chunk should be buffered
    ///
    /// The chunk that opens the gate is admitted, as is everything after it.
    pub fn admit(&mut self, chunk: &AudioChunk) -> bool {
        if self.open {
            return true;
        }

        if chunk.is_silent() {
            self.dropped += 1;
            return false;
        }

        self.open = true;
        debug!("Silence gate opened after {} silent chunks", self.dropped);

        if let Some(tx) = self.started_tx.take() {
            // Receiver may already be gone if the caller dropped the signal
            let _ = tx.send(());
        }

        true
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Number of leading chunks discarded
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(samples: &[f32]) -> AudioChunk {
        AudioChunk::new(samples.to_vec(), 0)
    }

    #[test]
    fn drops_leading_zero_chunks() {
        let (mut gate, mut rx) = SilenceGate::new();

        assert!(!gate.admit(&chunk(&[0.0; 8])));
        assert!(!gate.admit(&chunk(&[0.0; 8])));
        assert!(rx.try_recv().is_err());
        assert_eq!(gate.dropped(), 2);

        assert!(gate.admit(&chunk(&[0.0, 0.0, 0.25, 0.0])));
        assert!(rx.try_recv().is_ok());
        assert!(gate.is_open());
    }

    #[test]
    fn keeps_silence_after_opening() {
        let (mut gate, _rx) = SilenceGate::new();

        assert!(gate.admit(&chunk(&[0.1])));
        assert!(gate.admit(&chunk(&[0.0; 4])));
        assert_eq!(gate.dropped(), 0);
    }

    #[test]
    fn negative_zero_is_silence() {
        let (mut gate, _rx) = SilenceGate::new();
        let negative = chunk(&[-0.0; 4]);
        assert!(negative.is_silent());
        assert!(!gate.admit(&negative));
        assert!(gate.admit(&chunk(&[-0.001])));
    }

    #[test]
    fn empty_chunk_does_not_open() {
        let (mut gate, _rx) = SilenceGate::new();
        assert!(!gate.admit(&chunk(&[])));
        assert!(!gate.is_open());
    }
}
