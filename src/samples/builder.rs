use anyhow::Result;

/// External wakeword model builder
///
/// Receives every sample as a complete WAV file and serializes the trained
/// model. Failures are opaque to the caller.
pub trait WakewordModelBuilder {
    /// Add one named WAV sample
    fn ingest_sample(&mut self, name: &str, wav_bytes: &[u8]) -> Result<()>;

    /// Serialize the trained model
    fn export_model(&mut self) -> Result<Vec<u8>>;
}

/// A serialized model ready to be written out
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
