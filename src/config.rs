use anyhow::{Context, Result};
use serde::Deserialize;

use crate::audio::DEFAULT_CHUNK_FRAMES;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub audio: AudioConfig,
    pub samples: SamplesConfig,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Gain applied to the microphone signal
    pub gain: f32,
    /// Frames per captured chunk
    pub chunk_frames: usize,
    /// Input device name; the default device when unset
    pub device: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SamplesConfig {
    /// Where recorded samples are written
    pub output_dir: String,
    pub wakeword_name: String,
}

impl Config {
    /// Load settings from an optional file plus `WAKEWORD_RECORDER__*` env vars
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("audio.gain", 1.0)?
            .set_default("audio.chunk_frames", DEFAULT_CHUNK_FRAMES as i64)?
            .set_default("samples.output_dir", "~/.wakeword-recorder/samples")?
            .set_default("samples.wakeword_name", "")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("WAKEWORD_RECORDER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .context("Failed to load configuration")?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio: AudioConfig {
                gain: 1.0,
                chunk_frames: DEFAULT_CHUNK_FRAMES,
                device: None,
            },
            samples: SamplesConfig {
                output_dir: "~/.wakeword-recorder/samples".to_string(),
                wakeword_name: String::new(),
            },
        }
    }
}
