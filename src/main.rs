use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn, Level};
use wakeword_recorder::audio::list_input_devices;
use wakeword_recorder::samples::sample_file_name;
use wakeword_recorder::{AudioCapture, AudioFile, Config, CpalMicrophone};

#[derive(Parser)]
#[command(name = "wakeword-recorder")]
#[command(about = "Record wakeword samples from the microphone as WAV files")]
struct Cli {
    /// Config file (without extension)
    #[arg(short, long, default_value = "config/wakeword-recorder")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record one sample; recording begins at the first non-silent audio
    Record {
        /// Seconds to record once sound is detected
        #[arg(short, long, default_value = "2")]
        seconds: u64,

        /// Microphone gain
        #[arg(short, long)]
        gain: Option<f32>,

        /// Wakeword name (used for the file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the format of a WAV file
    Inspect { file: PathBuf },

    /// List audio input devices
    Devices,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let cfg = Config::load(&cli.config)?;

    match cli.command {
        Command::Record {
            seconds,
            gain,
            name,
            output,
        } => {
            let gain = gain.unwrap_or(cfg.audio.gain);
            let name = name.unwrap_or_else(|| cfg.samples.wakeword_name.clone());
            let output = output.unwrap_or_else(|| cfg.samples.output_dir.clone());
            record(&cfg, seconds, gain, &name, &output).await
        }
        Command::Inspect { file } => inspect(&file),
        Command::Devices => {
            for device in list_input_devices()? {
                println!("{}", device);
            }
            Ok(())
        }
    }
}

async fn record(cfg: &Config, seconds: u64, gain: f32, name: &str, output: &str) -> Result<()> {
    let source = CpalMicrophone::with_device(cfg.audio.device.as_deref())?
        .with_chunk_frames(cfg.audio.chunk_frames);

    let mut capture = AudioCapture::new(source);
    capture.set_gain(gain)?;

    info!("Loading recorder...");
    let started = capture.start().await?;

    tokio::select! {
        res = started => {
            res?;
            info!("Recording for {} seconds, press Ctrl+C to stop early", seconds);
            tokio::select! {
                _ = sleep(Duration::from_secs(seconds)) => {}
                _ = tokio::signal::ctrl_c() => info!("Stopped early"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted before any sound was captured");
        }
    }

    let recording = capture.end().await?;
    info!("Record finished");

    if recording.sample_count() == 0 {
        warn!("Nothing was recorded, no file written");
        return Ok(());
    }

    let output_dir = PathBuf::from(shellexpand::tilde(output).as_ref());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let path = output_dir.join(sample_file_name(name, Local::now()));
    recording.save(&path)?;

    println!("{}", path.display());

    Ok(())
}

fn inspect(file: &Path) -> Result<()> {
    let audio = AudioFile::open(file)?;

    println!("File: {}", audio.name);
    println!(
        "Format: {:?} {}-bit, {} Hz, {} channel(s)",
        audio.sample_format, audio.bits_per_sample, audio.sample_rate, audio.channels
    );
    println!(
        "Duration: {:.2}s ({} frames)",
        audio.duration_seconds,
        audio.frame_count()
    );

    Ok(())
}
