// Environment overrides for configuration
//
// Kept in its own test binary with a single test: env vars are process-wide,
// so running these next to other config tests would race.

use anyhow::Result;
use tempfile::TempDir;
use wakeword_recorder::Config;

const OVERRIDES: [(&str, &str); 3] = [
    ("WAKEWORD_RECORDER__AUDIO__GAIN", "0.5"),
    ("WAKEWORD_RECORDER__AUDIO__CHUNK_FRAMES", "2048"),
    ("WAKEWORD_RECORDER__SAMPLES__WAKEWORD_NAME", "hey there"),
];

#[test]
fn test_env_overrides_file_and_defaults() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("recorder.toml"),
        r#"
[audio]
gain = 2.5
device = "USB Mic"
"#,
    )?;

    for (key, value) in OVERRIDES {
        std::env::set_var(key, value);
    }

    let loaded = Config::load(&temp_dir.path().join("recorder").to_string_lossy());

    for (key, _) in OVERRIDES {
        std::env::remove_var(key);
    }

    let cfg = loaded?;
    assert_eq!(cfg.audio.gain, 0.5, "Env should win over the file");
    assert_eq!(cfg.audio.chunk_frames, 2048);
    assert_eq!(cfg.audio.device.as_deref(), Some("USB Mic"));
    assert_eq!(cfg.samples.wakeword_name, "hey there");

    Ok(())
}
