// Unit tests for microphone source abstractions
//
// These tests verify the chunk type, the gain stage and the fixture source.

use anyhow::Result;
use wakeword_recorder::audio::{AudioChunk, FixtureMicrophone, GainControl, MicrophoneSource};
use wakeword_recorder::CaptureError;

#[test]
fn test_chunk_silence_detection() {
    assert!(AudioChunk::new(vec![0.0; 4096], 0).is_silent());
    assert!(AudioChunk::new(vec![-0.0, 0.0], 0).is_silent());
    assert!(!AudioChunk::new(vec![0.0, 1e-9, 0.0], 0).is_silent());
}

#[test]
fn test_gain_control_default_and_apply() -> Result<()> {
    let gain = GainControl::default();
    assert_eq!(gain.get(), 1.0);

    gain.set(3.0)?;
    let mut chunk = AudioChunk::new(vec![0.1, -0.2], 0);
    gain.apply(&mut chunk);
    assert!((chunk.samples[0] - 0.3).abs() < 1e-6);
    assert!((chunk.samples[1] + 0.6).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_gain_control_is_shared_between_clones() -> Result<()> {
    let gain = GainControl::new(1.5)?;
    let stage = gain.clone();

    gain.set(0.25)?;
    assert_eq!(stage.get(), 0.25);

    Ok(())
}

#[test]
fn test_gain_control_rejects_negative() {
    assert!(matches!(
        GainControl::new(-0.5),
        Err(CaptureError::InvalidGain(_))
    ));
    assert!(matches!(
        GainControl::new(f32::INFINITY),
        Err(CaptureError::InvalidGain(_))
    ));
}

#[tokio::test]
async fn test_fixture_delivers_queued_then_live_chunks() -> Result<()> {
    let (mut source, feed) = FixtureMicrophone::new(16000);
    assert_eq!(source.sample_rate(), 16000);
    assert_eq!(source.name(), "fixture");

    feed.push(vec![0.1; 1600]);
    let mut rx = source.open().await?;
    feed.push(vec![0.2; 1600]);

    let first = rx.recv().await.expect("queued chunk");
    let second = rx.recv().await.expect("live chunk");
    assert_eq!(first.samples[0], 0.1);
    assert_eq!(first.timestamp_ms, 0);
    assert_eq!(second.samples[0], 0.2);
    assert_eq!(second.timestamp_ms, 100, "1600 frames at 16kHz is 100ms");

    source.close().await;
    assert!(rx.recv().await.is_none(), "Channel closes after close()");

    Ok(())
}

#[tokio::test]
async fn test_fixture_denying_access() {
    let (source, _feed) = FixtureMicrophone::new(16000);
    let mut source = source.denying_access();

    let result = source.open().await;
    assert!(matches!(result, Err(CaptureError::PermissionOrDevice(_))));
    assert!(!source.is_open());
}
