// Tests for WAV container encoding
//
// Encoded recordings are decoded again with hound to check they are
// well-formed 32-bit float mono WAV files.

use anyhow::Result;
use base64::Engine;
use std::io::Cursor;
use tempfile::TempDir;
use wakeword_recorder::audio::{encode_wav, AudioFile};
use wakeword_recorder::CaptureError;

// KSDATAFORMAT_SUBTYPE_IEEE_FLOAT
const IEEE_FLOAT_SUBFORMAT: [u8; 16] = [
    0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

#[test]
fn test_encoded_samples_decode_back() -> Result<()> {
    let input = [0.0f32, 0.5, -0.5, 1.0];
    let recording = encode_wav(&input, 16000)?;

    // Extensible fmt chunk: 68 header bytes, then four bytes per sample
    let bytes = recording.as_bytes();
    assert_eq!(bytes.len(), 84);
    assert_eq!(u16::from_le_bytes([bytes[20], bytes[21]]), 0xFFFE);
    assert_eq!(&bytes[44..60], &IEEE_FLOAT_SUBFORMAT);
    assert_eq!(&bytes[60..64], b"data");

    let reader = hound::WavReader::new(Cursor::new(recording.as_bytes()))?;
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.bits_per_sample, 32);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);

    let samples = reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(samples.len(), input.len());
    for (decoded, original) in samples.iter().zip(input.iter()) {
        assert!((decoded - original).abs() < f32::EPSILON);
    }

    Ok(())
}

#[test]
fn test_empty_recording_is_valid_wav() -> Result<()> {
    let recording = encode_wav(&[], 48000)?;

    assert!(recording.as_bytes().starts_with(b"RIFF"));
    assert_eq!(&recording.as_bytes()[8..12], b"WAVE");
    assert_eq!(recording.as_bytes().len(), 68);

    let reader = hound::WavReader::new(Cursor::new(recording.as_bytes()))?;
    assert_eq!(reader.duration(), 0, "Empty input should have zero frames");
    assert_eq!(reader.spec().sample_rate, 48000);
    assert_eq!(reader.spec().channels, 1);

    Ok(())
}

#[test]
fn test_data_uri_wraps_same_bytes() -> Result<()> {
    let recording = encode_wav(&[0.1, 0.2, 0.3], 8000)?;
    let uri = recording.to_data_uri();

    let payload = uri
        .strip_prefix("data:audio/wav;base64,")
        .expect("data URI should carry a WAV mime type");
    let decoded = base64::engine::general_purpose::STANDARD.decode(payload)?;
    assert_eq!(decoded, recording.as_bytes());

    Ok(())
}

#[test]
fn test_payload_size_matches_sample_count() -> Result<()> {
    let samples = vec![0.25f32; 4096];
    let recording = encode_wav(&samples, 16000)?;

    // Header plus four bytes per sample
    assert!(recording.as_bytes().len() >= 44 + samples.len() * 4);
    assert_eq!(recording.sample_count(), 4096);
    assert!((recording.duration_seconds() - 0.256).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_save_writes_readable_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("sample.wav");

    let recording = encode_wav(&[0.5; 160], 16000)?;
    recording.save(&path)?;

    let audio = AudioFile::open(&path)?;
    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples, vec![0.5; 160]);

    Ok(())
}

#[test]
fn test_zero_sample_rate_is_rejected() {
    let result = encode_wav(&[0.1, 0.2], 0);
    assert!(
        matches!(result, Err(CaptureError::Encode(_))),
        "A zero sample rate should fail instead of producing a header"
    );
}
