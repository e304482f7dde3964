mod common;

use approx::assert_abs_diff_eq;
use std::fs;
use tempfile::tempdir;
use voice_cover_core::{read_audio, write_audio, AudioData, CoverError};

#[test]
fn write_then_read_keeps_format_and_samples() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("tone.wav");

    let audio = common::sine(440.0, 0.25, 44_100, 2, 0.5);
    write_audio(&path, &audio).unwrap();

    let back = read_audio(&path).expect("Failed to read audio");
    assert_eq!(back.sample_rate, 44_100);
    assert_eq!(back.channels, 2);
    assert_eq!(back.frames(), audio.frames());
    for (a, b) in audio.samples.iter().zip(&back.samples).step_by(97) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-3);
    }
}

#[test]
fn write_clamps_out_of_range_samples() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("loud.wav");

    let audio = AudioData {
        samples: vec![2.0, -2.0, 0.5, -0.5],
        sample_rate: 8_000,
        channels: 1,
    };
    write_audio(&path, &audio).unwrap();

    let back = read_audio(&path).unwrap();
    assert_abs_diff_eq!(back.samples[0], 1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(back.samples[1], -1.0, epsilon = 1e-3);
    assert_abs_diff_eq!(back.samples[2], 0.5, epsilon = 1e-3);
}

#[test]
fn wav_payload_behind_an_mp3_name_still_decodes() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("temp_vocals.mp3");
    common::write_wav(&path, &common::sine(220.0, 0.1, 22_050, 1, 0.3));

    let back = read_audio(&path).unwrap();
    assert_eq!(back.sample_rate, 22_050);
    assert_eq!(back.channels, 1);
}

#[test]
fn missing_file_is_a_decode_error() {
    let tmp = tempdir().unwrap();
    match read_audio(tmp.path().join("nope.wav")) {
        Err(CoverError::Decode { path, .. }) => assert!(path.ends_with("nope.wav")),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn garbage_file_is_a_decode_error() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("garbage.wav");
    fs::write(&path, b"definitely not audio, just some text bytes").unwrap();

    assert!(matches!(read_audio(&path), Err(CoverError::Decode { .. })));
}

#[test]
fn corrupted_payload_bytes_do_not_abort_decoding() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("temp_bass.mp3");
    let audio = common::sine(110.0, 0.5, 44_100, 2, 0.3);
    let mut bytes = common::wav_bytes(&audio);
    let mid = bytes.len() / 2;
    for b in &mut bytes[mid..mid + 512] {
        *b = 0xFF;
    }
    fs::write(&path, &bytes).unwrap();

    let back = read_audio(&path).expect("a damaged stretch should not fail the whole file");
    assert_eq!(back.sample_rate, 44_100);
    assert_eq!(back.channels, 2);
    assert!(back.frames() > 0);
    assert!(back.frames() <= audio.frames());
}

#[test]
fn header_only_wav_is_still_a_decode_error() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("empty.wav");
    let empty = AudioData {
        samples: Vec::new(),
        sample_rate: 44_100,
        channels: 2,
    };
    fs::write(&path, common::wav_bytes(&empty)).unwrap();

    assert!(matches!(read_audio(&path), Err(CoverError::Decode { .. })));
}

#[test]
fn mp3_output_is_not_a_wav_container() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("perfect_my_version.mp3");
    let audio = common::sine(440.0, 0.5, 44_100, 2, 0.5);

    match write_audio(&path, &audio) {
        Ok(()) => {
            let bytes = fs::read(&path).unwrap();
            assert_ne!(&bytes[..4], b"RIFF");
            let back = read_audio(&path).unwrap();
            assert_eq!(back.sample_rate, 44_100);
            assert_eq!(back.channels, 2);
        }
        // Hosts without ffmpeg get a clear error and no mislabelled file.
        Err(CoverError::Config(msg)) => {
            assert!(msg.contains("ffmpeg"), "{msg}");
            assert!(!path.exists());
        }
        Err(other) => panic!("unexpected error: {other:?}"),
    }
    let staged: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path() != path)
        .collect();
    assert!(staged.is_empty(), "staging file left behind");
}

#[test]
fn unsupported_output_extension_is_rejected() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("tone.flac");

    let err = write_audio(&path, &common::sine(440.0, 0.1, 8_000, 1, 0.5)).unwrap_err();

    assert!(matches!(err, CoverError::Config(_)), "{err}");
    assert!(!path.exists());
}
