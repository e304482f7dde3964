mod common;

use approx::assert_abs_diff_eq;
use std::time::Duration;
use tempfile::tempdir;
use voice_cover_core::{mix_files, overlay, overlay_files, read_audio, sum_mix, AudioData};

fn mono(samples: Vec<f32>) -> AudioData {
    AudioData {
        samples,
        sample_rate: 8_000,
        channels: 1,
    }
}

#[test]
fn sum_mix_adds_without_normalizing_and_keeps_longest() {
    let a = mono(vec![0.5, 0.5, 0.5]);
    let b = mono(vec![0.75, -0.25]);

    let mixed = sum_mix(&[a, b]).unwrap();
    assert_eq!(mixed.frames(), 3);
    assert_abs_diff_eq!(mixed.samples[0], 1.25, epsilon = 1e-6);
    assert_abs_diff_eq!(mixed.samples[1], 0.25, epsilon = 1e-6);
    assert_abs_diff_eq!(mixed.samples[2], 0.5, epsilon = 1e-6);
}

#[test]
fn sum_mix_is_order_independent() {
    let bass = common::sine(55.0, 0.5, 44_100, 2, 0.3);
    let drums = common::sine(110.0, 0.4, 44_100, 2, 0.3);
    let other = common::sine(330.0, 0.6, 44_100, 1, 0.3);

    let forward = sum_mix(&[bass.clone(), drums.clone(), other.clone()]).unwrap();
    let backward = sum_mix(&[other, drums, bass]).unwrap();

    assert_eq!(forward.samples.len(), backward.samples.len());
    for (x, y) in forward.samples.iter().zip(&backward.samples) {
        assert_abs_diff_eq!(*x, *y, epsilon = 1e-5);
    }
}

#[test]
fn sum_mix_of_nothing_is_rejected() {
    assert!(sum_mix(&[]).is_err());
}

#[test]
fn mono_is_upmixed_to_stereo() {
    let stereo = AudioData {
        samples: vec![0.1, 0.2, 0.1, 0.2],
        sample_rate: 8_000,
        channels: 2,
    };
    let mixed = sum_mix(&[stereo, mono(vec![0.5, 0.5])]).unwrap();
    assert_eq!(mixed.channels, 2);
    assert_abs_diff_eq!(mixed.samples[0], 0.6, epsilon = 1e-6);
    assert_abs_diff_eq!(mixed.samples[1], 0.7, epsilon = 1e-6);
}

#[test]
fn overlay_at_zero_keeps_longer_duration() {
    let instrumental = common::sine(110.0, 1.0, 44_100, 2, 0.2);
    let short_vocal = common::sine(440.0, 0.5, 44_100, 2, 0.2);
    let long_vocal = common::sine(440.0, 1.5, 44_100, 2, 0.2);

    let a = overlay(&instrumental, &short_vocal, Duration::ZERO).unwrap();
    assert_eq!(a.frames(), instrumental.frames());

    let b = overlay(&instrumental, &long_vocal, Duration::ZERO).unwrap();
    assert_eq!(b.frames(), long_vocal.frames());
}

#[test]
fn overlay_honours_offset() {
    let base = mono(vec![0.1; 8]);
    let top = mono(vec![0.5; 4]);

    // 0.5 ms at 8 kHz is 4 frames.
    let out = overlay(&base, &top, Duration::from_micros(500)).unwrap();
    assert_eq!(out.frames(), 8);
    assert_abs_diff_eq!(out.samples[3], 0.1, epsilon = 1e-6);
    assert_abs_diff_eq!(out.samples[4], 0.6, epsilon = 1e-6);
    assert_abs_diff_eq!(out.samples[7], 0.6, epsilon = 1e-6);
}

#[test]
fn overlay_resamples_to_the_higher_rate() {
    let base = common::sine(110.0, 1.0, 44_100, 2, 0.2);
    let top = common::sine(440.0, 1.0, 22_050, 1, 0.2);

    let out = overlay(&base, &top, Duration::ZERO).unwrap();
    assert_eq!(out.sample_rate, 44_100);
    assert_eq!(out.channels, 2);
    assert_eq!(out.frames(), 44_100);
}

#[test]
fn file_helpers_write_decodable_mixes() {
    let tmp = tempdir().unwrap();
    let bass = tmp.path().join("bass.wav");
    let drums = tmp.path().join("drums.wav");
    let vocals = tmp.path().join("vocals.wav");
    common::write_wav(&bass, &common::sine(55.0, 0.5, 44_100, 2, 0.2));
    common::write_wav(&drums, &common::sine(110.0, 0.25, 44_100, 2, 0.2));
    common::write_wav(&vocals, &common::sine(440.0, 0.75, 44_100, 2, 0.2));

    let inst = tmp.path().join("inst.wav");
    mix_files(&[&bass, &drums], &inst).unwrap();
    assert_eq!(read_audio(&inst).unwrap().frames(), 22_050);

    let out = tmp.path().join("final.wav");
    overlay_files(&inst, &vocals, Duration::ZERO, &out).unwrap();
    let decoded = read_audio(&out).unwrap();
    assert_eq!(decoded.frames(), 33_075);
    assert_eq!(decoded.channels, 2);
}

#[test]
fn resampled_overlay_keeps_events_in_time() {
    let base = AudioData::silence(20_000, 44_100, 1);
    let mut impulse = vec![0.0; 10_000];
    impulse[5_000] = 1.0;
    let top = AudioData {
        samples: impulse,
        sample_rate: 22_050,
        channels: 1,
    };

    let out = overlay(&base, &top, Duration::ZERO).unwrap();

    assert_eq!(out.sample_rate, 44_100);
    assert_eq!(out.frames(), 20_000);
    let peak = out
        .samples
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(i, _)| i)
        .unwrap();
    assert!((9_990..=10_010).contains(&peak), "impulse landed at {peak}");
}
