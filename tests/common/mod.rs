#![allow(dead_code)]

use std::{f32::consts::PI, io::Cursor, path::Path};

use voice_cover_core::AudioData;

pub fn sine(freq: f32, secs: f32, sample_rate: u32, channels: u16, amp: f32) -> AudioData {
    let frames = (secs * sample_rate as f32).round() as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let s = (2.0 * PI * freq * t).sin() * amp;
        for _ in 0..channels {
            samples.push(s);
        }
    }
    AudioData {
        samples,
        sample_rate,
        channels,
    }
}

/// 16-bit PCM WAV bytes, the same encoding `write_audio` produces.
pub fn wav_bytes(audio: &AudioData) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for s in &audio.samples {
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn write_wav(path: &Path, audio: &AudioData) {
    std::fs::write(path, wav_bytes(audio)).unwrap();
}
