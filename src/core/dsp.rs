use anyhow::Context;
use rubato::{
    InterpolationParameters, InterpolationType, Resampler, SincFixedIn, WindowFunction,
};

use crate::{error::Result, types::AudioData};

/// Splits interleaved samples into one buffer per channel.
pub fn deinterleave(interleaved: &[f32], channels: u16) -> Vec<Vec<f32>> {
    let ch = channels.max(1) as usize;
    let frames = interleaved.len() / ch;
    let mut planar = vec![Vec::with_capacity(frames); ch];
    for frame in interleaved.chunks_exact(ch) {
        for (c, &s) in frame.iter().enumerate() {
            planar[c].push(s);
        }
    }
    planar
}

pub fn interleave(planar: &[Vec<f32>]) -> Vec<f32> {
    let frames = planar.iter().map(Vec::len).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * planar.len());
    for i in 0..frames {
        for ch in planar {
            out.push(ch[i]);
        }
    }
    out
}

/// Output channel `c` takes source channel `c % src`, so mono is duplicated.
pub fn remap_channels(interleaved: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to {
        return interleaved.to_vec();
    }
    let from = from.max(1) as usize;
    let to = to.max(1) as usize;
    let mut out = Vec::with_capacity(interleaved.len() / from * to);
    for frame in interleaved.chunks_exact(from) {
        for c in 0..to {
            out.push(frame[c % from]);
        }
    }
    out
}

/// Resample planar audio in one pass. The result has exactly
/// `round(frames * to_sr / from_sr)` frames per channel.
pub fn resample(planar: &[Vec<f32>], from_sr: u32, to_sr: u32) -> Result<Vec<Vec<f32>>> {
    let frames = planar.first().map(Vec::len).unwrap_or(0);
    if from_sr == to_sr || frames == 0 {
        return Ok(planar.to_vec());
    }

    let params = InterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: InterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        to_sr as f64 / from_sr as f64,
        2.0,
        params,
        frames,
        planar.len(),
    )
    .context("Failed to build resampler")?;

    let mut output = resampler
        .process(planar, None)
        .context("Resampling failed")?;

    let expected = (frames as f64 * to_sr as f64 / from_sr as f64).round() as usize;
    for ch in &mut output {
        ch.resize(expected, 0.0);
    }
    Ok(output)
}

/// Bring `audio` to the given sample rate and channel count.
pub fn conform(audio: &AudioData, sample_rate: u32, channels: u16) -> Result<AudioData> {
    let samples = remap_channels(&audio.samples, audio.channels, channels);
    if audio.sample_rate == sample_rate {
        return Ok(AudioData {
            samples,
            sample_rate,
            channels,
        });
    }

    let planar = deinterleave(&samples, channels);
    let resampled = resample(&planar, audio.sample_rate, sample_rate)?;
    Ok(AudioData {
        samples: interleave(&resampled),
        sample_rate,
        channels,
    })
}
