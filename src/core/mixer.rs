use std::{path::Path, time::Duration};

use tracing::info;

use crate::{
    core::{
        audio::{read_audio, write_audio},
        dsp::conform,
    },
    error::{CoverError, Result},
    types::AudioData,
};

fn target_format<'a>(tracks: impl IntoIterator<Item = &'a AudioData>) -> (u32, u16) {
    tracks.into_iter().fold((0, 0), |(sr, ch), t| {
        (sr.max(t.sample_rate), ch.max(t.channels))
    })
}

/// Sums tracks sample-wise, aligned from the start. No normalization.
/// The result is as long as the longest input.
pub fn sum_mix(tracks: &[AudioData]) -> Result<AudioData> {
    if tracks.is_empty() {
        return Err(CoverError::Config("sum mix needs at least one track".into()));
    }
    let (sample_rate, channels) = target_format(tracks);

    let conformed = tracks
        .iter()
        .map(|t| conform(t, sample_rate, channels))
        .collect::<Result<Vec<_>>>()?;

    let len = conformed.iter().map(|t| t.samples.len()).max().unwrap_or(0);
    let mut samples = vec![0.0f32; len];
    for track in &conformed {
        for (acc, s) in samples.iter_mut().zip(&track.samples) {
            *acc += *s;
        }
    }

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Sums `top` into `base` starting `offset` into `base`. The output grows to
/// fit whichever ends later.
pub fn overlay(base: &AudioData, top: &AudioData, offset: Duration) -> Result<AudioData> {
    let (sample_rate, channels) = target_format([base, top]);
    let base = conform(base, sample_rate, channels)?;
    let top = conform(top, sample_rate, channels)?;

    let offset_frames = (offset.as_secs_f64() * sample_rate as f64).round() as usize;
    let start = offset_frames * channels as usize;

    let mut samples = base.samples;
    let end = start + top.samples.len();
    if samples.len() < end {
        samples.resize(end, 0.0);
    }
    for (acc, s) in samples[start..end].iter_mut().zip(&top.samples) {
        *acc += *s;
    }

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Decode every input, sum them and encode the result to `output`.
pub fn mix_files<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<AudioData> {
    let tracks = inputs
        .iter()
        .map(read_audio)
        .collect::<Result<Vec<_>>>()?;
    let mixed = sum_mix(&tracks)?;
    write_audio(output, &mixed)?;
    info!(
        inputs = inputs.len(),
        output = %output.display(),
        seconds = mixed.duration().as_secs_f32(),
        "sum mix written"
    );
    Ok(mixed)
}

/// Decode both inputs, lay `top` over `base` at `offset` and encode to `output`.
pub fn overlay_files(base: &Path, top: &Path, offset: Duration, output: &Path) -> Result<AudioData> {
    let base = read_audio(base)?;
    let top = read_audio(top)?;
    let mixed = overlay(&base, &top, offset)?;
    write_audio(output, &mixed)?;
    info!(
        output = %output.display(),
        seconds = mixed.duration().as_secs_f32(),
        "overlay written"
    );
    Ok(mixed)
}
