use std::{env, fs::File, io::ErrorKind, path::Path, process::Command};

use anyhow::Context;
use hound::WavWriter;
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
    formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};
use tracing::{debug, warn};

use crate::{
    error::{CoverError, Result},
    types::AudioData,
};

/// Decodes any container/codec symphonia knows into interleaved f32 samples.
pub fn read_audio<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path: &Path = path.as_ref();

    let file: File = File::open(path).map_err(|e| CoverError::decode(path, e))?;

    let mss: MediaSourceStream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint: Hint = Hint::new();

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| CoverError::decode(path, e))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| CoverError::decode(path, "no default track found"))?;
    let track_id = track.id;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| CoverError::decode(path, e))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_rate: u32 = 0;
    let mut channels: u16 = 0;
    let mut skipped: usize = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(CoverError::decode(path, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!(
                    path = %path.display(),
                    ts = packet.ts(),
                    reason,
                    "skipping undecodable packet"
                );
                skipped += 1;
                continue;
            }
            Err(e) => return Err(CoverError::decode(path, e)),
        };
        sample_rate = decoded.spec().rate;
        channels = decoded.spec().channels.count() as u16;

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);

        samples.extend_from_slice(buffer.samples());
    }

    if sample_rate == 0 || channels == 0 {
        return Err(CoverError::decode(path, "no decodable audio frames"));
    }

    debug!(
        path = %path.display(),
        sample_rate,
        channels,
        samples = samples.len(),
        skipped,
        "read audio"
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Container written by [`write_audio`], picked from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Wav,
    Mp3,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("wav") => Ok(OutputFormat::Wav),
            Some("mp3") => Ok(OutputFormat::Mp3),
            _ => Err(CoverError::Config(format!(
                "unsupported output format for {} (expected .wav or .mp3)",
                path.display()
            ))),
        }
    }
}

/// Encodes `audio` in the format named by the extension of `path`.
/// Samples outside [-1, 1] are clamped.
pub fn write_audio<P: AsRef<Path>>(path: P, audio: &AudioData) -> Result<()> {
    let path = path.as_ref();
    match OutputFormat::from_path(path)? {
        OutputFormat::Wav => write_wav(path, audio)?,
        OutputFormat::Mp3 => write_mp3(path, audio)?,
    }
    debug!(path = %path.display(), frames = audio.frames(), "wrote audio");
    Ok(())
}

fn write_wav(path: &Path, audio: &AudioData) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create audio file: {:?}", path))?;
    for sample in &audio.samples {
        let s = (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer.write_sample(s).context("Failed to write sample")?;
    }

    writer.finalize().context("Failed to finalize WAV")?;
    Ok(())
}

/// Stages the PCM as WAV next to `path` and hands it to ffmpeg's libmp3lame.
fn write_mp3(path: &Path, audio: &AudioData) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staged = tempfile::Builder::new()
        .suffix(".wav")
        .tempfile_in(dir)?;
    write_wav(staged.path(), audio)?;

    let ffmpeg = ffmpeg_binary();
    let output = Command::new(&ffmpeg)
        .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
        .arg(staged.path())
        .args(["-codec:a", "libmp3lame", "-q:a", "2", "-f", "mp3"])
        .arg(path)
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => CoverError::Config(format!(
                "`{ffmpeg}` not found; it is needed to write MP3 output"
            )),
            _ => CoverError::from(e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoverError::Config(format!(
            "`{ffmpeg}` failed to encode {}: {}",
            path.display(),
            stderr.trim()
        )));
    }
    Ok(())
}

fn ffmpeg_binary() -> String {
    env::var("VOICE_COVER_FFMPEG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "ffmpeg".to_string())
}
