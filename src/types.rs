use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use crate::error::CoverError;

/// Interleaved f32 PCM.
#[derive(Clone, Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    pub fn silence(frames: usize, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples: vec![0.0; frames * channels as usize],
            sample_rate,
            channels,
        }
    }

    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stem {
    Vocals,
    Bass,
    Drums,
    Other,
}

impl Stem {
    pub const ALL: [Stem; 4] = [Stem::Vocals, Stem::Bass, Stem::Drums, Stem::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stem::Vocals => "vocals",
            Stem::Bass => "bass",
            Stem::Drums => "drums",
            Stem::Other => "other",
        }
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result artifacts of the separation model, one URL per stem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StemUrls {
    pub vocals: String,
    pub bass: String,
    pub drums: String,
    pub other: String,
}

impl StemUrls {
    pub fn get(&self, stem: Stem) -> &str {
        match stem {
            Stem::Vocals => &self.vocals,
            Stem::Bass => &self.bass,
            Stem::Drums => &self.drums,
            Stem::Other => &self.other,
        }
    }
}

/// Result of the conversion model: either a locator to fetch or the audio itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionOutput {
    Url(String),
    Inline(Vec<u8>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PitchChange {
    #[default]
    NoChange,
    /// Signed offset in semitones; 12 is one octave up.
    Semitones(i32),
}

impl PitchChange {
    pub fn as_param(&self) -> String {
        match self {
            PitchChange::NoChange => "no-change".to_string(),
            PitchChange::Semitones(n) => n.to_string(),
        }
    }
}

impl FromStr for PitchChange {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("no-change") || s.is_empty() {
            return Ok(PitchChange::NoChange);
        }
        s.parse::<i32>()
            .map(PitchChange::Semitones)
            .map_err(|_| CoverError::Config(format!("invalid pitch change `{s}`")))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum F0Method {
    /// Best choice for singing.
    #[default]
    Rmvpe,
    MangioCrepe,
}

impl F0Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            F0Method::Rmvpe => "rmvpe",
            F0Method::MangioCrepe => "mangio-crepe",
        }
    }
}

impl FromStr for F0Method {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rmvpe" => Ok(F0Method::Rmvpe),
            "mangio-crepe" => Ok(F0Method::MangioCrepe),
            other => Err(CoverError::Config(format!("unknown f0 method `{other}`"))),
        }
    }
}

/// Parameters of the zero-shot voice conversion call.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionParams {
    pub pitch_change: PitchChange,
    pub f0_method: F0Method,
    /// 0 uses the monitor sample directly (zero-shot).
    pub index_rate: f32,
    /// Consonant and breath protection strength.
    pub protect: f32,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            pitch_change: PitchChange::NoChange,
            f0_method: F0Method::Rmvpe,
            index_rate: 0.0,
            protect: 0.33,
        }
    }
}

impl ConversionParams {
    pub fn validate(&self) -> Result<(), CoverError> {
        for (name, v) in [("index_rate", self.index_rate), ("protect", self.protect)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(CoverError::Config(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct CoverResult {
    pub output_path: PathBuf,
    pub duration: Duration,
}
