use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crate::{
    core::audio::OutputFormat,
    error::{CoverError, Result},
    remote::{
        models::{default_conversion_model, default_separation_model},
        replicate::DEFAULT_API_BASE,
        ModelRef,
    },
    types::{ConversionParams, Stem},
};

/// Where and how to reach the hosted models.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub poll_interval: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_API_BASE.into(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self> {
        let poll_ms: u64 = parse_var("VOICE_COVER_POLL_MS", 1000)?;
        Ok(Self {
            api_token: env::var("REPLICATE_API_TOKEN").ok(),
            base_url: env::var("REPLICATE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            poll_interval: Duration::from_millis(poll_ms),
        })
    }
}

/// Names of the intermediate artifacts, relative to the work directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkFiles {
    pub vocals: String,
    pub bass: String,
    pub drums: String,
    pub other: String,
    pub instrumental: String,
    pub converted_vocals: String,
}

impl Default for WorkFiles {
    fn default() -> Self {
        Self {
            vocals: "temp_vocals.mp3".into(),
            bass: "temp_bass.mp3".into(),
            drums: "temp_drums.mp3".into(),
            other: "temp_other.mp3".into(),
            instrumental: "temp_instrumental.wav".into(),
            converted_vocals: "temp_my_vocals.mp3".into(),
        }
    }
}

impl WorkFiles {
    pub fn stem(&self, dir: &Path, stem: Stem) -> PathBuf {
        dir.join(match stem {
            Stem::Vocals => &self.vocals,
            Stem::Bass => &self.bass,
            Stem::Drums => &self.drums,
            Stem::Other => &self.other,
        })
    }

    pub fn instrumental(&self, dir: &Path) -> PathBuf {
        dir.join(&self.instrumental)
    }

    pub fn converted_vocals(&self, dir: &Path) -> PathBuf {
        dir.join(&self.converted_vocals)
    }

    pub fn all(&self, dir: &Path) -> [PathBuf; 6] {
        [
            self.stem(dir, Stem::Vocals),
            self.stem(dir, Stem::Bass),
            self.stem(dir, Stem::Drums),
            self.stem(dir, Stem::Other),
            self.instrumental(dir),
            self.converted_vocals(dir),
        ]
    }
}

/// Inputs, outputs and model settings for one cover run.
#[derive(Clone, Debug)]
pub struct CoverConfig {
    pub source_track: PathBuf,
    pub voice_sample: PathBuf,
    pub output: PathBuf,
    pub work_dir: PathBuf,
    pub work_files: WorkFiles,
    pub separation_model: ModelRef,
    pub conversion_model: ModelRef,
    pub conversion: ConversionParams,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            source_track: "ed_sheeran_perfect.mp3".into(),
            voice_sample: "my_voice_reference.mp3".into(),
            output: "perfect_my_version.mp3".into(),
            work_dir: ".".into(),
            work_files: WorkFiles::default(),
            separation_model: default_separation_model(),
            conversion_model: default_conversion_model(),
            conversion: ConversionParams::default(),
        }
    }
}

impl CoverConfig {
    /// Defaults overridden by `VOICE_COVER_*` variables.
    pub fn from_env() -> Result<Self> {
        let d = CoverConfig::default();
        let conversion = ConversionParams {
            pitch_change: parse_var("VOICE_COVER_PITCH_CHANGE", d.conversion.pitch_change)?,
            f0_method: parse_var("VOICE_COVER_F0_METHOD", d.conversion.f0_method)?,
            index_rate: parse_var("VOICE_COVER_INDEX_RATE", d.conversion.index_rate)?,
            protect: parse_var("VOICE_COVER_PROTECT", d.conversion.protect)?,
        };
        let cfg = Self {
            source_track: path_var("VOICE_COVER_SOURCE", d.source_track),
            voice_sample: path_var("VOICE_COVER_VOICE_SAMPLE", d.voice_sample),
            output: path_var("VOICE_COVER_OUTPUT", d.output),
            work_dir: path_var("VOICE_COVER_WORK_DIR", d.work_dir),
            work_files: d.work_files,
            separation_model: parse_var("VOICE_COVER_SEPARATION_MODEL", d.separation_model)?,
            conversion_model: parse_var("VOICE_COVER_CONVERSION_MODEL", d.conversion_model)?,
            conversion,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects settings a run could only discover after paying for remote work.
    pub fn validate(&self) -> Result<()> {
        self.conversion.validate()?;
        OutputFormat::from_path(&self.output)?;
        Ok(())
    }
}

fn path_var(key: &str, default: PathBuf) -> PathBuf {
    env::var(key).map(PathBuf::from).unwrap_or(default)
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CoverError::Config(format!("{key}={raw}: {e}"))),
        Err(_) => Ok(default),
    }
}
