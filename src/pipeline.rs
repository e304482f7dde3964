use std::{fs, path::PathBuf, time::Duration};

use rayon::prelude::*;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::{
    config::CoverConfig,
    core::mixer::{mix_files, overlay_files},
    error::{CoverError, Result},
    io::{
        net::{download_to, http_client},
        progress::{emit, CoverProgress, Stage},
    },
    remote::{
        models::{convert, separate},
        InferenceBackend,
    },
    types::{ConversionOutput, CoverResult, Stem, StemUrls},
};

/// Runs separation, instrumental mix, conversion and final mix, in that order.
///
/// Any error aborts the run. Temp files are only removed once the final
/// output has been written; an aborted run leaves what it already produced.
pub struct CoverPipeline<B: InferenceBackend> {
    backend: B,
    fetcher: Client,
    config: CoverConfig,
}

impl<B: InferenceBackend> CoverPipeline<B> {
    pub fn new(backend: B, config: CoverConfig) -> Result<Self> {
        Ok(Self {
            backend,
            fetcher: http_client()?,
            config,
        })
    }

    pub fn config(&self) -> &CoverConfig {
        &self.config
    }

    pub fn run(&self) -> Result<CoverResult> {
        let cfg = &self.config;
        let dir = cfg.work_dir.as_path();
        cfg.validate()?;
        info!(source = %cfg.source_track.display(), "starting cover generation");

        self.enter(Stage::Separating);
        let stems = separate(&self.backend, &cfg.separation_model, &cfg.source_track)?;
        self.require_voice_sample()?;
        self.fetch_stems(&stems)?;

        self.enter(Stage::MixingInstrumental);
        let instrumental = cfg.work_files.instrumental(dir);
        mix_files(
            &[
                cfg.work_files.stem(dir, Stem::Bass),
                cfg.work_files.stem(dir, Stem::Drums),
                cfg.work_files.stem(dir, Stem::Other),
            ],
            &instrumental,
        )?;

        self.enter(Stage::Converting);
        let converted = convert(
            &self.backend,
            &cfg.conversion_model,
            &cfg.work_files.stem(dir, Stem::Vocals),
            &cfg.voice_sample,
            &cfg.conversion,
        )?;

        self.enter(Stage::DownloadingConvertedVocal);
        let my_vocals = cfg.work_files.converted_vocals(dir);
        match converted {
            ConversionOutput::Url(url) => {
                download_to(&self.fetcher, &url, &my_vocals)?;
            }
            ConversionOutput::Inline(bytes) => {
                fs::write(&my_vocals, bytes)?;
                debug!(dest = %my_vocals.display(), "wrote inline conversion output");
            }
        }

        self.enter(Stage::FinalMixing);
        let final_mix = overlay_files(&instrumental, &my_vocals, Duration::ZERO, &cfg.output)?;

        self.cleanup()?;
        emit(CoverProgress::Finished);
        info!(output = %cfg.output.display(), "cover ready");

        Ok(CoverResult {
            output_path: cfg.output.clone(),
            duration: final_mix.duration(),
        })
    }

    fn enter(&self, stage: Stage) {
        info!(stage = %stage, "stage");
        emit(CoverProgress::Stage(stage));
    }

    /// Checked after separation so a missing token still fails first.
    fn require_voice_sample(&self) -> Result<()> {
        let sample = &self.config.voice_sample;
        if sample.is_file() {
            return Ok(());
        }
        Err(CoverError::Config(format!(
            "voice sample not found: {}",
            sample.display()
        )))
    }

    /// The four stems are independent, so they are fetched in parallel.
    fn fetch_stems(&self, urls: &StemUrls) -> Result<Vec<PathBuf>> {
        let dir = self.config.work_dir.as_path();
        let files = &self.config.work_files;
        let fetcher = &self.fetcher;
        Stem::ALL
            .par_iter()
            .map(|&stem| download_to(fetcher, urls.get(stem), &files.stem(dir, stem)))
            .collect()
    }

    fn cleanup(&self) -> Result<()> {
        for path in self.config.work_files.all(&self.config.work_dir) {
            if path.exists() {
                fs::remove_file(&path)?;
                debug!(path = %path.display(), "removed temp file");
            }
        }
        Ok(())
    }
}
