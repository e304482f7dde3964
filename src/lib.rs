//! # voice-cover-core
//!
//! Generates an AI cover of a song: hosted stem separation, hosted zero-shot
//! voice conversion of the isolated vocal, and local mixing of the converted
//! vocal back over the instrumental.

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod remote;
pub mod types;

pub use crate::{
    config::{CoverConfig, ProviderConfig, WorkFiles},
    core::{
        audio::{read_audio, write_audio, OutputFormat},
        mixer::{mix_files, overlay, overlay_files, sum_mix},
    },
    error::{CoverError, Result},
    io::{
        net::download_to,
        progress::{set_progress_callback, CoverProgress, Stage},
    },
    pipeline::CoverPipeline,
    remote::{InferenceBackend, ModelRef, PredictionInput, ReplicateClient},
    types::{
        AudioData, ConversionOutput, ConversionParams, CoverResult, F0Method, PitchChange, Stem,
        StemUrls,
    },
};
