use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

use crate::{
    error::{CoverError, Result},
    remote::{InferenceBackend, ModelRef, PredictionInput},
    types::{ConversionOutput, ConversionParams, Stem, StemUrls},
};

/// Four-stem demucs.
pub fn default_separation_model() -> ModelRef {
    ModelRef::versioned(
        "cjwbw",
        "demucs",
        "f7071661608670c53d5a15998a12c8e31006815343467c6999a43a051838883d",
    )
}

/// Zero-shot RVC.
pub fn default_conversion_model() -> ModelRef {
    ModelRef::versioned(
        "zsxkib",
        "realistic-voice-cloning",
        "0a9c7c558af4c0f20667c1bd1260ce32a2879944a0b9e44e1398660c077b9550",
    )
}

pub fn separate<B: InferenceBackend + ?Sized>(
    backend: &B,
    model: &ModelRef,
    track: &Path,
) -> Result<StemUrls> {
    let input = PredictionInput::new().file("audio", track);
    let output = backend.predict(model, &input)?;
    parse_stem_urls(model, &output)
}

pub fn convert<B: InferenceBackend + ?Sized>(
    backend: &B,
    model: &ModelRef,
    vocals: &Path,
    voice_sample: &Path,
    params: &ConversionParams,
) -> Result<ConversionOutput> {
    params.validate()?;
    let input = PredictionInput::new()
        .file("input_audio", vocals)
        .file("monitor_audio", voice_sample)
        .text("pitch_change", params.pitch_change.as_param())
        .text("f0_method", params.f0_method.as_str())
        .float("index_rate", params.index_rate as f64)
        .float("protect", params.protect as f64);
    let output = backend.predict(model, &input)?;
    parse_conversion_output(model, &output)
}

pub fn parse_stem_urls(model: &ModelRef, output: &Value) -> Result<StemUrls> {
    let obj = output.as_object().ok_or_else(|| {
        CoverError::provider(model, format!("expected an object of stem URLs, got {output}"))
    })?;

    let field = |stem: Stem| -> Result<String> {
        match obj.get(stem.as_str()).and_then(Value::as_str) {
            Some(url) if !url.is_empty() => Ok(url.to_string()),
            _ => Err(CoverError::provider(
                model,
                format!("separation output is missing `{stem}`"),
            )),
        }
    };

    Ok(StemUrls {
        vocals: field(Stem::Vocals)?,
        bass: field(Stem::Bass)?,
        drums: field(Stem::Drums)?,
        other: field(Stem::Other)?,
    })
}

pub fn parse_conversion_output(model: &ModelRef, output: &Value) -> Result<ConversionOutput> {
    let s = output.as_str().ok_or_else(|| {
        CoverError::provider(model, format!("expected a single output locator, got {output}"))
    })?;

    if s.starts_with("http://") || s.starts_with("https://") {
        return Ok(ConversionOutput::Url(s.to_string()));
    }

    if let Some(rest) = s.strip_prefix("data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoverError::provider(model, "malformed data URI"))?;
        if !header.ends_with(";base64") {
            return Err(CoverError::provider(model, "data URI is not base64 encoded"));
        }
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| CoverError::provider(model, format!("bad base64 payload: {e}")))?;
        return Ok(ConversionOutput::Inline(bytes));
    }

    Err(CoverError::provider(
        model,
        format!("unsupported output locator `{s}`"),
    ))
}
