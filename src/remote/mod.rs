//! Hosted model invocation.
//!
//! [`InferenceBackend`] is the seam the pipeline depends on; [`ReplicateClient`]
//! is the HTTP implementation. The typed wrappers in [`models`] turn raw model
//! output into [`StemUrls`](crate::types::StemUrls) and
//! [`ConversionOutput`](crate::types::ConversionOutput).

pub mod models;
pub mod replicate;

use std::{collections::BTreeMap, fmt, path::PathBuf, str::FromStr};

use crate::error::{CoverError, Result};

pub use replicate::ReplicateClient;

/// `owner/name[:version]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl ModelRef {
    pub fn versioned(owner: &str, name: &str, version: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version: Some(version.to_string()),
        }
    }
}

impl FromStr for ModelRef {
    type Err = CoverError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let bad = || CoverError::Config(format!("invalid model identifier `{s}`"));

        let (path, version) = match s.split_once(':') {
            Some((p, v)) if !v.is_empty() => (p, Some(v.to_string())),
            Some(_) => return Err(bad()),
            None => (s, None),
        };
        let (owner, name) = path.split_once('/').ok_or_else(bad)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(bad());
        }

        Ok(ModelRef {
            owner: owner.to_string(),
            name: name.to_string(),
            version,
        })
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)?;
        if let Some(v) = &self.version {
            write!(f, ":{v}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    /// Local file, uploaded by the backend before the prediction is created.
    File(PathBuf),
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Named model inputs, in a stable order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PredictionInput {
    fields: BTreeMap<String, InputValue>,
}

impl PredictionInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.fields.insert(name.to_string(), InputValue::File(path.into()));
        self
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), InputValue::Text(value.into()));
        self
    }

    pub fn integer(mut self, name: &str, value: i64) -> Self {
        self.fields.insert(name.to_string(), InputValue::Integer(value));
        self
    }

    pub fn float(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), InputValue::Float(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Runs a hosted model to completion and returns its raw output.
pub trait InferenceBackend {
    fn predict(&self, model: &ModelRef, input: &PredictionInput) -> Result<serde_json::Value>;
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for &B {
    fn predict(&self, model: &ModelRef, input: &PredictionInput) -> Result<serde_json::Value> {
        (**self).predict(model, input)
    }
}
