use std::{fs, io::ErrorKind, path::Path, thread, time::Duration};

use reqwest::blocking::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{
    config::ProviderConfig,
    error::{CoverError, Result},
    io::net::http_client,
    remote::{InferenceBackend, InputValue, ModelRef, PredictionInput},
};

pub const DEFAULT_API_BASE: &str = "https://api.replicate.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    Aborted,
}

impl PredictionStatus {
    fn is_terminal(self) -> bool {
        !matches!(self, PredictionStatus::Starting | PredictionStatus::Processing)
    }

    fn as_str(self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
            PredictionStatus::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    urls: FileUrls,
}

#[derive(Debug, Deserialize)]
struct FileUrls {
    get: String,
}

/// Blocking client for the hosted prediction API.
///
/// The API token is handed in at construction; a client without one fails
/// every call before touching the network or the filesystem.
pub struct ReplicateClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    poll_interval: Duration,
}

impl ReplicateClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: DEFAULT_API_BASE.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
            poll_interval: Duration::from_secs(1),
        })
    }

    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        Ok(Self::new(cfg.api_token.clone())?
            .with_base_url(&cfg.base_url)
            .with_poll_interval(cfg.poll_interval))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn token(&self, model: &ModelRef) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| CoverError::provider(model, "API token is not set"))
    }

    fn upload_file(&self, token: &str, model: &ModelRef, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                CoverError::Config(format!("input file not found: {}", path.display()))
            }
            _ => CoverError::from(e),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());

        debug!(file = %path.display(), bytes = bytes.len(), "uploading input file");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime_for(path))
            .map_err(|e| CoverError::provider(model, e))?;
        let form = Form::new().part("content", part);

        let resp = self
            .client
            .post(format!("{}/v1/files", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .map_err(|e| CoverError::provider(model, e))?;

        let uploaded: UploadedFile = check_status(model, resp)?
            .json()
            .map_err(|e| CoverError::provider(model, format!("unexpected upload response: {e}")))?;
        Ok(uploaded.urls.get)
    }

    fn resolve_inputs(&self, token: &str, model: &ModelRef, input: &PredictionInput) -> Result<Value> {
        let mut fields = Map::new();
        for (name, value) in input.iter() {
            let v = match value {
                InputValue::File(path) => Value::String(self.upload_file(token, model, path)?),
                InputValue::Text(s) => Value::String(s.clone()),
                InputValue::Integer(i) => json!(i),
                InputValue::Float(f) => json!(f),
            };
            fields.insert(name.to_string(), v);
        }
        Ok(Value::Object(fields))
    }

    fn create_prediction(&self, token: &str, model: &ModelRef, input: Value) -> Result<Prediction> {
        let (url, body) = match &model.version {
            Some(version) => (
                format!("{}/v1/predictions", self.base_url),
                json!({ "version": version, "input": input }),
            ),
            None => (
                format!(
                    "{}/v1/models/{}/{}/predictions",
                    self.base_url, model.owner, model.name
                ),
                json!({ "input": input }),
            ),
        };

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .map_err(|e| CoverError::provider(model, e))?;

        parse_prediction(model, resp)
    }

    fn get_prediction(&self, token: &str, model: &ModelRef, id: &str) -> Result<Prediction> {
        let resp = self
            .client
            .get(format!("{}/v1/predictions/{}", self.base_url, id))
            .bearer_auth(token)
            .send()
            .map_err(|e| CoverError::provider(model, e))?;

        parse_prediction(model, resp)
    }
}

impl InferenceBackend for ReplicateClient {
    fn predict(&self, model: &ModelRef, input: &PredictionInput) -> Result<Value> {
        let token = self.token(model)?;
        let input = self.resolve_inputs(token, model, input)?;

        let mut prediction = self.create_prediction(token, model, input)?;
        info!(model = %model, id = %prediction.id, "prediction created");

        while !prediction.status.is_terminal() {
            debug!(id = %prediction.id, status = prediction.status.as_str(), "waiting for prediction");
            thread::sleep(self.poll_interval);
            prediction = self.get_prediction(token, model, &prediction.id)?;
        }

        match prediction.status {
            PredictionStatus::Succeeded => match prediction.output {
                Some(output) if !output.is_null() => Ok(output),
                _ => Err(CoverError::provider(model, "prediction succeeded without output")),
            },
            status => {
                let reason = match prediction.error {
                    Some(Value::String(s)) => s,
                    Some(other) if !other.is_null() => other.to_string(),
                    _ => "no error detail".to_string(),
                };
                Err(CoverError::provider(
                    model,
                    format!("prediction {} {}: {}", prediction.id, status.as_str(), reason),
                ))
            }
        }
    }
}

fn check_status(model: &ModelRef, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);
    Err(CoverError::provider(model, format!("HTTP {status}: {detail}")))
}

fn parse_prediction(model: &ModelRef, resp: Response) -> Result<Prediction> {
    check_status(model, resp)?
        .json()
        .map_err(|e| CoverError::provider(model, format!("unexpected prediction response: {e}")))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => "application/octet-stream",
    }
}
