use thiserror::Error;

/// Central error type for the voice-cover-core crate.
#[derive(Debug, Error)]
pub enum CoverError {
    // Generic fallback (wraps anyhow)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),

    // Domain-specific variants
    #[error("Provider error ({model}): {reason}")]
    Provider { model: String, reason: String },

    #[error("Failed to download {url}{}", status_suffix(.status))]
    Download { url: String, status: Option<u16> },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl CoverError {
    pub(crate) fn provider(model: impl ToString, reason: impl ToString) -> Self {
        CoverError::Provider {
            model: model.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode(path: &std::path::Path, reason: impl ToString) -> Self {
        CoverError::Decode {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

// --- Implement From conversions for common errors ---
impl From<std::io::Error> for CoverError {
    fn from(e: std::io::Error) -> Self {
        CoverError::Anyhow(e.into())
    }
}

impl From<serde_json::Error> for CoverError {
    fn from(e: serde_json::Error) -> Self {
        CoverError::Anyhow(e.into())
    }
}

pub type Result<T> = std::result::Result<T, CoverError>;
