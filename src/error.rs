use serde::Serialize;
use thiserror::Error;

/// Failure classes for a single LLM call. Callers branch on the kind
/// instead of string-matching a message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LlmError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("quota or rate limit exhausted: {0}")]
    Quota(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("API error: {0}")]
    Api(String),
}

impl LlmError {
    /// Classify a plain HTTP status + body into an error kind.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => LlmError::Auth(body),
            429 => LlmError::Quota(body),
            _ => LlmError::Api(format!("status {}: {}", status, body)),
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::Malformed(e.to_string())
        } else {
            LlmError::Network(e.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The question input contained no usable lines. Nothing was extracted
    /// and no LLM call was made.
    #[error("no questions provided")]
    NoQuestions,

    #[error("no documents provided")]
    NoDocuments,

    #[error("unsupported media type for {0}: only PDF and Word documents are accepted")]
    UnsupportedMediaType(String),

    #[error("failed to read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
