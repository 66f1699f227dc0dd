use std::time::Duration;
use thiserror::Error;

/// Errors produced by the pipeline, its stages and its providers.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure while loading templates or writing pages.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No usable provider credential, missing page template, or invalid settings.
    ///
    /// Always fatal. Raised before any generative call is issued.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generated or parsed content failed a quantity/shape floor.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// HTTP error with status code, response body, and optional Retry-After hint.
    ///
    /// Returned by [`Provider`](crate::provider::Provider) implementations when
    /// the provider answers with a non-success status. A 429 status or a quota
    /// marker in the body is the rate-limit signal, see
    /// [`is_rate_limited`](crate::retry::is_rate_limited).
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 429, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
        /// Parsed `Retry-After` header value, if present.
        retry_after: Option<Duration>,
    },

    /// The provider answered, but the payload fits no expected schema.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// A stage ran before a field it reads had been populated.
    #[error("Stage '{stage}' requires state field '{field}', which is not populated")]
    MissingState { stage: String, field: &'static str },

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
