//! Provider trait, normalized request type and provider selection.
//!
//! The [`Provider`] trait abstracts over generative services. A provider takes
//! a prompt plus the [`OutputSchema`] the answer must follow, performs one
//! remote call, and returns the decoded JSON document. Schema validation and
//! retry policy live with the caller.
//!
//! ## Architecture
//!
//! ```text
//! StrategistStage ──► GenerationRequest ──► Provider::generate() ──► serde_json::Value
//!                                                 │
//!                                 ┌───────────────┼───────────────┐
//!                           OpenAiProvider   GeminiProvider   MockProvider
//!                       /v1/chat/completions  :generateContent  canned replies
//! ```

#[cfg(feature = "gemini")]
pub mod gemini;
pub mod mock;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "gemini")]
pub use gemini::GeminiProvider;
pub use mock::{MockProvider, MockReply};
#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;

use crate::config::{Credentials, ProviderSettings};
use crate::error::Result;
use crate::parsing::{parse_value_defensively, truncate};
use crate::schema::OutputSchema;
use crate::PipelineError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A provider-agnostic generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully rendered prompt text.
    pub prompt: String,

    /// Shape the answer must follow.
    pub schema: OutputSchema,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, schema: OutputSchema) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
        }
    }
}

/// Abstraction over generative providers.
///
/// Implementors make exactly one remote call per `generate`. Non-success
/// statuses surface as [`PipelineError::HttpError`], transport failures as
/// [`PipelineError::Request`], and undecodable answers as
/// [`PipelineError::MalformedResponse`].
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Issue one structured generation call.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value>;

    /// Human-readable name for logging and events.
    fn name(&self) -> &'static str;
}

/// Pick the provider for a run from the available credentials.
///
/// OpenAI wins when its key is present, Gemini is next. A provider compiled
/// out by its cargo feature counts as unavailable.
pub fn select_provider(
    credentials: &Credentials,
    settings: &ProviderSettings,
) -> Result<Arc<dyn Provider>> {
    #[cfg(feature = "openai")]
    if let Some(key) = &credentials.openai_api_key {
        tracing::info!(provider = "openai", model = %settings.openai_model, "selected provider");
        return Ok(Arc::new(OpenAiProvider::new(key.clone(), settings)?));
    }

    #[cfg(feature = "gemini")]
    if let Some(key) = &credentials.gemini_api_key {
        tracing::info!(provider = "gemini", model = %settings.gemini_model, "selected provider");
        return Ok(Arc::new(GeminiProvider::new(key.clone(), settings)?));
    }

    let _ = (credentials, settings);
    Err(PipelineError::Configuration(format!(
        "No API keys found: set {} or {} (compiled providers: [{}])",
        crate::config::OPENAI_API_KEY,
        crate::config::GEMINI_API_KEY,
        available_providers().join(", ")
    )))
}

/// Names of the providers compiled into this build, in selection order.
pub fn available_providers() -> Vec<&'static str> {
    #[allow(unused_mut)]
    let mut providers = Vec::new();
    #[cfg(feature = "openai")]
    providers.push("openai");
    #[cfg(feature = "gemini")]
    providers.push("gemini");
    providers
}

/// Parse a `Retry-After` header value as seconds.
pub(crate) fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Send a JSON POST and return the decoded JSON body.
///
/// Non-success statuses become [`PipelineError::HttpError`] with the body
/// text and any `Retry-After` hint.
#[cfg_attr(not(any(feature = "openai", feature = "gemini")), allow(dead_code))]
pub(crate) async fn send_json(request: reqwest::RequestBuilder) -> Result<Value> {
    let resp = request.send().await?;
    let status = resp.status();

    if !status.is_success() {
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = resp.text().await.unwrap_or_default();
        return Err(PipelineError::HttpError {
            status: status.as_u16(),
            body,
            retry_after,
        });
    }

    Ok(resp.json().await?)
}

/// Decode the model's answer text into JSON, or fail with the provider name.
#[cfg_attr(not(any(feature = "openai", feature = "gemini")), allow(dead_code))]
pub(crate) fn decode_answer(provider: &str, text: Option<&str>) -> Result<Value> {
    let text = text.ok_or_else(|| {
        PipelineError::MalformedResponse(format!("{} response carried no answer text", provider))
    })?;
    parse_value_defensively(text).map_err(|e| match e {
        PipelineError::MalformedResponse(msg) => {
            PipelineError::MalformedResponse(format!("{}: {}", provider, msg))
        }
        other => other,
    })
}

/// Short preview of a raw provider body for logs.
#[cfg_attr(not(any(feature = "openai", feature = "gemini")), allow(dead_code))]
pub(crate) fn preview(body: &Value) -> String {
    truncate(&body.to_string(), 200)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credentials_is_configuration_error() {
        let err = select_provider(&Credentials::default(), &ProviderSettings::default())
            .err()
            .unwrap();
        match err {
            PipelineError::Configuration(msg) => assert!(msg.contains("No API keys found")),
            other => panic!("Expected Configuration error, got {other:?}"),
        }
    }

    #[cfg(all(feature = "openai", feature = "gemini"))]
    #[test]
    fn test_openai_preferred_over_gemini() {
        let creds = Credentials::default()
            .with_openai_key("sk-test")
            .with_gemini_key("AIza-test");
        let provider = select_provider(&creds, &ProviderSettings::default()).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[cfg(feature = "gemini")]
    #[test]
    fn test_gemini_when_only_gemini_key() {
        let creds = Credentials::default().with_gemini_key("AIza-test");
        let provider = select_provider(&creds, &ProviderSettings::default()).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[cfg(all(feature = "openai", feature = "gemini"))]
    #[test]
    fn test_available_providers_order() {
        assert_eq!(available_providers(), vec!["openai", "gemini"]);
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after(" 30 "), Some(Duration::from_secs(30)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_decode_answer() {
        let v = decode_answer("openai", Some("```json\n{\"questions\": []}\n```")).unwrap();
        assert!(v["questions"].is_array());

        let err = decode_answer("gemini", None).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedResponse(ref m) if m.contains("gemini")));

        let err = decode_answer("gemini", Some("sorry, I cannot")).unwrap_err();
        assert!(
            matches!(err, PipelineError::MalformedResponse(ref m) if m.starts_with("gemini: "))
        );
    }
}
