//! Provider for the Google Gemini `generateContent` API.
//!
//! Endpoint: `/v1beta/models/{model}:generateContent`. Structured output is
//! requested with `responseMimeType = application/json` and a
//! `responseSchema`. Quota exhaustion comes back as HTTP 429 with a
//! `RESOURCE_EXHAUSTED` status in the body.

use super::{decode_answer, preview, send_json, GenerationRequest, Provider};
use crate::config::{redact, LlmConfig, ProviderSettings};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// Gemini provider.
#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    llm: LlmConfig,
    client: Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a provider using the Gemini model, base URL and timeout from `settings`.
    pub fn new(api_key: impl Into<String>, settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model: settings.gemini_model.clone(),
            base_url: settings.gemini_base_url.clone(),
            llm: settings.llm.clone(),
            client: settings.build_client()?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn build_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "contents": [{"role": "user", "parts": [{"text": request.prompt}]}],
            "generationConfig": {
                "temperature": self.llm.temperature,
                "maxOutputTokens": self.llm.max_tokens,
                "responseMimeType": "application/json",
                "responseSchema": to_gemini_schema(&request.schema.json_schema()),
            },
        })
    }

    fn build_http_request(&self, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(body)
    }

    /// `candidates[0].content.parts[0].text`
    fn answer_text(response: &Value) -> Option<&str> {
        response
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|v| v.as_str())
    }
}

/// Gemini accepts an OpenAPI subset: `type` values are upper-case and
/// `additionalProperties` is not allowed.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != "additionalProperties")
                .map(|(k, v)| match (k.as_str(), v) {
                    ("type", Value::String(t)) => (k.clone(), Value::String(t.to_uppercase())),
                    _ => (k.clone(), to_gemini_schema(v)),
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        let body = self.build_body(request);
        let response = send_json(self.build_http_request(&body)).await?;

        let text = Self::answer_text(&response);
        if text.is_none() {
            let reason = response
                .pointer("/promptFeedback/blockReason")
                .and_then(|v| v.as_str())
                .unwrap_or("none");
            tracing::warn!(
                provider = "gemini",
                block_reason = reason,
                body = %preview(&response),
                "no candidate text"
            );
        }
        decode_answer("gemini", text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OutputSchema;

    fn provider() -> GeminiProvider {
        GeminiProvider::new("AIzaSyTESTKEY0123", &ProviderSettings::default()).unwrap()
    }

    #[test]
    fn test_gemini_body() {
        let request = GenerationRequest::new("Compare", OutputSchema::CompetitorComparison);
        let body = provider().build_body(&request);

        assert_eq!(body["contents"][0]["parts"][0]["text"], "Compare");
        let gen = &body["generationConfig"];
        assert_eq!(gen["responseMimeType"], "application/json");
        assert_eq!(gen["responseSchema"]["type"], "OBJECT");
        assert_eq!(
            gen["responseSchema"]["properties"]["competitor"]["properties"]["price"]["type"],
            "NUMBER"
        );
    }

    #[test]
    fn test_gemini_url_and_key_header() {
        let req = provider()
            .build_http_request(&json!({}))
            .build()
            .expect("build request");
        assert_eq!(
            req.url().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(req.headers().get("x-goog-api-key").unwrap(), "AIzaSyTESTKEY0123");
        assert!(req.headers().get("Authorization").is_none());
    }

    #[test]
    fn test_gemini_answer_text() {
        let resp = json!({"candidates": [{"content": {"parts": [{"text": "[1]"}]}}]});
        assert_eq!(GeminiProvider::answer_text(&resp), Some("[1]"));
        assert_eq!(GeminiProvider::answer_text(&json!({"promptFeedback": {}})), None);
    }

    #[test]
    fn test_to_gemini_schema_strips_additional_properties() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {"a": {"type": "string"}}
        });
        let converted = to_gemini_schema(&schema);
        assert!(converted.get("additionalProperties").is_none());
        assert_eq!(converted["properties"]["a"]["type"], "STRING");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let out = format!("{:?}", provider());
        assert!(!out.contains("TESTKEY0123"));
        assert!(out.contains("AIzaSy***"));
    }
}
