//! Provider for the OpenAI chat completions API.
//!
//! Endpoint: `/v1/chat/completions`, with `response_format` set to
//! `json_schema` so the model answers in the requested shape. Any
//! OpenAI-compatible server that honours `response_format` works through
//! `OPENAI_BASE_URL`.

use super::{decode_answer, preview, send_json, GenerationRequest, Provider};
use crate::config::{redact, LlmConfig, ProviderSettings};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// OpenAI chat-completions provider.
///
/// # Example
///
/// ```
/// use content_pipeline::config::ProviderSettings;
/// use content_pipeline::provider::{OpenAiProvider, Provider};
///
/// let provider = OpenAiProvider::new("sk-...", &ProviderSettings::default()).unwrap();
/// assert_eq!(provider.name(), "openai");
/// assert_eq!(provider.model(), "gpt-4o-mini");
/// ```
#[derive(Clone)]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    llm: LlmConfig,
    client: Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a provider using the OpenAI model, base URL and timeout from `settings`.
    pub fn new(api_key: impl Into<String>, settings: &ProviderSettings) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            model: settings.openai_model.clone(),
            base_url: settings.openai_base_url.clone(),
            llm: settings.llm.clone(),
            client: settings.build_client()?,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Build the request body for `/v1/chat/completions`.
    fn build_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": self.llm.temperature,
            "max_tokens": self.llm.max_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema.name(),
                    "schema": request.schema.json_schema(),
                }
            },
        })
    }

    fn build_http_request(&self, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(body)
    }

    /// `choices[0].message.content`
    fn answer_text(response: &Value) -> Option<&str> {
        response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        let body = self.build_body(request);
        let response = send_json(self.build_http_request(&body)).await?;

        if let Some(usage) = response.get("usage") {
            tracing::debug!(provider = "openai", usage = %usage, "completion usage");
        }
        let text = Self::answer_text(&response);
        if text.is_none() {
            tracing::warn!(provider = "openai", body = %preview(&response), "no message content");
        }
        decode_answer("openai", text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::OutputSchema;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("sk-1234567890abcdef", &ProviderSettings::default()).unwrap()
    }

    #[test]
    fn test_openai_body_carries_schema() {
        let request = GenerationRequest::new("List FAQs", OutputSchema::FaqList);
        let body = provider().build_body(&request);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.7);
        let messages = body["messages"].as_array().expect("messages");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "List FAQs");

        let rf = &body["response_format"];
        assert_eq!(rf["type"], "json_schema");
        assert_eq!(rf["json_schema"]["name"], "faq_list");
        assert_eq!(rf["json_schema"]["schema"]["required"][0], "questions");
    }

    #[test]
    fn test_openai_auth_header_and_url() {
        let settings = ProviderSettings::default().with_openai_base_url("http://localhost:8080/");
        let provider = OpenAiProvider::new("sk-test123", &settings).unwrap();
        let req = provider
            .build_http_request(&json!({"test": true}))
            .build()
            .expect("build request");

        assert_eq!(req.url().as_str(), "http://localhost:8080/v1/chat/completions");
        let auth = req.headers().get("Authorization").expect("auth header");
        assert_eq!(auth, "Bearer sk-test123");
    }

    #[test]
    fn test_openai_answer_text() {
        let resp = json!({"choices": [{"message": {"content": "{\"a\": 1}"}}]});
        assert_eq!(OpenAiProvider::answer_text(&resp), Some("{\"a\": 1}"));
        assert_eq!(OpenAiProvider::answer_text(&json!({"choices": []})), None);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let debug_output = format!("{:?}", provider());
        assert!(
            !debug_output.contains("1234567890abcdef"),
            "API key must not appear in Debug output"
        );
        assert!(debug_output.contains("sk-123"), "Prefix should be visible for identification");
        assert!(debug_output.contains("***"), "Redaction marker must be present");
    }
}
