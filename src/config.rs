//! Provider credentials and connection settings.
//!
//! Credentials and settings are read from the process environment by the
//! binary. Both types can also be built from any lookup function, so tests
//! never touch real environment variables.

use crate::error::Result;
use std::time::Duration;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// API keys for the supported providers. Empty values count as absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &self.openai_api_key.as_deref().map(redact))
            .field("gemini_api_key", &self.gemini_api_key.as_deref().map(redact))
            .finish()
    }
}

impl Credentials {
    /// Read keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read keys through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            openai_api_key: non_empty(lookup(OPENAI_API_KEY)),
            gemini_api_key: non_empty(lookup(GEMINI_API_KEY)),
        }
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = non_empty(Some(key.into()));
        self
    }

    pub fn with_gemini_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = non_empty(Some(key.into()));
        self
    }

    /// `true` when no provider key is set.
    pub fn is_empty(&self) -> bool {
        self.openai_api_key.is_none() && self.gemini_api_key.is_none()
    }
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

impl LlmConfig {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// Models, endpoints and transport settings for the providers.
///
/// # Example
///
/// ```
/// use content_pipeline::config::ProviderSettings;
/// use std::time::Duration;
///
/// let settings = ProviderSettings::default()
///     .with_openai_model("gpt-4o")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(settings.openai_model, "gpt-4o");
/// assert_eq!(settings.gemini_model, "gemini-1.5-flash");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub openai_model: String,
    pub gemini_model: String,
    pub openai_base_url: String,
    pub gemini_base_url: String,
    /// Per-request transport timeout.
    pub timeout: Duration,
    pub llm: LlmConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            llm: LlmConfig::default(),
        }
    }
}

impl ProviderSettings {
    /// Defaults overridden by `OPENAI_MODEL`, `GEMINI_MODEL`,
    /// `OPENAI_BASE_URL`, `GEMINI_BASE_URL`, `LLM_TIMEOUT_SECS`,
    /// `LLM_TEMPERATURE` and `LLM_MAX_TOKENS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();
        if let Some(model) = non_empty(lookup("OPENAI_MODEL")) {
            settings.openai_model = model;
        }
        if let Some(model) = non_empty(lookup("GEMINI_MODEL")) {
            settings.gemini_model = model;
        }
        if let Some(url) = non_empty(lookup("OPENAI_BASE_URL")) {
            settings.openai_base_url = url;
        }
        if let Some(url) = non_empty(lookup("GEMINI_BASE_URL")) {
            settings.gemini_base_url = url;
        }
        if let Some(secs) = non_empty(lookup("LLM_TIMEOUT_SECS")) {
            let secs: u64 = parse_setting("LLM_TIMEOUT_SECS", &secs)?;
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(temp) = non_empty(lookup("LLM_TEMPERATURE")) {
            let temp: f64 = parse_setting("LLM_TEMPERATURE", &temp)?;
            if !(0.0..=2.0).contains(&temp) {
                return Err(crate::PipelineError::Configuration(format!(
                    "LLM_TEMPERATURE must be between 0 and 2, got {}",
                    temp
                )));
            }
            settings.llm = settings.llm.with_temperature(temp);
        }
        if let Some(tokens) = non_empty(lookup("LLM_MAX_TOKENS")) {
            let tokens: u32 = parse_setting("LLM_MAX_TOKENS", &tokens)?;
            settings.llm = settings.llm.with_max_tokens(tokens);
        }
        Ok(settings)
    }

    pub fn with_openai_model(mut self, model: impl Into<String>) -> Self {
        self.openai_model = model.into();
        self
    }

    pub fn with_gemini_model(mut self, model: impl Into<String>) -> Self {
        self.gemini_model = model.into();
        self
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = url.into();
        self
    }

    pub fn with_gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.gemini_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_llm_config(mut self, llm: LlmConfig) -> Self {
        self.llm = llm;
        self
    }

    /// HTTP client with the configured request timeout.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }
}

fn parse_setting<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        crate::PipelineError::Configuration(format!("{} has an invalid value '{}'", name, raw))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Show a short prefix only.
pub(crate) fn redact(key: &str) -> String {
    match key.char_indices().nth(6) {
        Some((idx, _)) => format!("{}***", &key[..idx]),
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = Credentials::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-abc")]));
        assert_eq!(creds.openai_api_key.as_deref(), Some("sk-abc"));
        assert!(creds.gemini_api_key.is_none());
        assert!(!creds.is_empty());
    }

    #[test]
    fn test_empty_key_counts_as_absent() {
        let creds = Credentials::from_lookup(lookup(&[
            ("OPENAI_API_KEY", ""),
            ("GEMINI_API_KEY", "   "),
        ]));
        assert!(creds.is_empty());
        assert!(Credentials::default().with_openai_key("").is_empty());
    }

    #[test]
    fn test_credentials_debug_redacts() {
        let creds = Credentials::default().with_gemini_key("AIzaSyVerySecretValue");
        let out = format!("{:?}", creds);
        assert!(!out.contains("VerySecretValue"));
        assert!(out.contains("AIzaSy***"));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.openai_model, "gpt-4o-mini");
        assert_eq!(settings.gemini_model, "gemini-1.5-flash");
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert_eq!(settings.llm.temperature, 0.7);
    }

    #[test]
    fn test_settings_from_lookup_overrides() {
        let settings = ProviderSettings::from_lookup(lookup(&[
            ("OPENAI_MODEL", "gpt-4o"),
            ("GEMINI_BASE_URL", "http://localhost:9000"),
            ("LLM_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(settings.openai_model, "gpt-4o");
        assert_eq!(settings.gemini_base_url, "http://localhost:9000");
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.gemini_model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_settings_bad_timeout() {
        let err =
            ProviderSettings::from_lookup(lookup(&[("LLM_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, crate::PipelineError::Configuration(_)));
    }

    #[test]
    fn test_settings_sampling_overrides() {
        let settings = ProviderSettings::from_lookup(lookup(&[
            ("LLM_TEMPERATURE", "0.2"),
            ("LLM_MAX_TOKENS", "1024"),
        ]))
        .unwrap();
        assert_eq!(
            settings.llm,
            LlmConfig::default().with_temperature(0.2).with_max_tokens(1024)
        );

        for (key, value) in [
            ("LLM_TEMPERATURE", "hot"),
            ("LLM_TEMPERATURE", "3.5"),
            ("LLM_MAX_TOKENS", "-1"),
        ] {
            let err = ProviderSettings::from_lookup(lookup(&[(key, value)])).unwrap_err();
            assert!(matches!(err, crate::PipelineError::Configuration(_)), "{key}={value}");
        }
    }

    #[test]
    fn test_redact_short_key() {
        assert_eq!(redact("abc"), "***");
        assert_eq!(redact("sk-1234567"), "sk-123***");
    }
}
