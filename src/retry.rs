//! Retry policy for the FAQ generation call.
//!
//! [`RetryConfig`] bounds how many times the strategist asks the provider for
//! a question batch, how many questions a batch must contain to be accepted,
//! and how long to wait after the provider signals a rate limit. Any other
//! failure is retried immediately.

use crate::PipelineError;
use std::time::Duration;

/// Bounded retry for the question-generation call.
///
/// # Example
///
/// ```
/// use content_pipeline::retry::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default();
/// assert_eq!(config.max_attempts, 3);
/// assert_eq!(config.min_questions, 15);
///
/// let fast = RetryConfig::new(5).with_cooldown(Duration::from_secs(1));
/// assert_eq!(fast.rate_limit_cooldown, Duration::from_secs(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first call. Range: 1-10.
    pub max_attempts: u32,

    /// A batch with fewer questions than this is rejected.
    pub min_questions: usize,

    /// Wait after a rate-limit response before the next attempt.
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_questions: 15,
            rate_limit_cooldown: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Up to N attempts with the default floor and cooldown.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, 10),
            ..Self::default()
        }
    }

    /// Set the minimum accepted question count.
    pub fn with_min_questions(mut self, min_questions: usize) -> Self {
        self.min_questions = min_questions;
        self
    }

    /// Set the rate-limit cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    /// Cooldown to sleep after `err`, if it is a rate limit.
    ///
    /// Always the configured interval; a provider `Retry-After` hint is only
    /// logged.
    pub fn cooldown_for(&self, err: &PipelineError) -> Option<Duration> {
        is_rate_limited(err).then_some(self.rate_limit_cooldown)
    }
}

/// Whether `err` means the provider is throttling us.
///
/// True for HTTP 429, and for any provider error whose body mentions a quota
/// or rate limit (Gemini reports these as `RESOURCE_EXHAUSTED`).
pub fn is_rate_limited(err: &PipelineError) -> bool {
    match err {
        PipelineError::HttpError { status: 429, .. } => true,
        PipelineError::HttpError { body, .. } => mentions_rate_limit(body),
        PipelineError::Other(msg) => mentions_rate_limit(msg),
        _ => false,
    }
}

fn mentions_rate_limit(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("quota") || lower.contains("rate limit") || lower.contains("resource_exhausted")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, body: &str) -> PipelineError {
        PipelineError::HttpError {
            status,
            body: body.to_string(),
            retry_after: None,
        }
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.min_questions, 15);
        assert_eq!(config.rate_limit_cooldown, Duration::from_secs(30));
    }

    #[test]
    fn test_retry_config_clamped() {
        assert_eq!(RetryConfig::new(0).max_attempts, 1);
        assert_eq!(RetryConfig::new(50).max_attempts, 10);
    }

    #[test]
    fn test_is_rate_limited() {
        assert!(is_rate_limited(&http(429, "")));
        assert!(is_rate_limited(&http(403, "Quota exceeded for project")));
        assert!(is_rate_limited(&http(400, r#"{"status": "RESOURCE_EXHAUSTED"}"#)));
        assert!(is_rate_limited(&PipelineError::Other("Rate limit reached".into())));
        assert!(!is_rate_limited(&http(500, "internal error")));
        assert!(!is_rate_limited(&PipelineError::MalformedResponse("quota".into())));
    }

    #[test]
    fn test_cooldown_is_fixed_interval() {
        let config = RetryConfig::default().with_cooldown(Duration::from_secs(5));
        let err = PipelineError::HttpError {
            status: 429,
            body: String::new(),
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(config.cooldown_for(&err), Some(Duration::from_secs(5)));
        assert_eq!(config.cooldown_for(&http(500, "")), None);
    }
}
