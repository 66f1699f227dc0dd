//! Strategist stage: FAQ generation and competitor comparison.
//!
//! Two structured calls go to one provider. The FAQ call is retried under
//! [`RetryConfig`] until a batch meets the question floor; missing the floor
//! fails the pipeline. The comparison call is made once and degrades to a
//! synthetic competitor when its answer is unusable.

use crate::config::{Credentials, ProviderSettings};
use crate::error::Result;
use crate::events::Event;
use crate::exec_ctx::ExecCtx;
use crate::prompt::{competitor_prompt, faq_prompt};
use crate::provider::{select_provider, GenerationRequest, Provider};
use crate::retry::RetryConfig;
use crate::schema::{
    parse_competitor_comparison, parse_question_batch, salvage_comparison_points, OutputSchema,
};
use crate::stage::{BoxFut, Stage};
use crate::state::{PipelineState, StateDelta};
use crate::types::{Comparison, ComparisonPoint, Product, Question};
use crate::PipelineError;
use std::sync::Arc;

pub const FALLBACK_COMPETITOR_NAME: &str = "Competitor X";
pub const FALLBACK_COMPETITOR_PRICE: f64 = 500.0;
pub const FALLBACK_COMPETITOR_DESCRIPTION: &str = "A basic alternative.";

/// Where the stage gets its provider from.
enum ProviderSource {
    /// Chosen from credentials when the stage runs.
    Credentials {
        credentials: Credentials,
        settings: ProviderSettings,
    },
    /// Supplied up front (tests, custom providers).
    Fixed(Arc<dyn Provider>),
}

/// Stage that fills `generated_questions`, `competitor_product` and `comparison`.
///
/// # Example
///
/// ```
/// use content_pipeline::provider::MockProvider;
/// use content_pipeline::strategist::StrategistStage;
/// use content_pipeline::stage::Stage;
/// use std::sync::Arc;
///
/// let stage = StrategistStage::with_provider(Arc::new(MockProvider::new(vec![])));
/// assert_eq!(stage.name(), "strategist");
/// ```
pub struct StrategistStage {
    source: ProviderSource,
    retry: RetryConfig,
}

impl std::fmt::Debug for StrategistStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            ProviderSource::Credentials { credentials, .. } => format!("{:?}", credentials),
            ProviderSource::Fixed(p) => p.name().to_string(),
        };
        f.debug_struct("StrategistStage")
            .field("provider", &source)
            .field("retry", &self.retry)
            .finish()
    }
}

impl StrategistStage {
    /// Resolve the provider from `credentials` when the stage runs.
    ///
    /// A missing credential surfaces as a `Configuration` error from
    /// [`Stage::run`], after the product has been parsed and before any
    /// generative call.
    pub fn from_credentials(credentials: Credentials, settings: ProviderSettings) -> Self {
        Self {
            source: ProviderSource::Credentials {
                credentials,
                settings,
            },
            retry: RetryConfig::default(),
        }
    }

    /// Use `provider` for every call.
    pub fn with_provider(provider: Arc<dyn Provider>) -> Self {
        Self {
            source: ProviderSource::Fixed(provider),
            retry: RetryConfig::default(),
        }
    }

    /// Override the FAQ retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn resolve_provider(&self) -> Result<Arc<dyn Provider>> {
        match &self.source {
            ProviderSource::Credentials {
                credentials,
                settings,
            } => select_provider(credentials, settings),
            ProviderSource::Fixed(provider) => Ok(provider.clone()),
        }
    }

    /// Ask for FAQs until a batch meets the floor or attempts run out.
    async fn generate_questions(
        &self,
        ctx: &ExecCtx,
        provider: &dyn Provider,
        product: &Product,
    ) -> Result<Vec<Question>> {
        let max_attempts = self.retry.max_attempts;
        let min_questions = self.retry.min_questions;
        let request =
            GenerationRequest::new(faq_prompt(product, min_questions), OutputSchema::FaqList);

        for attempt in 1..=max_attempts {
            ctx.emit(Event::GenerationAttempt {
                provider: provider.name(),
                purpose: "faq",
                attempt,
                max_attempts,
            });
            tracing::debug!(
                provider = provider.name(),
                attempt,
                max_attempts,
                "requesting FAQ batch"
            );

            let reason = match provider.generate(&request).await {
                Ok(value) => match parse_question_batch(&value) {
                    Ok(questions) if questions.len() >= min_questions => {
                        tracing::info!(count = questions.len(), attempt, "FAQ batch accepted");
                        return Ok(questions);
                    }
                    Ok(questions) => format!(
                        "only {} questions, need at least {}",
                        questions.len(),
                        min_questions
                    ),
                    Err(e) => format!("FAQ payload rejected: {}", e),
                },
                Err(e) => {
                    if let Some(cooldown) = self.retry.cooldown_for(&e) {
                        if attempt < max_attempts {
                            if let PipelineError::HttpError {
                                retry_after: Some(hint),
                                ..
                            } = &e
                            {
                                tracing::debug!(retry_after = ?hint, "provider sent Retry-After");
                            }
                            tracing::warn!(
                                attempt,
                                cooldown_secs = cooldown.as_secs_f64(),
                                "rate limited, cooling down"
                            );
                            ctx.emit(Event::RateLimited {
                                attempt,
                                cooldown_ms: cooldown.as_millis() as u64,
                            });
                            tokio::time::sleep(cooldown).await;
                        }
                    }
                    format!("provider call failed: {}", e)
                }
            };

            tracing::warn!(attempt, max_attempts, reason = %reason, "FAQ attempt did not count");
            ctx.emit(Event::AttemptRejected { attempt, reason });
        }

        Err(PipelineError::Validation(format!(
            "failed to generate at least {} questions after {} attempts",
            min_questions, max_attempts
        )))
    }

    /// One comparison call; any failure degrades to the synthetic competitor.
    async fn generate_comparison(
        &self,
        ctx: &ExecCtx,
        provider: &dyn Provider,
        product: &Product,
    ) -> (Product, Comparison) {
        ctx.emit(Event::GenerationAttempt {
            provider: provider.name(),
            purpose: "comparison",
            attempt: 1,
            max_attempts: 1,
        });
        let request =
            GenerationRequest::new(competitor_prompt(product), OutputSchema::CompetitorComparison);

        let value = match provider.generate(&request).await {
            Ok(value) => value,
            Err(e) => {
                let reason = format!("provider call failed: {}", e);
                return fallback_comparison(ctx, reason, Vec::new());
            }
        };

        match parse_competitor_comparison(&value) {
            Ok(parsed) => {
                if parsed.dropped_points > 0 {
                    tracing::warn!(
                        dropped = parsed.dropped_points,
                        "dropped invalid comparison points"
                    );
                }
                let comparison = Comparison::against(&parsed.competitor, parsed.points);
                tracing::info!(
                    competitor = %parsed.competitor.name,
                    points = comparison.points().len(),
                    "comparison accepted"
                );
                (parsed.competitor, comparison)
            }
            Err(e) => {
                let (points, dropped) = salvage_comparison_points(&value);
                if dropped > 0 {
                    tracing::warn!(dropped, "dropped invalid comparison points");
                }
                let reason = format!("comparison payload rejected: {}", e);
                fallback_comparison(ctx, reason, points)
            }
        }
    }
}

/// Synthetic competitor plus whatever points survived validation.
fn fallback_comparison(
    ctx: &ExecCtx,
    reason: String,
    points: Vec<ComparisonPoint>,
) -> (Product, Comparison) {
    tracing::warn!(reason = %reason, kept_points = points.len(), "using fallback competitor");
    ctx.emit(Event::FallbackUsed {
        what: "competitor",
        reason,
    });
    let competitor = fallback_competitor();
    let comparison = Comparison::against(&competitor, points);
    (competitor, comparison)
}

/// The synthetic competitor used when the comparison answer is unusable.
pub fn fallback_competitor() -> Product {
    Product::new(FALLBACK_COMPETITOR_NAME, FALLBACK_COMPETITOR_PRICE)
        .with_description(FALLBACK_COMPETITOR_DESCRIPTION)
}

impl Stage for StrategistStage {
    fn name(&self) -> &str {
        "strategist"
    }

    fn run<'a>(
        &'a self,
        ctx: &'a ExecCtx,
        state: &'a PipelineState,
    ) -> BoxFut<'a, Result<StateDelta>> {
        Box::pin(async move {
            let product = state.require_product(self.name())?;
            let provider = self.resolve_provider()?;

            let questions = self.generate_questions(ctx, provider.as_ref(), product).await?;
            let (competitor, comparison) =
                self.generate_comparison(ctx, provider.as_ref(), product).await;

            Ok(StateDelta {
                generated_questions: Some(questions),
                competitor_product: Some(competitor),
                comparison: Some(comparison),
                ..Default::default()
            })
        })
    }
}
