//! Shared pipeline state and per-stage deltas.
//!
//! [`PipelineState`] is the one record threaded through every stage. Stages
//! never mutate it directly: each returns a [`StateDelta`] holding only the
//! fields it adds or replaces, and the executor merges it.

use crate::error::Result;
use crate::types::{Comparison, Product, Question, RawInput};
use crate::PipelineError;
use serde_json::Value;
use std::collections::BTreeMap;

/// The progressively-populated record threaded through all stages.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub raw_input: RawInput,
    pub product: Option<Product>,
    pub generated_questions: Vec<Question>,
    pub competitor_product: Option<Product>,
    pub comparison: Option<Comparison>,
    /// Rendered documents keyed by page name. The only externally consumed output.
    pub final_pages: BTreeMap<String, Value>,
}

impl PipelineState {
    /// Fresh state holding only the raw input.
    pub fn new(raw_input: RawInput) -> Self {
        Self {
            raw_input,
            ..Self::default()
        }
    }

    /// Borrow the parsed product, or fail on behalf of `stage`.
    pub fn require_product(&self, stage: &str) -> Result<&Product> {
        self.product.as_ref().ok_or_else(|| PipelineError::MissingState {
            stage: stage.to_string(),
            field: "product",
        })
    }

    /// Merge a stage's delta. Fields the delta leaves unset are untouched.
    pub fn apply(&mut self, delta: StateDelta) {
        if let Some(product) = delta.product {
            self.product = Some(product);
        }
        if let Some(questions) = delta.generated_questions {
            self.generated_questions = questions;
        }
        if let Some(competitor) = delta.competitor_product {
            self.competitor_product = Some(competitor);
        }
        if let Some(comparison) = delta.comparison {
            self.comparison = Some(comparison);
        }
        if let Some(pages) = delta.final_pages {
            self.final_pages.extend(pages);
        }
    }
}

/// Fields a stage adds or overrides.
#[derive(Debug, Clone, Default)]
pub struct StateDelta {
    pub product: Option<Product>,
    pub generated_questions: Option<Vec<Question>>,
    pub competitor_product: Option<Product>,
    pub comparison: Option<Comparison>,
    pub final_pages: Option<BTreeMap<String, Value>>,
}

impl StateDelta {
    pub fn is_empty(&self) -> bool {
        self.product.is_none()
            && self.generated_questions.is_none()
            && self.competitor_product.is_none()
            && self.comparison.is_none()
            && self.final_pages.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut state = PipelineState::new(RawInput::new());
        state.apply(StateDelta {
            product: Some(Product::new("A", 1.0)),
            ..Default::default()
        });
        state.apply(StateDelta {
            generated_questions: Some(vec![Question {
                category: "Usage".into(),
                question: "How?".into(),
                answer: None,
            }]),
            ..Default::default()
        });

        assert_eq!(state.product.as_ref().unwrap().name, "A");
        assert_eq!(state.generated_questions.len(), 1);
        assert!(state.comparison.is_none());
    }

    #[test]
    fn test_apply_extends_pages() {
        let mut state = PipelineState::default();
        let mut first = BTreeMap::new();
        first.insert("faq".to_string(), json!({"a": 1}));
        state.apply(StateDelta {
            final_pages: Some(first),
            ..Default::default()
        });
        let mut second = BTreeMap::new();
        second.insert("comparison".to_string(), json!([]));
        state.apply(StateDelta {
            final_pages: Some(second),
            ..Default::default()
        });
        assert_eq!(state.final_pages.len(), 2);
    }

    #[test]
    fn test_require_product_missing() {
        let state = PipelineState::default();
        match state.require_product("strategist").unwrap_err() {
            PipelineError::MissingState { stage, field } => {
                assert_eq!(stage, "strategist");
                assert_eq!(field, "product");
            }
            other => panic!("Expected MissingState, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_delta() {
        assert!(StateDelta::default().is_empty());
    }
}
