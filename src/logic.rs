//! Named accessors over [`PipelineState`] used by the template renderer.
//!
//! Every accessor is a plain `fn` pointer: pure, no I/O, no mutation. Product
//! accessors return `null` when no product has been parsed; competitor
//! accessors fall back to documented defaults.

use crate::state::PipelineState;
use crate::types::Product;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Signature shared by every registry entry.
pub type LogicFn = fn(&PipelineState) -> Value;

/// Competitor name used before (or without) a comparison.
pub const DEFAULT_COMPETITOR_NAME: &str = "Generic Brand";

/// Fixed name -> accessor table.
#[derive(Clone)]
pub struct LogicRegistry {
    entries: BTreeMap<&'static str, LogicFn>,
}

impl std::fmt::Debug for LogicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl Default for LogicRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl LogicRegistry {
    /// Registry with no entries.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The accessors available to page templates.
    pub fn standard() -> Self {
        Self::empty()
            .with("product_name", product_name)
            .with("price_formatted", price_formatted)
            .with("benefits_list", benefits_list)
            .with("ingredients", ingredients)
            .with("faq_list", faq_list)
            .with("comparison_table", comparison_table)
            .with("competitor_name", competitor_name)
            .with("description", description)
            .with("how_to_use", how_to_use)
            .with("side_effects", side_effects)
            .with("skin_types", skin_types)
            .with("concentration", concentration)
            .with("competitor_price_formatted", competitor_price_formatted)
            .with("question_count", question_count)
    }

    /// Add or replace an entry.
    pub fn with(mut self, name: &'static str, f: LogicFn) -> Self {
        self.entries.insert(name, f);
        self
    }

    pub fn get(&self, name: &str) -> Option<LogicFn> {
        self.entries.get(name).copied()
    }

    /// Evaluate `name` against `state`, if registered.
    pub fn resolve(&self, name: &str, state: &PipelineState) -> Option<Value> {
        self.get(name).map(|f| f(state))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

fn with_product(state: &PipelineState, f: impl FnOnce(&Product) -> Value) -> Value {
    state.product.as_ref().map(f).unwrap_or(Value::Null)
}

fn optional_text(text: &Option<String>) -> Value {
    text.as_deref().map(Value::from).unwrap_or(Value::Null)
}

fn product_name(state: &PipelineState) -> Value {
    with_product(state, |p| json!(p.name))
}

fn price_formatted(state: &PipelineState) -> Value {
    with_product(state, |p| json!(p.price_formatted()))
}

fn benefits_list(state: &PipelineState) -> Value {
    with_product(state, |p| json!(p.benefits))
}

fn ingredients(state: &PipelineState) -> Value {
    with_product(state, |p| json!(p.key_ingredients))
}

fn skin_types(state: &PipelineState) -> Value {
    with_product(state, |p| json!(p.skin_type))
}

fn description(state: &PipelineState) -> Value {
    with_product(state, |p| optional_text(&p.description))
}

fn how_to_use(state: &PipelineState) -> Value {
    with_product(state, |p| optional_text(&p.how_to_use))
}

fn side_effects(state: &PipelineState) -> Value {
    with_product(state, |p| optional_text(&p.side_effects))
}

fn concentration(state: &PipelineState) -> Value {
    with_product(state, |p| optional_text(&p.concentration))
}

fn faq_list(state: &PipelineState) -> Value {
    serde_json::to_value(&state.generated_questions).unwrap_or_else(|_| json!([]))
}

fn question_count(state: &PipelineState) -> Value {
    json!(state.generated_questions.len())
}

fn comparison_table(state: &PipelineState) -> Value {
    state
        .comparison
        .as_ref()
        .and_then(|c| serde_json::to_value(c).ok())
        .unwrap_or_else(|| json!({}))
}

fn competitor_name(state: &PipelineState) -> Value {
    json!(state
        .competitor_product
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or(DEFAULT_COMPETITOR_NAME))
}

fn competitor_price_formatted(state: &PipelineState) -> Value {
    state
        .competitor_product
        .as_ref()
        .map(|c| json!(c.price_formatted()))
        .unwrap_or(Value::Null)
}
