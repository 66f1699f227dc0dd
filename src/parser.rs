//! Parse stage: raw labeled fields -> validated [`Product`].
//!
//! The raw record uses human labels ("Product Name", "Skin Type") and loose
//! formatting: a currency glyph inside the price, comma- or newline-separated
//! lists. Everything here is deterministic; no provider is involved.

use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::stage::{BoxFut, Stage};
use crate::state::{PipelineState, StateDelta};
use crate::types::{Currency, Product, RawInput};
use crate::PipelineError;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

pub const FIELD_NAME: &str = "Product Name";
pub const FIELD_PRICE: &str = "Price";
pub const FIELD_CONCENTRATION: &str = "Concentration";
pub const FIELD_SKIN_TYPE: &str = "Skin Type";
pub const FIELD_KEY_INGREDIENTS: &str = "Key Ingredients";
pub const FIELD_BENEFITS: &str = "Benefits";
pub const FIELD_HOW_TO_USE: &str = "How to Use";
pub const FIELD_SIDE_EFFECTS: &str = "Side Effects";

const DEFAULT_NAME: &str = "Unknown Product";
const RUPEE_GLYPH: char = '₹';

/// Stage that normalizes `raw_input` into `product`.
#[derive(Debug, Clone, Default)]
pub struct ParseStage;

impl ParseStage {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for ParseStage {
    fn name(&self) -> &str {
        "parser"
    }

    fn run<'a>(
        &'a self,
        _ctx: &'a ExecCtx,
        state: &'a PipelineState,
    ) -> BoxFut<'a, Result<StateDelta>> {
        Box::pin(async move {
            let product = parse_product(&state.raw_input)?;
            tracing::info!(
                product = %product.name,
                price = product.price,
                currency = %product.currency,
                "parsed product"
            );
            Ok(StateDelta {
                product: Some(product),
                ..Default::default()
            })
        })
    }
}

/// Build a [`Product`] from loosely formatted labeled fields.
pub fn parse_product(raw: &RawInput) -> Result<Product> {
    let raw_price = raw.get(FIELD_PRICE).map(value_text).unwrap_or_default();

    Ok(Product {
        name: text_field(raw, FIELD_NAME).unwrap_or_else(|| DEFAULT_NAME.to_string()),
        price: parse_price(&raw_price)?,
        currency: infer_currency(&raw_price),
        description: Some(synthesize_description(raw)),
        concentration: text_field(raw, FIELD_CONCENTRATION),
        skin_type: parse_list(raw.get(FIELD_SKIN_TYPE)),
        key_ingredients: parse_list(raw.get(FIELD_KEY_INGREDIENTS)),
        benefits: parse_list(raw.get(FIELD_BENEFITS)),
        how_to_use: text_field(raw, FIELD_HOW_TO_USE),
        side_effects: text_field(raw, FIELD_SIDE_EFFECTS),
    })
}

/// Strip everything but digits and `.` and parse the rest.
///
/// Empty input, or input with no digits at all, is `0`. A remainder that is
/// still not a finite number (e.g. `"1.2.3"`) is a validation error.
pub fn parse_price(raw: &str) -> Result<f64> {
    static NON_NUMERIC: OnceLock<Regex> = OnceLock::new();
    let re = NON_NUMERIC.get_or_init(|| Regex::new(r"[^\d.]").unwrap());

    let digits = re.replace_all(raw, "");
    if digits.is_empty() {
        return Ok(0.0);
    }
    let price = digits.parse::<f64>().map_err(|e| {
        PipelineError::Validation(format!("price '{}' is not a number: {}", raw, e))
    })?;
    if !price.is_finite() {
        return Err(PipelineError::Validation(format!("price '{}' is out of range", raw)));
    }
    Ok(price)
}

/// INR when the raw price carries the rupee glyph, USD otherwise.
pub fn infer_currency(raw_price: &str) -> Currency {
    if raw_price.contains(RUPEE_GLYPH) {
        Currency::Inr
    } else {
        Currency::Usd
    }
}

/// Accept an array or a comma/newline separated string. Items are trimmed,
/// empties dropped, order and duplicates kept.
pub fn parse_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(value_text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => value_text(other)
            .split([',', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// `"A <concentration> formula for <skin type>."`
fn synthesize_description(raw: &RawInput) -> String {
    let concentration = raw
        .get(FIELD_CONCENTRATION)
        .map(value_text)
        .unwrap_or_default();
    let skin = match raw.get(FIELD_SKIN_TYPE) {
        None | Some(Value::Null) => "all skin types".to_string(),
        Some(Value::Array(_)) => parse_list(raw.get(FIELD_SKIN_TYPE)).join(", "),
        Some(other) => value_text(other),
    };
    format!("A {} formula for {}.", concentration, skin)
}

/// Trimmed text of a field; absent or blank is `None`.
fn text_field(raw: &RawInput, key: &str) -> Option<String> {
    raw.get(key)
        .map(value_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Render a JSON scalar as plain text (strings unquoted).
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
