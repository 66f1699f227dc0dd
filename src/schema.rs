//! Output schemas for structured generation, and their validators.
//!
//! Each [`OutputSchema`] has two halves: a JSON Schema document sent to the
//! provider to constrain its output, and a parse-and-validate function run on
//! whatever comes back. Validators return [`SchemaError`] rather than
//! panicking or coercing silently, so callers decide between retry, fallback
//! or failure.

use crate::parser::parse_price;
use crate::types::{ComparisonPoint, Product, Question, Winner};
use serde::Deserialize;
use serde_json::{json, Value};

/// Why a provider payload does not fit its schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("expected {expected}, found {found}")]
    WrongShape {
        expected: &'static str,
        found: &'static str,
    },

    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("item {index} is invalid: {reason}")]
    InvalidItem { index: usize, reason: String },

    #[error("{0}")]
    Invalid(String),
}

/// The structured outputs the strategist requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    /// `{"questions": [Question, ...]}`
    FaqList,
    /// `{"competitor": Product, "comparison_points": [ComparisonPoint, ...]}`
    CompetitorComparison,
}

impl OutputSchema {
    /// Identifier used as the schema name in structured-output requests.
    pub fn name(self) -> &'static str {
        match self {
            OutputSchema::FaqList => "faq_list",
            OutputSchema::CompetitorComparison => "competitor_comparison",
        }
    }

    /// JSON Schema document describing the expected output.
    pub fn json_schema(self) -> Value {
        match self {
            OutputSchema::FaqList => json!({
                "type": "object",
                "properties": {
                    "questions": {
                        "type": "array",
                        "items": question_schema(),
                    }
                },
                "required": ["questions"],
            }),
            OutputSchema::CompetitorComparison => json!({
                "type": "object",
                "properties": {
                    "competitor": product_schema(),
                    "comparison_points": {
                        "type": "array",
                        "items": comparison_point_schema(),
                    }
                },
                "required": ["competitor", "comparison_points"],
            }),
        }
    }
}

fn question_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "category": {"type": "string"},
            "question": {"type": "string"},
            "answer": {"type": "string"},
        },
        "required": ["category", "question", "answer"],
    })
}

fn product_schema() -> Value {
    let string_list = json!({"type": "array", "items": {"type": "string"}});
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "price": {"type": "number"},
            "currency": {"type": "string", "enum": ["INR", "USD"]},
            "description": {"type": "string"},
            "concentration": {"type": "string"},
            "skin_type": string_list,
            "key_ingredients": string_list,
            "benefits": string_list,
            "how_to_use": {"type": "string"},
            "side_effects": {"type": "string"},
        },
        "required": ["name", "price"],
    })
}

fn comparison_point_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "feature": {"type": "string"},
            "product_a_value": {"type": "string"},
            "product_b_value": {"type": "string"},
            "winner": {"type": "string", "enum": ["A", "B", "Tie"]},
        },
        "required": ["feature", "product_a_value", "product_b_value"],
    })
}

/// Validate a FAQ payload.
///
/// Accepts `{"questions": [...]}`, `{"items": [...]}` or a bare array. Every
/// item must carry a non-blank `category` and `question`. Quantity is not
/// checked here; the strategist owns the count floor.
pub fn parse_question_batch(value: &Value) -> Result<Vec<Question>, SchemaError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("questions").or_else(|| map.get("items")) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(SchemaError::WrongShape {
                    expected: "array of questions",
                    found: kind_of(other),
                })
            }
            None => return Err(SchemaError::MissingField("questions")),
        },
        other => {
            return Err(SchemaError::WrongShape {
                expected: "object or array",
                found: kind_of(other),
            })
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let q: Question =
                serde_json::from_value(item.clone()).map_err(|e| SchemaError::InvalidItem {
                    index,
                    reason: e.to_string(),
                })?;
            if q.category.trim().is_empty() || q.question.trim().is_empty() {
                return Err(SchemaError::InvalidItem {
                    index,
                    reason: "category and question must be non-empty".to_string(),
                });
            }
            Ok(q)
        })
        .collect()
}

/// Validated competitor payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitorComparison {
    pub competitor: Product,
    pub points: Vec<ComparisonPoint>,
    /// Points that failed the point schema and were dropped.
    pub dropped_points: usize,
}

/// Validate a competitor/comparison payload.
///
/// The competitor must deserialize into a [`Product`] with a non-blank name
/// and a non-negative price (numeric strings such as `"₹499"` are accepted).
/// Comparison points are validated one by one; invalid points are dropped
/// and counted rather than failing the whole payload.
pub fn parse_competitor_comparison(value: &Value) -> Result<CompetitorComparison, SchemaError> {
    let map = value.as_object().ok_or(SchemaError::WrongShape {
        expected: "object",
        found: kind_of(value),
    })?;

    let competitor = map
        .get("competitor")
        .ok_or(SchemaError::MissingField("competitor"))
        .and_then(parse_competitor)?;

    let (points, dropped_points) = match map.get("comparison_points") {
        None | Some(Value::Null) => (Vec::new(), 0),
        Some(Value::Array(items)) => parse_points(items),
        Some(other) => {
            return Err(SchemaError::WrongShape {
                expected: "array of comparison points",
                found: kind_of(other),
            })
        }
    };

    Ok(CompetitorComparison {
        competitor,
        points,
        dropped_points,
    })
}

/// Valid `comparison_points` of a payload whose competitor may be unusable.
///
/// Returns the kept points and the number dropped. Anything that is not an
/// object with a points array yields no points.
pub fn salvage_comparison_points(value: &Value) -> (Vec<ComparisonPoint>, usize) {
    match value.get("comparison_points") {
        Some(Value::Array(items)) => parse_points(items),
        _ => (Vec::new(), 0),
    }
}

fn parse_competitor(value: &Value) -> Result<Product, SchemaError> {
    let mut value = value.clone();
    if let Some(Value::String(raw_price)) = value.get("price") {
        let price = parse_price(raw_price).map_err(|e| SchemaError::Invalid(e.to_string()))?;
        value["price"] = json!(price);
    }

    let product: Product =
        serde_json::from_value(value).map_err(|e| SchemaError::Invalid(e.to_string()))?;
    if product.name.trim().is_empty() {
        return Err(SchemaError::Invalid("competitor name is empty".to_string()));
    }
    if !product.price.is_finite() {
        return Err(SchemaError::Invalid(format!(
            "competitor price {} is not finite",
            product.price
        )));
    }
    if product.price < 0.0 {
        return Err(SchemaError::Invalid(format!(
            "competitor price {} is negative",
            product.price
        )));
    }
    Ok(product)
}

#[derive(Deserialize)]
struct RawPoint {
    feature: String,
    product_a_value: Value,
    product_b_value: Value,
    #[serde(default)]
    winner: Option<String>,
}

fn parse_points(items: &[Value]) -> (Vec<ComparisonPoint>, usize) {
    let mut points = Vec::with_capacity(items.len());
    let mut dropped = 0;
    for item in items {
        let point = serde_json::from_value::<RawPoint>(item.clone())
            .ok()
            .and_then(|raw| {
                Some(ComparisonPoint {
                    feature: raw.feature,
                    product_a_value: scalar_text(&raw.product_a_value)?,
                    product_b_value: scalar_text(&raw.product_b_value)?,
                    winner: raw.winner.as_deref().and_then(Winner::parse),
                })
            });
        match point {
            Some(p) if !p.feature.trim().is_empty() => points.push(p),
            _ => dropped += 1,
        }
    }
    (points, dropped)
}

/// Text of a string, number or bool; `None` for containers and null.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
