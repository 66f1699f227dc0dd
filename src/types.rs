use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Free-form labeled product attributes as supplied by the caller.
pub type RawInput = serde_json::Map<String, serde_json::Value>;

/// Reporting currency of a product price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    /// ISO 4217 code.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
        }
    }

    /// Case-insensitive parse of a supported code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "INR" => Some(Currency::Inr),
            "USD" => Some(Currency::Usd),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Currency::from_code(&code)
            .ok_or_else(|| serde::de::Error::unknown_variant(&code, &["INR", "USD"]))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A validated product record.
///
/// Created once by the parse stage (or by the strategist for the synthetic
/// competitor) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    /// Always `>= 0`.
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub concentration: Option<String>,
    #[serde(default)]
    pub skin_type: Vec<String>,
    #[serde(default)]
    pub key_ingredients: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub how_to_use: Option<String>,
    #[serde(default)]
    pub side_effects: Option<String>,
}

impl Product {
    /// Product with only a name and price; every other field empty.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
            currency: Currency::default(),
            description: None,
            concentration: None,
            skin_type: Vec::new(),
            key_ingredients: Vec::new(),
            benefits: Vec::new(),
            how_to_use: None,
            side_effects: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// `"<CUR> <price>"` with two decimals, e.g. `"INR 699.00"`.
    pub fn price_formatted(&self) -> String {
        format!("{} {:.2}", self.currency, self.price)
    }
}

/// A single generated FAQ entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: String,
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
}

/// Which side of a comparison point wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    A,
    B,
    Tie,
}

impl Winner {
    /// Case-insensitive parse of `A`, `B` or `Tie`. Anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Some(Winner::A),
            "b" => Some(Winner::B),
            "tie" => Some(Winner::Tie),
            _ => None,
        }
    }
}

/// One compared feature between the product (A) and the competitor (B).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub feature: String,
    pub product_a_value: String,
    pub product_b_value: String,
    pub winner: Option<Winner>,
}

/// Feature-by-feature comparison against a competitor.
///
/// The competitor name is always taken from the competitor [`Product`] it was
/// produced with; there is no way to set it independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    competitor_name: String,
    points: Vec<ComparisonPoint>,
}

impl Comparison {
    /// Build a comparison against `competitor`.
    pub fn against(competitor: &Product, points: Vec<ComparisonPoint>) -> Self {
        Self {
            competitor_name: competitor.name.clone(),
            points,
        }
    }

    pub fn competitor_name(&self) -> &str {
        &self.competitor_name
    }

    pub fn points(&self) -> &[ComparisonPoint] {
        &self.points
    }
}

/// Progress update emitted before each stage runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineProgress {
    /// Current stage index (0-based).
    pub stage_index: usize,

    /// Total number of stages in the pipeline.
    pub total_stages: usize,

    /// Name of the current stage.
    pub stage_name: String,
}
