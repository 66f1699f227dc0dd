//! Prompt construction for the strategist's two generative calls.

use crate::types::Product;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Escaped braces or a `{key}` placeholder, matched left to right.
fn placeholder_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{|\}\}|\{(\w+)\}").unwrap())
}

/// Question categories the FAQ prompt asks the model to cover.
pub const FAQ_CATEGORIES: [&str; 4] = ["Usage", "Safety", "Benefits", "Purchase"];

const FAQ_TEMPLATE: &str = "You are a content strategist. Given the following product data, \
generate {count} distinct FAQ questions across categories ({categories}).

{product}

Return a JSON object with a key \"questions\" containing an array of objects with keys: \
\"category\", \"question\", \"answer\".
Make the answers helpful and based only on the product data provided.";

const COMPETITOR_TEMPLATE: &str = "Create a fictional competitor product (\"Product B\") similar \
to the input product but slightly inferior or different. Then compare them.

{product}

Return JSON with keys:
\"competitor\": {{ \"name\": \"...\", \"price\": 0, \"currency\": \"INR|USD\", ...other product fields }},
\"comparison_points\": [ {{ \"feature\": \"...\", \"product_a_value\": \"...\", \"product_b_value\": \"...\", \"winner\": \"A|B|Tie\" }} ]";

/// Build a prompt string with variable substitution.
///
/// Replaces `{key}` placeholders in the template with values from `vars`.
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}`.
/// Unknown placeholders are left as-is.
///
/// # Example
///
/// ```
/// use content_pipeline::prompt::render;
/// use std::collections::HashMap;
///
/// let vars = HashMap::from([("name", "Alice".to_string())]);
/// let result = render("Hello {name}, here is JSON: {{\"key\": \"val\"}}", &vars);
/// assert_eq!(result, r#"Hello Alice, here is JSON: {"key": "val"}"#);
/// ```
pub fn render(template: &str, vars: &HashMap<&str, String>) -> String {
    // One pass over the template: substituted values are never rescanned.
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| match caps.get(1) {
            Some(key) => vars
                .get(key.as_str())
                .cloned()
                .unwrap_or_else(|| caps[0].to_string()),
            None if &caps[0] == "{{" => "{".to_string(),
            None => "}".to_string(),
        })
        .into_owned()
}

/// Wrap text in a labeled section for structured prompts.
pub fn section(label: &str, content: &str) -> String {
    format!("## {}\n{}", label, content)
}

/// Product serialized as a labeled JSON section.
fn product_section(label: &str, product: &Product) -> String {
    let json = serde_json::to_string_pretty(product).unwrap_or_else(|_| product.name.clone());
    section(label, &json)
}

/// Prompt asking for `count` FAQ entries about `product`.
pub fn faq_prompt(product: &Product, count: usize) -> String {
    let vars = HashMap::from([
        ("count", count.to_string()),
        ("categories", FAQ_CATEGORIES.join(", ")),
        ("product", product_section("Product", product)),
    ]);
    render(FAQ_TEMPLATE, &vars)
}

/// Prompt asking for a fictional competitor and a feature comparison.
pub fn competitor_prompt(product: &Product) -> String {
    let vars = HashMap::from([("product", product_section("Product A", product))]);
    render(COMPETITOR_TEMPLATE, &vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic() {
        let vars = HashMap::from([("name", "Alice".to_string())]);
        assert_eq!(render("Hello {name}", &vars), "Hello Alice");
    }

    #[test]
    fn test_render_unknown_placeholder_kept() {
        assert_eq!(render("static {nope}", &HashMap::new()), "static {nope}");
    }

    #[test]
    fn test_render_escaped_braces_no_substitution() {
        let result = render("Output format: {{\"result\": {{\"value\": 42}}}}", &HashMap::new());
        assert_eq!(result, r#"Output format: {"result": {"value": 42}}"#);
    }

    #[test]
    fn test_render_does_not_rescan_substituted_values() {
        let vars = HashMap::from([
            ("a", "{b}".to_string()),
            ("b", "oops".to_string()),
        ]);
        assert_eq!(render("{a} {b}", &vars), "{b} oops");
    }

    #[test]
    fn test_render_escaped_placeholder_stays_literal() {
        let vars = HashMap::from([("name", "Alice".to_string())]);
        assert_eq!(render("{{name}} is {name}", &vars), "{name} is Alice");
    }

    #[test]
    fn test_faq_prompt_keeps_braces_in_product_data() {
        let product = Product::new("Serum {categories} {count}", 1.0);
        for _ in 0..20 {
            let prompt = faq_prompt(&product, 15);
            assert!(prompt.contains("\"Serum {categories} {count}\""));
        }
    }

    #[test]
    fn test_section() {
        assert_eq!(section("Context", "Some knowledge"), "## Context\nSome knowledge");
    }

    #[test]
    fn test_faq_prompt_mentions_count_and_categories() {
        let prompt = faq_prompt(&Product::new("GlowBoost", 699.0), 15);
        assert!(prompt.contains("generate 15 distinct FAQ questions"));
        assert!(prompt.contains("Usage, Safety, Benefits, Purchase"));
        assert!(prompt.contains("## Product\n"));
        assert!(prompt.contains("\"GlowBoost\""));
    }

    #[test]
    fn test_competitor_prompt_restores_braces() {
        let prompt = competitor_prompt(&Product::new("GlowBoost", 699.0));
        assert!(prompt.contains("## Product A\n"));
        assert!(prompt.contains("\"competitor\": { \"name\""));
        assert!(prompt.contains("\"winner\": \"A|B|Tie\" }"));
        assert!(!prompt.contains("{{"));
    }
}
