//! Template renderer: resolves `{logic.<name>}` references in JSON templates.
//!
//! Templates are arbitrary JSON. Objects and arrays are rebuilt recursively
//! and non-string scalars pass through. A string that is exactly one
//! reference resolves to the accessor's raw value, so a template can embed a
//! list or an object. Any other string containing references is
//! interpolated into text. Unknown names render as `MISSING:<name>`.

use crate::events::Event;
use crate::exec_ctx::ExecCtx;
use crate::logic::LogicRegistry;
use crate::state::PipelineState;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

/// Prefix of the marker substituted for unregistered names.
pub const MISSING_PREFIX: &str = "MISSING:";

fn reference_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{logic\.([A-Za-z0-9_]+)\}").unwrap())
}

/// Renders templates against a [`LogicRegistry`].
///
/// # Example
///
/// ```
/// use content_pipeline::render::TemplateRenderer;
/// use content_pipeline::state::PipelineState;
/// use serde_json::json;
///
/// let renderer = TemplateRenderer::default();
/// let template = json!({"who": "{logic.competitor_name}"});
/// let out = renderer.render(&template, &PipelineState::default());
/// assert_eq!(out, json!({"who": "Generic Brand"}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    registry: LogicRegistry,
}

impl TemplateRenderer {
    pub fn new(registry: LogicRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LogicRegistry {
        &self.registry
    }

    /// Render without reporting missing references as events.
    pub fn render(&self, template: &Value, state: &PipelineState) -> Value {
        self.render_with(&ExecCtx::default(), template, state)
    }

    /// Render, emitting [`Event::MissingReference`] for each unknown name.
    pub fn render_with(&self, ctx: &ExecCtx, template: &Value, state: &PipelineState) -> Value {
        match template {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.render_with(ctx, v, state)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.render_with(ctx, v, state))
                    .collect(),
            ),
            Value::String(text) => self.render_string(ctx, text, state),
            scalar => scalar.clone(),
        }
    }

    fn render_string(&self, ctx: &ExecCtx, text: &str, state: &PipelineState) -> Value {
        let re = reference_pattern();

        // Exactly one reference spanning the whole string keeps its type.
        if let Some(caps) = re.captures(text) {
            if caps.get(0).map(|m| m.as_str()) == Some(text) {
                return self.resolve(ctx, &caps[1], state);
            }
        } else {
            return Value::String(text.to_string());
        }

        let rendered = re.replace_all(text, |caps: &Captures| {
            match self.resolve(ctx, &caps[1], state) {
                Value::String(s) => s,
                other => other.to_string(),
            }
        });
        Value::String(rendered.into_owned())
    }

    fn resolve(&self, ctx: &ExecCtx, name: &str, state: &PipelineState) -> Value {
        match self.registry.resolve(name, state) {
            Some(value) => value,
            None => {
                tracing::warn!(name, "template references unknown logic entry");
                ctx.emit(Event::MissingReference {
                    name: name.to_string(),
                });
                Value::String(format!("{}{}", MISSING_PREFIX, name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingHandler;
    use crate::types::{Product, Question};
    use serde_json::json;
    use std::sync::Arc;

    fn state() -> PipelineState {
        let mut product = Product::new("GlowBoost", 699.0);
        product.benefits = vec!["Brightening".into()];
        let mut state = PipelineState::default();
        state.product = Some(product);
        state.generated_questions = vec![
            Question {
                category: "Usage".into(),
                question: "How?".into(),
                answer: Some("Daily.".into()),
            },
            Question {
                category: "Safety".into(),
                question: "Safe?".into(),
                answer: None,
            },
        ];
        state
    }

    #[test]
    fn test_no_references_is_identity() {
        let template = json!({
            "title": "Static page",
            "n": 3,
            "flag": true,
            "nothing": null,
            "nested": [{"a": "b"}, "{not.logic}", "{logic.}"]
        });
        assert_eq!(TemplateRenderer::default().render(&template, &state()), template);
    }

    #[test]
    fn test_single_reference_keeps_structure() {
        let template = json!({"faqs": "{logic.faq_list}"});
        let out = TemplateRenderer::default().render(&template, &state());
        let faqs = out["faqs"].as_array().expect("faq_list renders as a list");
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0]["question"], "How?");
        assert_eq!(faqs[1]["answer"], Value::Null);
    }

    #[test]
    fn test_interpolation_stringifies() {
        let renderer = TemplateRenderer::default();
        let s = state();
        assert_eq!(
            renderer.render(&json!("Price: {logic.price_formatted}"), &s),
            json!("Price: INR 699.00")
        );
        assert_eq!(
            renderer.render(&json!("{logic.product_name} has {logic.benefits_list}"), &s),
            json!(r#"GlowBoost has ["Brightening"]"#)
        );
        assert_eq!(
            renderer.render(&json!("{logic.question_count}{logic.question_count}"), &s),
            json!("22")
        );
    }

    #[test]
    fn test_single_reference_with_whitespace_is_interpolated() {
        let out = TemplateRenderer::default().render(&json!(" {logic.benefits_list}"), &state());
        assert_eq!(out, json!(r#" ["Brightening"]"#));
    }

    #[test]
    fn test_custom_registry() {
        fn shout(state: &PipelineState) -> Value {
            json!(state.product.as_ref().map(|p| p.name.to_uppercase()))
        }
        let renderer = TemplateRenderer::new(LogicRegistry::empty().with("shout", shout));
        assert_eq!(renderer.registry().names(), vec!["shout"]);

        let out = renderer.render(&json!(["{logic.shout}", "{logic.product_name}"]), &state());
        assert_eq!(out, json!(["GLOWBOOST", "MISSING:product_name"]));
    }

    #[test]
    fn test_missing_reference_sentinel() {
        let recorder = Arc::new(RecordingHandler::new());
        let ctx = ExecCtx::builder().event_handler(recorder.clone()).build();
        let renderer = TemplateRenderer::default();

        let out = renderer.render_with(
            &ctx,
            &json!({"a": "{logic.nope}", "b": "x {logic.nope} y"}),
            &state(),
        );
        assert_eq!(out, json!({"a": "MISSING:nope", "b": "x MISSING:nope y"}));
        assert_eq!(recorder.events().len(), 2);
    }
}
