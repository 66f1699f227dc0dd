//! Render stage: fills every page template into `final_pages`.

use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::render::TemplateRenderer;
use crate::stage::{BoxFut, Stage};
use crate::state::{PipelineState, StateDelta};
use crate::templates::TemplateSet;
use serde_json::Value;
use std::collections::BTreeMap;

/// Pages the render stage produces, in output order.
pub const PAGE_NAMES: [&str; 3] = ["faq", "product_page", "comparison"];

/// Stage that renders [`PAGE_NAMES`] from a [`TemplateSet`].
#[derive(Debug, Clone)]
pub struct RenderStage {
    pages: Vec<(&'static str, Value)>,
    renderer: TemplateRenderer,
}

impl RenderStage {
    /// Fails with a `Configuration` error if any page template is missing.
    /// Extra templates in the set are ignored.
    pub fn new(templates: TemplateSet) -> Result<Self> {
        Self::with_renderer(templates, TemplateRenderer::default())
    }

    pub fn with_renderer(templates: TemplateSet, renderer: TemplateRenderer) -> Result<Self> {
        let mut pages = Vec::with_capacity(PAGE_NAMES.len());
        for name in PAGE_NAMES {
            pages.push((name, templates.require(name)?.clone()));
        }
        Ok(Self { pages, renderer })
    }
}

impl Stage for RenderStage {
    fn name(&self) -> &str {
        "writer"
    }

    fn run<'a>(
        &'a self,
        ctx: &'a ExecCtx,
        state: &'a PipelineState,
    ) -> BoxFut<'a, Result<StateDelta>> {
        Box::pin(async move {
            state.require_product(self.name())?;

            let pages: BTreeMap<String, Value> = self
                .pages
                .iter()
                .map(|(name, template)| {
                    tracing::debug!(page = *name, "rendering page");
                    (name.to_string(), self.renderer.render_with(ctx, template, state))
                })
                .collect();

            tracing::info!(pages = pages.len(), "rendered pages");
            Ok(StateDelta {
                final_pages: Some(pages),
                ..Default::default()
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use crate::PipelineError;
    use serde_json::json;

    fn state() -> PipelineState {
        let mut state = PipelineState::default();
        state.product = Some(Product::new("TestProduct", 100.0));
        state
    }

    #[test]
    fn test_missing_template_rejected_at_construction() {
        let templates = TemplateSet::new()
            .with("faq", json!({}))
            .with("product_page", json!({}));
        let err = RenderStage::new(templates).unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(ref m) if m.contains("comparison")));
    }

    #[tokio::test]
    async fn test_renders_all_pages() {
        let stage = RenderStage::new(TemplateSet::builtin().unwrap()).unwrap();
        let delta = stage.run(&ExecCtx::default(), &state()).await.unwrap();
        let pages = delta.final_pages.unwrap();

        assert_eq!(
            pages.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["comparison", "faq", "product_page"]
        );
        assert_eq!(pages["product_page"]["title"], "TestProduct");
        assert_eq!(pages["product_page"]["price"], "INR 100.00");
        assert_eq!(pages["comparison"]["title"], "TestProduct vs Generic Brand");
        assert_eq!(pages["comparison"]["comparison"], json!({}));
        assert!(pages["faq"]["questions"].is_array());
    }

    #[tokio::test]
    async fn test_extra_templates_ignored() {
        let templates = TemplateSet::builtin().unwrap().with("blog", json!("{logic.product_name}"));
        let delta = RenderStage::new(templates)
            .unwrap()
            .run(&ExecCtx::default(), &state())
            .await
            .unwrap();
        assert!(!delta.final_pages.unwrap().contains_key("blog"));
    }

    #[tokio::test]
    async fn test_requires_product() {
        let stage = RenderStage::new(TemplateSet::builtin().unwrap()).unwrap();
        let err = stage
            .run(&ExecCtx::default(), &PipelineState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingState { .. }));
    }
}
