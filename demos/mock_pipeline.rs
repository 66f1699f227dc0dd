//! Example: running the full content pipeline against MockProvider.
//!
//! Run with: `cargo run --example mock_pipeline`

use content_pipeline::events::FnEventHandler;
use content_pipeline::{
    Event, ExecCtx, MockProvider, MockReply, Pipeline, PipelineState, RenderStage,
    StrategistStage, TemplateSet,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn canned_faq() -> Value {
    let categories = ["Usage", "Safety", "Benefits", "Purchase"];
    let questions: Vec<Value> = (0..16)
        .map(|i| {
            json!({
                "category": categories[i % categories.len()],
                "question": format!("Sample question {}?", i + 1),
                "answer": format!("Sample answer {}.", i + 1),
            })
        })
        .collect();
    json!({ "questions": questions })
}

fn canned_comparison() -> Value {
    json!({
        "competitor": {
            "name": "RadiantC Daily Serum",
            "price": 549,
            "currency": "INR",
            "description": "A 5% Vitamin C serum for everyday use."
        },
        "comparison_points": [
            {"feature": "Vitamin C", "product_a_value": "10%", "product_b_value": "5%", "winner": "A"},
            {"feature": "Price", "product_a_value": "₹699", "product_b_value": "₹549", "winner": "B"}
        ]
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // One FAQ batch, then the comparison
    let mock = MockProvider::new(vec![
        MockReply::Value(canned_faq()),
        MockReply::Value(canned_comparison()),
    ]);

    let ctx = ExecCtx::builder()
        .event_handler(Arc::new(FnEventHandler(|event: Event| {
            if let Event::StageStart { name, index } = event {
                println!("[stage {}] {}", index, name);
            }
        })))
        .build();

    let pipeline = Pipeline::standard(
        StrategistStage::with_provider(Arc::new(mock)),
        RenderStage::new(TemplateSet::builtin()?)?,
    );

    let raw = json!({
        "Product Name": "GlowBoost Vitamin C Serum",
        "Concentration": "10% Vitamin C",
        "Skin Type": "Oily, Combination",
        "Price": "₹699"
    });
    let raw = raw.as_object().cloned().unwrap_or_default();

    let state = pipeline.execute(&ctx, PipelineState::new(raw)).await?;
    for (page, doc) in &state.final_pages {
        println!("--- {} ---", page);
        println!("{}", serde_json::to_string_pretty(doc)?);
    }
    Ok(())
}
