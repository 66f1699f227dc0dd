use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use content_pipeline::{
    output::write_pages, Credentials, ExecCtx, Pipeline, PipelineState, ProviderSettings,
    RawInput, RenderStage, StrategistStage, TemplateSet,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Generate FAQ, product and comparison pages for one product.
#[derive(Debug, Parser)]
#[command(name = "content-pipeline", version, about)]
struct Cli {
    /// JSON object of labeled product fields. Defaults to a built-in sample.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory of page templates (`faq.json`, `product_page.json`, `comparison.json`).
    #[arg(short, long)]
    templates: Option<PathBuf>,

    /// Directory the rendered pages are written to.
    #[arg(short, long, default_value = "outputs")]
    output: PathBuf,
}

fn sample_input() -> RawInput {
    let sample = json!({
        "Product Name": "GlowBoost Vitamin C Serum",
        "Concentration": "10% Vitamin C",
        "Skin Type": "Oily, Combination",
        "Key Ingredients": "Vitamin C, Hyaluronic Acid",
        "Benefits": "Brightening, Fades dark spots",
        "How to Use": "Apply 2–3 drops in the morning before sunscreen",
        "Side Effects": "Mild tingling for sensitive skin",
        "Price": "₹699"
    });
    match sample {
        serde_json::Value::Object(map) => map,
        _ => RawInput::new(),
    }
}

fn load_input(path: &Path) -> anyhow::Result<RawInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading input {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing input {}", path.display()))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("input {} must be a JSON object of labeled fields", path.display()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let raw = match &cli.input {
        Some(path) => load_input(path)?,
        None => sample_input(),
    };
    let templates = match &cli.templates {
        Some(dir) => TemplateSet::load_dir(dir)?,
        None => TemplateSet::builtin()?,
    };

    let strategist =
        StrategistStage::from_credentials(Credentials::from_env(), ProviderSettings::from_env()?);
    let writer = RenderStage::new(templates)?;
    let pipeline = Pipeline::standard(strategist, writer);

    tracing::info!(stages = ?pipeline.stage_names(), "starting content pipeline");
    let state = pipeline
        .execute_with_progress(&ExecCtx::default(), PipelineState::new(raw), |p| {
            println!("[{}/{}] {}", p.stage_index + 1, p.total_stages, p.stage_name);
        })
        .await
        .context("content pipeline failed")?;

    let written = write_pages(&cli.output, &state.final_pages)
        .with_context(|| format!("writing pages to {}", cli.output.display()))?;
    for path in written {
        println!("Generated: {}", path.display());
    }
    Ok(())
}
