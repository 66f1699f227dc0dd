//! # Content Pipeline
//!
//! Turns one structured product record into rendered content pages (FAQ,
//! product page, competitor comparison) by threading it through a fixed
//! sequence of stages.
//!
//! ## Core Concepts
//!
//! - **[`Stage`]**: object-safe trait for one pipeline step. Reads the
//!   shared [`PipelineState`] and returns a [`StateDelta`] with the fields it
//!   adds.
//! - **[`Pipeline`]**: runs stages strictly in order and aborts on the first
//!   failure, returning it unchanged.
//! - **[`Provider`]**: one structured generation call against a generative
//!   service. [`select_provider`] picks OpenAI, then Gemini, from the
//!   available [`Credentials`].
//! - **[`TemplateRenderer`]**: fills `{logic.<name>}` references in JSON
//!   templates from the [`LogicRegistry`].
//!
//! The standard pipeline is Parse → Strategize → Render:
//!
//! ```text
//! raw fields ──► ParseStage ──► StrategistStage ──► RenderStage ──► final_pages
//!                 (Product)     (FAQs, competitor,    (faq, product_page,
//!                                 comparison)           comparison)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use content_pipeline::{
//!     Credentials, ExecCtx, Pipeline, PipelineState, ProviderSettings, RenderStage,
//!     StrategistStage, TemplateSet,
//! };
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let strategist = StrategistStage::from_credentials(
//!         Credentials::from_env(),
//!         ProviderSettings::from_env()?,
//!     );
//!     let writer = RenderStage::new(TemplateSet::builtin()?)?;
//!     let pipeline = Pipeline::standard(strategist, writer);
//!
//!     let raw = json!({"Product Name": "GlowBoost", "Price": "₹699"});
//!     let raw = raw.as_object().cloned().unwrap_or_default();
//!     let state = pipeline.execute(&ExecCtx::default(), PipelineState::new(raw)).await?;
//!     content_pipeline::output::write_pages("outputs", &state.final_pages)?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod exec_ctx;
pub mod logic;
pub mod output;
pub mod parser;
pub mod parsing;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod render;
pub mod retry;
pub mod schema;
pub mod stage;
pub mod state;
pub mod strategist;
pub mod templates;
pub mod types;
pub mod writer;

pub use config::{Credentials, LlmConfig, ProviderSettings};
pub use error::{PipelineError, Result};
pub use events::{Event, EventHandler};
pub use exec_ctx::{ExecCtx, ExecCtxBuilder};
pub use logic::LogicRegistry;
pub use parser::ParseStage;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use provider::{select_provider, GenerationRequest, MockProvider, MockReply, Provider};
pub use render::TemplateRenderer;
pub use retry::RetryConfig;
pub use schema::OutputSchema;
pub use stage::{BoxFut, Stage};
pub use state::{PipelineState, StateDelta};
pub use strategist::StrategistStage;
pub use templates::TemplateSet;
pub use types::{
    Comparison, ComparisonPoint, Currency, PipelineProgress, Product, Question, RawInput, Winner,
};
pub use writer::RenderStage;
