use crate::{
    error::Result,
    events::Event,
    exec_ctx::ExecCtx,
    parser::ParseStage,
    stage::Stage,
    state::PipelineState,
    strategist::StrategistStage,
    types::PipelineProgress,
    writer::RenderStage,
    PipelineError,
};

/// Sequential stage executor over one shared [`PipelineState`].
///
/// Stage order is fixed when the pipeline is built. Every stage runs exactly
/// once, in order; the first failure aborts the run and is returned to the
/// caller unchanged, so no later stage ever observes a half-populated state.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// The content pipeline: Parse -> Strategize -> Render.
    pub fn standard(strategist: StrategistStage, writer: RenderStage) -> Self {
        Self {
            stages: vec![
                Box::new(ParseStage::new()),
                Box::new(strategist),
                Box::new(writer),
            ],
        }
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in order and return the final state.
    pub async fn execute(&self, ctx: &ExecCtx, initial: PipelineState) -> Result<PipelineState> {
        self.execute_with_progress(ctx, initial, |_| {}).await
    }

    /// Run every stage in order, reporting each stage before it starts.
    pub async fn execute_with_progress<F>(
        &self,
        ctx: &ExecCtx,
        initial: PipelineState,
        mut on_progress: F,
    ) -> Result<PipelineState>
    where
        F: FnMut(PipelineProgress),
    {
        let total_stages = self.stages.len();
        let mut state = initial;

        for (idx, stage) in self.stages.iter().enumerate() {
            let name = stage.name().to_string();

            on_progress(PipelineProgress {
                stage_index: idx,
                total_stages,
                stage_name: name.clone(),
            });
            ctx.emit(Event::StageStart {
                name: name.clone(),
                index: idx,
            });
            tracing::info!(stage = %name, index = idx, total = total_stages, "running stage");

            match stage.run(ctx, &state).await {
                Ok(delta) => {
                    state.apply(delta);
                    ctx.emit(Event::StageEnd { name, ok: true });
                }
                Err(e) => {
                    tracing::error!(stage = %name, error = %e, "stage failed, aborting pipeline");
                    ctx.emit(Event::StageEnd { name, ok: false });
                    return Err(e);
                }
            }
        }

        Ok(state)
    }
}

/// Builder for creating pipelines.
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage. Stages run in the order they were added.
    pub fn add_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Build the pipeline, validating configuration.
    pub fn build(self) -> Result<Pipeline> {
        if self.stages.is_empty() {
            return Err(PipelineError::Configuration(
                "Pipeline must have at least one stage".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for stage in &self.stages {
            if !seen.insert(stage.name().to_string()) {
                return Err(PipelineError::Configuration(format!(
                    "Duplicate stage name '{}'",
                    stage.name()
                )));
            }
        }

        Ok(Pipeline {
            stages: self.stages,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
