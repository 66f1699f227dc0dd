//! Core stage trait.
//!
//! Stages are the execution unit of the pipeline. Each stage reads the current
//! [`PipelineState`], does its work (parsing, a generative call, rendering),
//! and returns a [`StateDelta`] with only the fields it adds or replaces.

use crate::error::Result;
use crate::exec_ctx::ExecCtx;
use crate::state::{PipelineState, StateDelta};
use std::future::Future;
use std::pin::Pin;

/// A boxed, pinned, Send future -- the return type of [`Stage::run`].
pub type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe trait for pipeline stages.
///
/// The trait is object-safe so stages can be stored as `Box<dyn Stage>` and
/// run in sequence by the [`Pipeline`](crate::pipeline::Pipeline).
pub trait Stage: Send + Sync {
    /// Instance name (for logging/progress/events).
    fn name(&self) -> &str;

    /// Execute the stage against a read-only view of the state.
    fn run<'a>(&'a self, ctx: &'a ExecCtx, state: &'a PipelineState)
        -> BoxFut<'a, Result<StateDelta>>;
}
