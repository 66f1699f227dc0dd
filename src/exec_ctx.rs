//! Execution context shared across stage invocations.
//!
//! [`ExecCtx`] carries the optional event handler. It is constructed once per
//! pipeline run and lent to every stage.

use crate::events::{emit, Event, EventHandler};
use std::sync::Arc;

/// Shared execution context for stage invocations.
///
/// # Example
///
/// ```
/// use content_pipeline::ExecCtx;
///
/// let ctx = ExecCtx::builder().build();
/// assert!(!ctx.has_event_handler());
/// ```
#[derive(Clone, Default)]
pub struct ExecCtx {
    /// Optional event handler for lifecycle and generation events.
    pub event_handler: Option<Arc<dyn EventHandler>>,
}

impl ExecCtx {
    /// Create a new builder.
    pub fn builder() -> ExecCtxBuilder {
        ExecCtxBuilder {
            event_handler: None,
        }
    }

    pub fn has_event_handler(&self) -> bool {
        self.event_handler.is_some()
    }

    /// Forward an event to the handler, if any.
    pub fn emit(&self, event: Event) {
        emit(&self.event_handler, event);
    }
}

impl std::fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecCtx")
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

/// Builder for [`ExecCtx`].
pub struct ExecCtxBuilder {
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl ExecCtxBuilder {
    /// Set the event handler.
    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the execution context.
    pub fn build(self) -> ExecCtx {
        ExecCtx {
            event_handler: self.event_handler,
        }
    }
}
