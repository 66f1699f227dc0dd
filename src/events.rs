//! Event system for stage lifecycle and generation hooks.
//!
//! Provides an optional, non-intrusive way to observe pipeline execution.
//! Stages emit events when they start and finish, when a generation attempt
//! is issued, when a rate limit forces a cooldown, and when a degraded
//! fallback is substituted. Implement [`EventHandler`] to receive them.

use std::sync::Arc;

/// Events emitted during pipeline execution.
#[derive(Debug, Clone)]
pub enum Event {
    /// A stage is about to run.
    StageStart {
        /// Stage name.
        name: String,
        /// Position in the pipeline (0-based).
        index: usize,
    },
    /// A stage has finished.
    StageEnd {
        /// Stage name.
        name: String,
        /// Whether the stage succeeded.
        ok: bool,
    },
    /// A generative request is being issued.
    GenerationAttempt {
        /// Provider name (e.g. `"openai"`).
        provider: &'static str,
        /// What is being generated (`"faq"`, `"comparison"`).
        purpose: &'static str,
        /// Attempt number (1-indexed).
        attempt: u32,
        /// Maximum attempts for this request.
        max_attempts: u32,
    },
    /// A generation attempt failed or was rejected by validation.
    AttemptRejected {
        /// Attempt number (1-indexed).
        attempt: u32,
        /// Why the attempt did not count.
        reason: String,
    },
    /// The provider signalled a rate limit; the stage is cooling down.
    RateLimited {
        /// Attempt that hit the limit (1-indexed).
        attempt: u32,
        /// Cooldown before the next attempt in milliseconds.
        cooldown_ms: u64,
    },
    /// A degraded fallback value replaced an unusable response.
    FallbackUsed {
        /// What was replaced (`"competitor"`).
        what: &'static str,
        /// Why.
        reason: String,
    },
    /// A template referenced a name missing from the logic registry.
    MissingReference {
        /// The unknown name.
        name: String,
    },
}

/// Handler for pipeline lifecycle events.
///
/// This is entirely optional -- the pipeline works without an event handler.
///
/// # Example
///
/// ```
/// use content_pipeline::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         match event {
///             Event::StageStart { name, .. } => println!("[start] {}", name),
///             Event::StageEnd { name, ok } => println!("[end] {} ok={}", name, ok),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called when the pipeline emits an event.
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
///
/// # Example
///
/// ```
/// use content_pipeline::events::{Event, FnEventHandler};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: Event| {
///     if let Event::RateLimited { cooldown_ms, .. } = event {
///         eprintln!("cooling down for {}ms", cooldown_ms);
///     }
/// }));
/// ```
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}

/// Handler that records every event, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    events: std::sync::Mutex<Vec<Event>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl EventHandler for RecordingHandler {
    fn on_event(&self, event: Event) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
