//! Builders to construct a scheduler from configuration.

use crate::config::SchedulerConfig;
use crate::core::{InMemoryTraceSink, Scheduler, SchedulerError, TraceSink};
use crate::util::serde::LoopId;

/// Step-by-step scheduler construction.
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    loop_id: Option<LoopId>,
    trace: Option<Box<dyn TraceSink>>,
}

impl SchedulerBuilder {
    /// Start from `config`.
    pub const fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            loop_id: None,
            trace: None,
        }
    }

    /// Configuration the builder will apply.
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Use a fixed loop id instead of a random one.
    pub fn loop_id(mut self, loop_id: LoopId) -> Self {
        self.loop_id = Some(loop_id);
        self
    }

    /// Attach a trace sink, replacing the one `trace_capacity` would create.
    pub fn trace(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    /// `InvalidConfig` if validation fails.
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        let mut scheduler = Scheduler::with_config(&self.config)?;
        if let Some(loop_id) = self.loop_id {
            scheduler = scheduler.with_loop_id(loop_id);
        }
        let trace = self.trace.or_else(|| {
            (self.config.trace_capacity > 0)
                .then(|| Box::new(InMemoryTraceSink::new(self.config.trace_capacity)) as Box<dyn TraceSink>)
        });
        if let Some(sink) = trace {
            scheduler = scheduler.with_trace(sink);
        }
        tracing::debug!(loop_id = %scheduler.loop_id(), "scheduler built");
        Ok(scheduler)
    }
}

/// Build a scheduler and, when `trace_capacity > 0`, the in-memory trace
/// attached to it.
///
/// # Errors
/// `InvalidConfig` if validation fails.
pub fn build_scheduler(
    cfg: &SchedulerConfig,
) -> Result<(Scheduler, Option<InMemoryTraceSink>), SchedulerError> {
    cfg.validate()?;
    let trace = (cfg.trace_capacity > 0).then(|| InMemoryTraceSink::new(cfg.trace_capacity));
    let mut builder = SchedulerBuilder::new(cfg.clone());
    if let Some(sink) = &trace {
        builder = builder.trace(Box::new(sink.clone()));
    }
    Ok((builder.build()?, trace))
}
