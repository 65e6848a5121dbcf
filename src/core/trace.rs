//! Execution trace sinks.
//!
//! Every executed work item produces one [`TraceEvent`]. A printer or a test
//! attaches a sink to the scheduler and inspects the execution order after
//! `run()`.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::util::serde::{LogicalTime, LoopId, WorkClass, WorkItemId};

/// How an executed action ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum TraceOutcome {
    /// The action returned `Ok`.
    Completed,
    /// The action returned `Err` or panicked.
    Failed(String),
}

/// Trace event structure.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    /// Scheduler that executed the item.
    pub loop_id: LoopId,
    /// Executed item.
    pub item: WorkItemId,
    /// Class of the executed item.
    pub class: WorkClass,
    /// Label given at submission.
    pub label: Option<String>,
    /// Logical time at execution.
    pub at: LogicalTime,
    /// Position in the scheduler's overall execution order, starting at 0.
    pub position: u64,
    /// Result of the action.
    pub outcome: TraceOutcome,
}

impl TraceEvent {
    /// Label if present, otherwise the item id.
    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.item.to_string())
    }
}

/// Trace sink abstraction.
pub trait TraceSink: Send {
    /// Record a trace event.
    fn record(&mut self, event: TraceEvent);
}

/// In-memory trace sink for testing and inspection.
///
/// Clones share one bounded buffer, so the caller keeps a clone and hands the
/// other to the scheduler.
#[derive(Debug, Clone)]
pub struct InMemoryTraceSink {
    events: Arc<Mutex<VecDeque<TraceEvent>>>,
    max_events: usize,
}

impl InMemoryTraceSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Display names in execution order.
    pub fn names(&self) -> Vec<String> {
        self.events.lock().iter().map(TraceEvent::display_name).collect()
    }

    /// Drop all stored events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl TraceSink for InMemoryTraceSink {
    fn record(&mut self, event: TraceEvent) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Sink that emits each event as a `tracing` info line with a JSON body.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn record(&mut self, event: TraceEvent) {
        match serde_json::to_string(&event) {
            Ok(body) => tracing::info!(target: "event_loop::trace", "{body}"),
            Err(e) => tracing::error!("failed to serialize trace event: {}", e),
        }
    }
}

/// Helper to build a trace event from context.
pub fn build_trace_event(
    loop_id: LoopId,
    item: WorkItemId,
    class: WorkClass,
    label: Option<String>,
    at: LogicalTime,
    position: u64,
    failure: Option<&str>,
) -> TraceEvent {
    TraceEvent {
        loop_id,
        item,
        class,
        label,
        at,
        position,
        outcome: failure.map_or(TraceOutcome::Completed, |m| TraceOutcome::Failed(m.to_string())),
    }
}
