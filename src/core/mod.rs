//! Core scheduling abstractions: work items, queues, the scheduler and its
//! execution trace.

pub mod action;
pub mod context;
pub mod deferred;
pub mod error;
pub mod queue;
pub mod scheduler;
pub mod submit;
pub mod trace;
pub mod work_item;

pub use action::Action;
pub use context::Context;
pub use deferred::{Deferred, Settled};
pub use error::{AppResult, SchedulerError};
pub use queue::WorkQueue;
pub use scheduler::{PendingCounts, RunReport, Scheduler, SchedulerState, SchedulerStats};
pub use submit::Submit;
pub use trace::{
    build_trace_event, InMemoryTraceSink, LogTraceSink, TraceEvent, TraceOutcome, TraceSink,
};
pub use work_item::WorkItem;
