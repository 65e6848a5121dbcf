//! Error types for scheduler operations.

use thiserror::Error;

use crate::util::serde::WorkItemId;

/// Errors produced by scheduler components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// An action returned an error or panicked. Isolated to its work item.
    #[error("action failed for work item {id}: {message}")]
    ActionFailure {
        /// Work item whose action failed.
        id: WorkItemId,
        /// Rendered error or panic message.
        message: String,
    },
    /// Withdrawal requested for an id that is not pending.
    #[error("unknown work item: {0}")]
    UnknownWorkItem(WorkItemId),
    /// Internal invariant breach. Halts the scheduler.
    #[error("schedule violation: {0}")]
    ScheduleViolation(String),
    /// Completion posted after the owning scheduler was dropped.
    #[error("completion port closed")]
    PortClosed,
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SchedulerError {
    /// Whether this error halts the scheduler.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ScheduleViolation(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
