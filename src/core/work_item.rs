//! The schedulable unit.

use std::fmt;

use super::Action;
use crate::util::serde::{LogicalTime, WorkClass, WorkItemId};

/// A queued work item. Immutable once queued; consumed when it runs.
pub struct WorkItem {
    /// Identifier assigned at submission.
    pub id: WorkItemId,
    /// Queue class.
    pub class: WorkClass,
    /// Earliest logical time the item may run. Submission time for non-timers.
    pub ready_at: LogicalTime,
    /// Submission counter, the tie-break within a class.
    pub sequence: u64,
    /// Optional name carried into the trace.
    pub label: Option<String>,
    pub(crate) action: Box<dyn Action>,
}

impl WorkItem {
    pub(crate) fn new(
        id: WorkItemId,
        class: WorkClass,
        ready_at: LogicalTime,
        sequence: u64,
        label: Option<String>,
        action: Box<dyn Action>,
    ) -> Self {
        Self {
            id,
            class,
            ready_at,
            sequence,
            label,
            action,
        }
    }

    /// Ordering key within a class.
    pub const fn order_key(&self) -> (LogicalTime, u64) {
        (self.ready_at, self.sequence)
    }

    /// Whether the item may run at `now` within a phase that started before
    /// `sequence_cutoff` was assigned.
    pub const fn is_due(&self, now: LogicalTime, sequence_cutoff: u64) -> bool {
        self.ready_at <= now && self.sequence < sequence_cutoff
    }
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkItem")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("ready_at", &self.ready_at)
            .field("sequence", &self.sequence)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
