//! Queue abstraction used by the scheduler for each work class.

use super::WorkItem;
use crate::util::serde::{LogicalTime, WorkItemId};

/// Abstraction for per-class queue backends.
pub trait WorkQueue: Send {
    /// Add an item.
    fn push(&mut self, item: WorkItem);
    /// Remove and return the next item that is due at `now` and was submitted
    /// before `sequence_cutoff`, honoring `(ready_at, sequence)` order.
    fn pop_due(&mut self, now: LogicalTime, sequence_cutoff: u64) -> Option<WorkItem>;
    /// Remove a specific item, returning it if present.
    fn remove(&mut self, id: WorkItemId) -> Option<WorkItem>;
    /// Earliest `ready_at` among queued items.
    fn next_ready_at(&self) -> Option<LogicalTime>;
    /// Current depth.
    fn len(&self) -> usize;
    /// Whether the queue holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
