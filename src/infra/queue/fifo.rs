//! FIFO queue for immediate, microtask and I/O-completion items.

use std::collections::VecDeque;

use crate::core::{WorkItem, WorkQueue};
use crate::util::serde::{LogicalTime, WorkItemId};

/// Submission-ordered queue. Items are ready as soon as they are queued, so
/// `(ready_at, sequence)` order is plain insertion order.
#[derive(Debug, Default)]
pub struct FifoQueue {
    items: VecDeque<WorkItem>,
}

impl FifoQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the front item regardless of phase cutoff.
    pub fn pop_front(&mut self) -> Option<WorkItem> {
        self.items.pop_front()
    }

    /// Put `batch` ahead of everything queued, keeping the batch's own order.
    pub fn push_front_all(&mut self, batch: Vec<WorkItem>) {
        for item in batch.into_iter().rev() {
            self.items.push_front(item);
        }
    }
}

impl WorkQueue for FifoQueue {
    fn push(&mut self, item: WorkItem) {
        self.items.push_back(item);
    }

    fn pop_due(&mut self, now: LogicalTime, sequence_cutoff: u64) -> Option<WorkItem> {
        if self.items.front()?.is_due(now, sequence_cutoff) {
            self.items.pop_front()
        } else {
            None
        }
    }

    fn remove(&mut self, id: WorkItemId) -> Option<WorkItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        self.items.remove(index)
    }

    fn next_ready_at(&self) -> Option<LogicalTime> {
        self.items.front().map(|item| item.ready_at)
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}
