//! Timer queue ordered by due time, then submission order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::{WorkItem, WorkQueue};
use crate::util::serde::{LogicalTime, WorkItemId};

/// Wrapper to make a timer orderable as earliest-due first on a max-heap.
struct TimerEntry {
    item: WorkItem,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.item.order_key() == other.item.order_key()
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: smallest (ready_at, sequence) sits at the top.
        other.item.order_key().cmp(&self.item.order_key())
    }
}

/// Timer queue using a binary heap for O(log n) push and pop.
#[derive(Default)]
pub struct TimerHeap {
    timers: BinaryHeap<TimerEntry>,
}

impl TimerHeap {
    /// Create an empty timer queue.
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkQueue for TimerHeap {
    fn push(&mut self, item: WorkItem) {
        self.timers.push(TimerEntry { item });
    }

    fn pop_due(&mut self, now: LogicalTime, sequence_cutoff: u64) -> Option<WorkItem> {
        // A timer submitted during the phase with ready_at == now sorts after
        // every older timer with the same ready_at, so stopping here is exact.
        if self.timers.peek()?.item.is_due(now, sequence_cutoff) {
            self.timers.pop().map(|entry| entry.item)
        } else {
            None
        }
    }

    fn remove(&mut self, id: WorkItemId) -> Option<WorkItem> {
        if !self.timers.iter().any(|entry| entry.item.id == id) {
            return None;
        }
        // Rebuild heap without the withdrawn timer
        let mut removed = None;
        let entries: Vec<_> = self.timers.drain().collect();
        self.timers = entries
            .into_iter()
            .filter_map(|entry| {
                if entry.item.id == id {
                    removed = Some(entry.item);
                    None
                } else {
                    Some(entry)
                }
            })
            .collect();
        removed
    }

    fn next_ready_at(&self) -> Option<LogicalTime> {
        self.timers.peek().map(|entry| entry.item.ready_at)
    }

    fn len(&self) -> usize {
        self.timers.len()
    }
}
