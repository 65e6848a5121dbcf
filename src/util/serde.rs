//! Identifier and classification types shared across the scheduler.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Logical time units on the scheduler clock.
pub type LogicalTime = u64;

/// Identifier assigned to a work item at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemId(pub u64);

impl fmt::Display for WorkItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of one scheduler instance, carried in spans and trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoopId(pub Uuid);

impl LoopId {
    /// Generate a fresh random loop id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LoopId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Queue class of a work item. Declaration order is the drain priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkClass {
    /// Synchronous work, run before any deferred queue.
    Immediate,
    /// Deferred work drained exhaustively at every checkpoint.
    Microtask,
    /// Work that becomes eligible once the logical clock reaches its due time.
    Timer,
    /// Completion of an external operation, run after due timers in a phase.
    IoCompletion,
}

impl WorkClass {
    /// Whether items of this class run inside a macrotask phase.
    pub const fn is_macrotask(self) -> bool {
        matches!(self, Self::Timer | Self::IoCompletion)
    }

    /// Short lowercase name used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Microtask => "microtask",
            Self::Timer => "timer",
            Self::IoCompletion => "io_completion",
        }
    }
}

impl fmt::Display for WorkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_priority_order() {
        assert!(WorkClass::Immediate < WorkClass::Microtask);
        assert!(WorkClass::Microtask < WorkClass::Timer);
        assert!(WorkClass::Timer < WorkClass::IoCompletion);
    }

    #[test]
    fn test_class_serde_names() {
        let json = serde_json::to_string(&WorkClass::IoCompletion).unwrap();
        assert_eq!(json, "\"io_completion\"");
        let back: WorkClass = serde_json::from_str("\"timer\"").unwrap();
        assert_eq!(back, WorkClass::Timer);
    }

    #[test]
    fn test_macrotask_classes() {
        assert!(!WorkClass::Immediate.is_macrotask());
        assert!(!WorkClass::Microtask.is_macrotask());
        assert!(WorkClass::Timer.is_macrotask());
        assert!(WorkClass::IoCompletion.is_macrotask());
    }

    #[test]
    fn test_work_item_id_display() {
        assert_eq!(WorkItemId(7).to_string(), "#7");
    }
}
