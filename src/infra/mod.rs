//! Infrastructure adapters for queues and external completion delivery.

pub mod completion;
pub mod queue;

pub use completion::{Completion, CompletionPort, CompletionSender};
pub use queue::{FifoQueue, TimerHeap};
