//! Queue backends.

pub mod fifo;
pub mod timer_heap;

pub use fifo::FifoQueue;
pub use timer_heap::TimerHeap;
