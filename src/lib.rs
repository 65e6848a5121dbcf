//! # Prometheus Event Loop
//!
//! A deterministic, single-threaded event-loop simulator.
//!
//! The scheduler reproduces the observable ordering contract of a cooperative
//! event loop without real I/O or wall-clock waits. Work is submitted in four
//! classes and drained under a fixed priority protocol:
//!
//! - **Immediate**: synchronous work, run first in submission order
//! - **Microtask**: drained to exhaustion at every checkpoint, including
//!   microtasks queued by microtasks
//! - **Timer**: eligible once the logical clock reaches `now + delay`, ordered
//!   by due time then submission order
//! - **I/O completion**: callbacks of external operations, run after the due
//!   timers of the same macrotask phase
//!
//! A microtask drain follows every macrotask. When nothing is due the logical
//! clock jumps to the earliest pending timer, so `run()` never sleeps.
//!
//! ## Quick start
//!
//! ```rust
//! use prometheus_event_loop::core::{InMemoryTraceSink, Scheduler, Submit};
//! use prometheus_event_loop::WorkClass;
//!
//! let trace = InMemoryTraceSink::new(64);
//! let mut scheduler = Scheduler::new().with_trace(Box::new(trace.clone()));
//!
//! scheduler.submit_labelled(WorkClass::Immediate, "A", |_| Ok(()));
//! scheduler.submit_labelled(WorkClass::IoCompletion, "immediate", |_| Ok(()));
//! scheduler.submit_timer_labelled("timeout-0", 0, |_| Ok(())).unwrap();
//! scheduler.submit_labelled(WorkClass::Microtask, "microtask", |_| Ok(()));
//! scheduler.submit_labelled(WorkClass::Immediate, "B", |_| Ok(()));
//!
//! let report = scheduler.run().unwrap();
//! assert!(report.is_clean());
//! assert_eq!(trace.names(), ["A", "B", "microtask", "timeout-0", "immediate"]);
//! ```
//!
//! ## Failures
//!
//! An action that returns `Err` or panics is recorded as an
//! [`ActionFailure`](core::SchedulerError::ActionFailure) and the drain
//! continues. Invariant breaches such as a negative timer delay are
//! [`ScheduleViolation`](core::SchedulerError::ScheduleViolation)s: the
//! scheduler halts and every later `run()` reports the violation.
//!
//! ## External completions
//!
//! [`Scheduler::completion_port`](core::Scheduler::completion_port) hands out a
//! thread-safe sender. Whatever performs real I/O posts its callback there and
//! the scheduler picks it up at the next loop iteration.
//!
//! For complete scenarios, see `tests/ordering_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and the event loop.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for queues and completion delivery.
pub mod infra;
/// Shared utilities.
pub mod util;

pub use crate::core::{Scheduler, SchedulerError, Submit};
pub use crate::util::serde::{LogicalTime, WorkClass, WorkItemId};
