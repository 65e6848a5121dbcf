//! Logical clock driving timer eligibility.

use crate::core::SchedulerError;
use crate::util::serde::LogicalTime;

/// Monotonic synthetic clock. Never reads wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogicalClock {
    now: LogicalTime,
}

impl LogicalClock {
    /// Create a clock starting at `start`.
    pub const fn starting_at(start: LogicalTime) -> Self {
        Self { now: start }
    }

    /// Current logical time.
    pub const fn now(&self) -> LogicalTime {
        self.now
    }

    /// Compute `now + delay`, rejecting negative delays and overflow.
    pub fn deadline_after(&self, delay: i64) -> Result<LogicalTime, SchedulerError> {
        let delay = u64::try_from(delay)
            .map_err(|_| SchedulerError::ScheduleViolation(format!("negative timer delay {delay}")))?;
        self.now.checked_add(delay).ok_or_else(|| {
            SchedulerError::ScheduleViolation(format!(
                "timer deadline overflows the logical clock (now={}, delay={delay})",
                self.now
            ))
        })
    }

    /// Move the clock forward to `to`. Moving backwards is a violation.
    pub fn advance_to(&mut self, to: LogicalTime) -> Result<(), SchedulerError> {
        if to < self.now {
            return Err(SchedulerError::ScheduleViolation(format!(
                "clock cannot move backwards from {} to {to}",
                self.now
            )));
        }
        self.now = to;
        Ok(())
    }
}
