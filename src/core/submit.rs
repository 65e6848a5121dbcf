//! Submission surface shared by the scheduler and running actions.

use super::{Action, AppResult, Context, SchedulerError};
use crate::util::serde::{LogicalTime, WorkClass, WorkItemId};

/// Operations for queueing and withdrawing work.
///
/// Implemented by [`Scheduler`](super::Scheduler) for top-level code and by
/// [`Context`] for code running inside an action, so helpers such as
/// [`Deferred`](super::Deferred) work from either side.
pub trait Submit {
    /// Queue a ready item of `class`. A `Timer` class is treated as a
    /// zero-delay timer.
    fn submit_ready(
        &mut self,
        class: WorkClass,
        label: Option<String>,
        action: Box<dyn Action>,
    ) -> WorkItemId;

    /// Queue a timer due `delay` units from now.
    ///
    /// # Errors
    /// `ScheduleViolation` for a negative delay or clock overflow. The
    /// scheduler halts when this happens.
    fn submit_delayed(
        &mut self,
        label: Option<String>,
        delay: i64,
        action: Box<dyn Action>,
    ) -> Result<WorkItemId, SchedulerError>;

    /// Withdraw a pending item.
    ///
    /// # Errors
    /// `UnknownWorkItem` if the id was never submitted, is running, or has
    /// completed or been withdrawn already.
    fn withdraw(&mut self, id: WorkItemId) -> Result<(), SchedulerError>;

    /// Current logical time.
    fn now(&self) -> LogicalTime;

    /// Queue synchronous work.
    fn submit_immediate<F>(&mut self, action: F) -> WorkItemId
    where
        F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
    {
        self.submit_ready(WorkClass::Immediate, None, Box::new(action))
    }

    /// Queue work for the next microtask checkpoint.
    fn submit_microtask<F>(&mut self, action: F) -> WorkItemId
    where
        F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
    {
        self.submit_ready(WorkClass::Microtask, None, Box::new(action))
    }

    /// Queue a timer due `delay` units from now.
    ///
    /// # Errors
    /// See [`Submit::submit_delayed`].
    fn submit_timer<F>(&mut self, action: F, delay: i64) -> Result<WorkItemId, SchedulerError>
    where
        F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
    {
        self.submit_delayed(None, delay, Box::new(action))
    }

    /// Queue the completion of an external operation.
    fn submit_io_completion<F>(&mut self, action: F) -> WorkItemId
    where
        F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
    {
        self.submit_ready(WorkClass::IoCompletion, None, Box::new(action))
    }

    /// Queue a ready item with a trace label.
    fn submit_labelled<F>(&mut self, class: WorkClass, label: impl Into<String>, action: F) -> WorkItemId
    where
        F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
    {
        self.submit_ready(class, Some(label.into()), Box::new(action))
    }

    /// Queue a timer with a trace label.
    ///
    /// # Errors
    /// See [`Submit::submit_delayed`].
    fn submit_timer_labelled<F>(
        &mut self,
        label: impl Into<String>,
        delay: i64,
        action: F,
    ) -> Result<WorkItemId, SchedulerError>
    where
        F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
    {
        self.submit_delayed(Some(label.into()), delay, Box::new(action))
    }
}
