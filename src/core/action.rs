//! Work item actions.

use super::{AppResult, Context};

/// A unit of work executed exactly once by the scheduler.
///
/// Actions receive the scheduler [`Context`] so they can submit successor items
/// or withdraw pending ones. Returning `Err` (or panicking) records an
/// `ActionFailure` against the item; the drain continues either way.
///
/// Any `FnOnce(&mut Context<'_>) -> AppResult<()>` closure is an action:
///
/// ```rust
/// use prometheus_event_loop::core::{Scheduler, Submit};
///
/// let mut scheduler = Scheduler::new();
/// scheduler.submit_microtask(|cx| {
///     cx.submit_immediate(|_| Ok(()));
///     Ok(())
/// });
/// assert_eq!(scheduler.run().unwrap().executed, 2);
/// ```
pub trait Action: Send + 'static {
    /// Consume the action and run it.
    fn call(self: Box<Self>, cx: &mut Context<'_>) -> AppResult<()>;
}

impl<F> Action for F
where
    F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
{
    fn call(self: Box<Self>, cx: &mut Context<'_>) -> AppResult<()> {
        (*self)(cx)
    }
}

#[cfg(test)]
pub(crate) fn noop() -> Box<dyn Action> {
    Box::new(|_: &mut Context<'_>| -> AppResult<()> { Ok(()) })
}
