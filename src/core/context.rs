//! Handle passed to a running action.

use super::scheduler::LoopCore;
use super::{Action, SchedulerError, Submit};
use crate::util::serde::{LogicalTime, WorkClass, WorkItemId};

/// Re-entrant submission handle for the action currently executing.
///
/// Immediate items submitted here run right after the current action
/// returns, ahead of previously queued immediate work.
pub struct Context<'a> {
    core: &'a mut LoopCore,
    current: WorkItemId,
    class: WorkClass,
}

impl<'a> Context<'a> {
    pub(crate) fn new(core: &'a mut LoopCore, current: WorkItemId, class: WorkClass) -> Self {
        Self {
            core,
            current,
            class,
        }
    }

    /// Id of the running item.
    pub const fn current(&self) -> WorkItemId {
        self.current
    }

    /// Class of the running item.
    pub const fn current_class(&self) -> WorkClass {
        self.class
    }
}

impl Submit for Context<'_> {
    fn submit_ready(
        &mut self,
        class: WorkClass,
        label: Option<String>,
        action: Box<dyn Action>,
    ) -> WorkItemId {
        self.core.submit_ready(class, label, action, true)
    }

    fn submit_delayed(
        &mut self,
        label: Option<String>,
        delay: i64,
        action: Box<dyn Action>,
    ) -> Result<WorkItemId, SchedulerError> {
        self.core.submit_delayed(label, delay, action)
    }

    fn withdraw(&mut self, id: WorkItemId) -> Result<(), SchedulerError> {
        let result = self.core.withdraw(id);
        if let Err(SchedulerError::UnknownWorkItem(_)) = &result {
            tracing::warn!(item = %id, by = %self.current, "withdrawal of unknown work item");
            self.core.unknown_withdrawals.push(id);
        }
        result
    }

    fn now(&self) -> LogicalTime {
        self.core.clock.now()
    }
}
