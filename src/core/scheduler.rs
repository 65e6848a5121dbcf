//! Event-loop scheduler with microtask, timer and I/O-completion phases.
//!
//! Drain protocol for one `run()`:
//!
//! 1. Run queued immediate work in submission order.
//! 2. Drain microtasks to exhaustion, including microtasks queued by
//!    microtasks.
//! 3. Ingest posted completions. If nothing is due, advance the logical clock
//!    to the earliest timer.
//! 4. Run one macrotask phase: due timers in `(ready_at, sequence)` order, then
//!    I/O completions. Each macrotask is followed by a microtask drain.
//! 5. Repeat from 3 until every queue is empty.
//!
//! Immediate work submitted by a running action runs as soon as that action
//! returns.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use super::{build_trace_event, Action, Context, SchedulerError, Submit, TraceSink, WorkItem, WorkQueue};
use crate::config::SchedulerConfig;
use crate::infra::{CompletionPort, CompletionSender, FifoQueue, TimerHeap};
use crate::util::clock::LogicalClock;
use crate::util::serde::{LogicalTime, LoopId, WorkClass, WorkItemId};

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Nothing submitted and never run.
    Idle,
    /// Work is pending or immediate/microtask queues are being drained.
    Draining,
    /// A macrotask phase is being selected or executed.
    Advancing,
    /// The last `run()` emptied every queue, or a violation halted the loop.
    Halted,
}

/// Queue depths per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PendingCounts {
    /// Queued immediate items.
    pub immediate: usize,
    /// Queued microtasks.
    pub microtask: usize,
    /// Queued timers.
    pub timer: usize,
    /// Queued I/O completions, not counting unposted port backlog.
    pub io_completion: usize,
}

impl PendingCounts {
    /// Total pending items.
    pub const fn total(&self) -> usize {
        self.immediate + self.microtask + self.timer + self.io_completion
    }
}

/// Lifetime counters for one scheduler.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerStats {
    /// Items submitted, including ingested completions.
    pub submitted: u64,
    /// Items whose action ran.
    pub executed: u64,
    /// Items whose action failed.
    pub failed: u64,
    /// Items withdrawn before running.
    pub withdrawn: u64,
    /// Macrotask phases executed.
    pub phases: u64,
    /// Currently queued items.
    pub pending: PendingCounts,
    /// Current logical time.
    pub now: LogicalTime,
}

/// Outcome of one `run()`.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Scheduler that produced the report.
    pub loop_id: LoopId,
    /// Items executed during this run.
    pub executed: usize,
    /// Macrotask phases executed during this run.
    pub phases: usize,
    /// Failed actions in execution order.
    pub failures: Vec<(WorkItemId, SchedulerError)>,
    /// Ids that running actions tried to withdraw but were not pending.
    pub unknown_withdrawals: Vec<WorkItemId>,
    /// Logical time when the run started.
    pub started_at: LogicalTime,
    /// Logical time when the run finished.
    pub finished_at: LogicalTime,
}

impl RunReport {
    fn new(loop_id: LoopId, started_at: LogicalTime) -> Self {
        Self {
            loop_id,
            executed: 0,
            phases: 0,
            failures: Vec::new(),
            unknown_withdrawals: Vec::new(),
            started_at,
            finished_at: started_at,
        }
    }

    /// Whether no action failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Ids of failed items in execution order.
    pub fn failed_ids(&self) -> Vec<WorkItemId> {
        self.failures.iter().map(|(id, _)| *id).collect()
    }
}

/// Queues, clock and counters. Borrowed mutably by [`Context`] while an action
/// runs; the executing item itself is never queued here.
pub(crate) struct LoopCore {
    pub(crate) clock: LogicalClock,
    next_id: u64,
    next_sequence: u64,
    immediates: FifoQueue,
    /// Immediate items submitted by the running action.
    nested: Vec<WorkItem>,
    microtasks: FifoQueue,
    timers: TimerHeap,
    io: FifoQueue,
    pending: HashMap<WorkItemId, WorkClass>,
    violation: Option<SchedulerError>,
    pub(crate) unknown_withdrawals: Vec<WorkItemId>,
    submitted: u64,
    withdrawn: u64,
}

impl LoopCore {
    fn new(start: LogicalTime) -> Self {
        Self {
            clock: LogicalClock::starting_at(start),
            next_id: 1,
            next_sequence: 0,
            immediates: FifoQueue::new(),
            nested: Vec::new(),
            microtasks: FifoQueue::new(),
            timers: TimerHeap::new(),
            io: FifoQueue::new(),
            pending: HashMap::new(),
            violation: None,
            unknown_withdrawals: Vec::new(),
            submitted: 0,
            withdrawn: 0,
        }
    }

    fn allocate(
        &mut self,
        class: WorkClass,
        ready_at: LogicalTime,
        label: Option<String>,
        action: Box<dyn Action>,
    ) -> WorkItem {
        let id = WorkItemId(self.next_id);
        self.next_id += 1;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending.insert(id, class);
        self.submitted += 1;
        tracing::trace!(item = %id, %class, ready_at, sequence, "work item submitted");
        WorkItem::new(id, class, ready_at, sequence, label, action)
    }

    pub(crate) fn submit_ready(
        &mut self,
        class: WorkClass,
        label: Option<String>,
        action: Box<dyn Action>,
        nested: bool,
    ) -> WorkItemId {
        let item = self.allocate(class, self.clock.now(), label, action);
        let id = item.id;
        match class {
            WorkClass::Immediate if nested => self.nested.push(item),
            WorkClass::Immediate => self.immediates.push(item),
            WorkClass::Microtask => self.microtasks.push(item),
            WorkClass::Timer => self.timers.push(item),
            WorkClass::IoCompletion => self.io.push(item),
        }
        id
    }

    pub(crate) fn submit_delayed(
        &mut self,
        label: Option<String>,
        delay: i64,
        action: Box<dyn Action>,
    ) -> Result<WorkItemId, SchedulerError> {
        let ready_at = match self.clock.deadline_after(delay) {
            Ok(t) => t,
            Err(e) => {
                self.halt(e.clone());
                return Err(e);
            }
        };
        let item = self.allocate(WorkClass::Timer, ready_at, label, action);
        let id = item.id;
        self.timers.push(item);
        Ok(id)
    }

    pub(crate) fn withdraw(&mut self, id: WorkItemId) -> Result<(), SchedulerError> {
        let Some(class) = self.pending.remove(&id) else {
            return Err(SchedulerError::UnknownWorkItem(id));
        };
        let removed = match class {
            WorkClass::Immediate => match self.nested.iter().position(|item| item.id == id) {
                Some(index) => Some(self.nested.remove(index)),
                None => self.immediates.remove(id),
            },
            WorkClass::Microtask => self.microtasks.remove(id),
            WorkClass::Timer => self.timers.remove(id),
            WorkClass::IoCompletion => self.io.remove(id),
        };
        if removed.is_none() {
            let violation =
                SchedulerError::ScheduleViolation(format!("pending {class} item {id} missing from its queue"));
            self.halt(violation.clone());
            return Err(violation);
        }
        self.withdrawn += 1;
        tracing::debug!(item = %id, %class, "work item withdrawn");
        Ok(())
    }

    fn halt(&mut self, violation: SchedulerError) {
        tracing::error!("{}", violation);
        if self.violation.is_none() {
            self.violation = Some(violation);
        }
    }

    fn check(&self) -> Result<(), SchedulerError> {
        self.violation.clone().map_or(Ok(()), Err)
    }

    fn has_due_macrotask(&self) -> bool {
        !self.io.is_empty()
            || self
                .timers
                .next_ready_at()
                .is_some_and(|t| t <= self.clock.now())
    }

    fn pending_counts(&self) -> PendingCounts {
        PendingCounts {
            immediate: self.immediates.len() + self.nested.len(),
            microtask: self.microtasks.len(),
            timer: self.timers.len(),
            io_completion: self.io.len(),
        }
    }
}

/// Deterministic single-threaded event loop.
///
/// Each instance owns its queues and logical clock; there is no global loop.
///
/// ```rust
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use prometheus_event_loop::core::{Scheduler, Submit};
///
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let mut scheduler = Scheduler::new();
///
/// let l = Arc::clone(&log);
/// scheduler.submit_immediate(move |_| { l.lock().push("start"); Ok(()) });
/// let l = Arc::clone(&log);
/// scheduler.submit_timer(move |_| { l.lock().push("timeout"); Ok(()) }, 0).unwrap();
/// let l = Arc::clone(&log);
/// scheduler.submit_microtask(move |_| { l.lock().push("promise"); Ok(()) });
/// let l = Arc::clone(&log);
/// scheduler.submit_immediate(move |_| { l.lock().push("end"); Ok(()) });
///
/// let report = scheduler.run().unwrap();
/// assert_eq!(report.executed, 4);
/// assert_eq!(*log.lock(), vec!["start", "end", "promise", "timeout"]);
/// ```
pub struct Scheduler {
    loop_id: LoopId,
    core: LoopCore,
    state: SchedulerState,
    max_microtasks_per_drain: usize,
    trace: Option<Box<dyn TraceSink>>,
    port: CompletionPort,
    executed: u64,
    failed: u64,
    phases: u64,
}

impl Scheduler {
    /// Create a scheduler with default configuration.
    pub fn new() -> Self {
        let defaults = SchedulerConfig::default();
        Self::from_parts(defaults.start_time, defaults.max_microtasks_per_drain)
    }

    /// Create a scheduler from validated configuration.
    ///
    /// The config's `trace_capacity` is applied by
    /// [`SchedulerBuilder`](crate::builders::SchedulerBuilder), not here.
    ///
    /// # Errors
    /// `InvalidConfig` if validation fails.
    pub fn with_config(config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self::from_parts(config.start_time, config.max_microtasks_per_drain))
    }

    fn from_parts(start: LogicalTime, max_microtasks_per_drain: usize) -> Self {
        Self {
            loop_id: LoopId::new(),
            core: LoopCore::new(start),
            state: SchedulerState::Idle,
            max_microtasks_per_drain,
            trace: None,
            port: CompletionPort::new(),
            executed: 0,
            failed: 0,
            phases: 0,
        }
    }

    /// Attach a trace sink.
    pub fn with_trace(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Override the generated loop id.
    pub fn with_loop_id(mut self, loop_id: LoopId) -> Self {
        self.loop_id = loop_id;
        self
    }

    /// Identifier carried in spans and trace events.
    pub const fn loop_id(&self) -> LoopId {
        self.loop_id
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Queue depths per class.
    pub fn pending(&self) -> PendingCounts {
        self.core.pending_counts()
    }

    /// Whether nothing is queued and no completion is waiting on the port.
    pub fn is_idle(&self) -> bool {
        self.core.pending.is_empty() && self.port.backlog() == 0
    }

    /// The violation that halted the scheduler, if any.
    pub const fn violation(&self) -> Option<&SchedulerError> {
        self.core.violation.as_ref()
    }

    /// Handle for posting completions from other threads.
    pub fn completion_port(&self) -> CompletionSender {
        self.port.sender()
    }

    /// Snapshot of lifetime counters.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            submitted: self.core.submitted,
            executed: self.executed,
            failed: self.failed,
            withdrawn: self.core.withdrawn,
            phases: self.phases,
            pending: self.core.pending_counts(),
            now: self.core.clock.now(),
        }
    }

    /// Drain every queue to completion.
    ///
    /// Action failures are collected into the report. Running on an empty
    /// scheduler is a no-op returning `executed == 0`.
    ///
    /// # Errors
    /// `ScheduleViolation` if an invariant breach halted the scheduler, now or
    /// during an earlier call.
    pub fn run(&mut self) -> Result<RunReport, SchedulerError> {
        self.core.check()?;

        let span = tracing::info_span!("event_loop_run", loop_id = %self.loop_id);
        let _enter = span.enter();

        let mut report = RunReport::new(self.loop_id, self.core.clock.now());
        self.state = SchedulerState::Draining;
        tracing::info!(pending = self.core.pending.len(), now = report.started_at, "run started");

        let outcome = self.drive(&mut report);
        report.unknown_withdrawals = std::mem::take(&mut self.core.unknown_withdrawals);
        report.finished_at = self.core.clock.now();
        self.state = SchedulerState::Halted;

        match outcome {
            Ok(()) => {
                tracing::info!(
                    executed = report.executed,
                    failed = report.failures.len(),
                    phases = report.phases,
                    now = report.finished_at,
                    "run finished"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(executed = report.executed, "run halted: {}", e);
                Err(e)
            }
        }
    }

    fn drive(&mut self, report: &mut RunReport) -> Result<(), SchedulerError> {
        self.drain_microtasks(report)?;
        loop {
            self.ingest_completions();
            if self.core.timers.is_empty() && self.core.io.is_empty() {
                return Ok(());
            }

            self.state = SchedulerState::Advancing;
            if !self.core.has_due_macrotask() {
                if let Some(next) = self.core.timers.next_ready_at() {
                    tracing::debug!(from = self.core.clock.now(), to = next, "advancing logical clock");
                    if let Err(e) = self.core.clock.advance_to(next) {
                        self.core.halt(e.clone());
                        return Err(e);
                    }
                }
            }
            self.run_phase(report)?;
            self.state = SchedulerState::Draining;
        }
    }

    /// One macrotask phase. Only items submitted before the phase started are
    /// eligible; later ones wait for the next iteration.
    fn run_phase(&mut self, report: &mut RunReport) -> Result<(), SchedulerError> {
        let now = self.core.clock.now();
        let cutoff = self.core.next_sequence;
        report.phases += 1;
        self.phases += 1;
        tracing::debug!(now, cutoff, "macrotask phase");

        while let Some(item) = self.core.timers.pop_due(now, cutoff) {
            self.execute(item, report)?;
            self.drain_microtasks(report)?;
        }
        while let Some(item) = self.core.io.pop_due(now, cutoff) {
            self.execute(item, report)?;
            self.drain_microtasks(report)?;
        }
        Ok(())
    }

    fn drain_immediates(&mut self, report: &mut RunReport) -> Result<(), SchedulerError> {
        while let Some(item) = self.core.immediates.pop_front() {
            self.execute(item, report)?;
        }
        Ok(())
    }

    fn drain_microtasks(&mut self, report: &mut RunReport) -> Result<(), SchedulerError> {
        self.drain_immediates(report)?;
        let mut drained = 0usize;
        while let Some(item) = self.core.microtasks.pop_front() {
            drained += 1;
            if drained > self.max_microtasks_per_drain {
                let violation = SchedulerError::ScheduleViolation(format!(
                    "microtask drain exceeded {} items",
                    self.max_microtasks_per_drain
                ));
                self.core.microtasks.push_front_all(vec![item]);
                self.core.halt(violation.clone());
                return Err(violation);
            }
            self.execute(item, report)?;
            self.drain_immediates(report)?;
        }
        Ok(())
    }

    fn ingest_completions(&mut self) {
        for completion in self.port.drain() {
            let id = self
                .core
                .submit_ready(WorkClass::IoCompletion, completion.label, completion.action, false);
            tracing::debug!(item = %id, "ingested posted completion");
        }
    }

    fn execute(&mut self, item: WorkItem, report: &mut RunReport) -> Result<(), SchedulerError> {
        let WorkItem {
            id,
            class,
            label,
            action,
            ..
        } = item;
        self.core.pending.remove(&id);
        let at = self.core.clock.now();
        tracing::debug!(item = %id, %class, at, label = label.as_deref(), "executing work item");

        let outcome = {
            let mut cx = Context::new(&mut self.core, id, class);
            panic::catch_unwind(AssertUnwindSafe(|| action.call(&mut cx)))
        };
        let nested = std::mem::take(&mut self.core.nested);
        self.core.immediates.push_front_all(nested);

        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(format!("{e:#}")),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        let position = self.executed;
        self.executed += 1;
        report.executed += 1;

        if let Some(sink) = self.trace.as_mut() {
            sink.record(build_trace_event(
                self.loop_id,
                id,
                class,
                label,
                at,
                position,
                failure.as_deref(),
            ));
        }

        if let Some(message) = failure {
            tracing::warn!(item = %id, %class, "action failed: {}", message);
            self.failed += 1;
            report
                .failures
                .push((id, SchedulerError::ActionFailure { id, message }));
        }

        self.core.check()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Submit for Scheduler {
    fn submit_ready(
        &mut self,
        class: WorkClass,
        label: Option<String>,
        action: Box<dyn Action>,
    ) -> WorkItemId {
        self.mark_active();
        self.core.submit_ready(class, label, action, false)
    }

    fn submit_delayed(
        &mut self,
        label: Option<String>,
        delay: i64,
        action: Box<dyn Action>,
    ) -> Result<WorkItemId, SchedulerError> {
        let result = self.core.submit_delayed(label, delay, action);
        if result.is_ok() {
            self.mark_active();
        } else {
            self.state = SchedulerState::Halted;
        }
        result
    }

    fn withdraw(&mut self, id: WorkItemId) -> Result<(), SchedulerError> {
        let result = self.core.withdraw(id);
        if let Err(SchedulerError::UnknownWorkItem(_)) = &result {
            tracing::warn!(item = %id, "withdrawal of unknown work item");
        }
        result
    }

    fn now(&self) -> LogicalTime {
        self.core.clock.now()
    }
}

impl Scheduler {
    fn mark_active(&mut self) {
        if self.core.violation.is_none()
            && matches!(self.state, SchedulerState::Idle | SchedulerState::Halted)
        {
            self.state = SchedulerState::Draining;
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| format!("panicked: {s}"))
        .or_else(|| payload.downcast_ref::<String>().map(|s| format!("panicked: {s}")))
        .unwrap_or_else(|| "panicked".to_string())
}
