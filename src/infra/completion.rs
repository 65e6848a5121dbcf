//! Channel through which external collaborators post I/O completions.
//!
//! Filesystem reads, network requests and database calls are not modeled.
//! Whatever performs them holds a [`CompletionSender`] and posts the callback
//! once the operation is done. The scheduler ingests posted completions at the
//! start of every loop iteration without blocking.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::{Action, AppResult, Context, SchedulerError};

/// A completion callback waiting to be ingested.
pub struct Completion {
    /// Trace label.
    pub label: Option<String>,
    pub(crate) action: Box<dyn Action>,
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Cloneable, thread-safe posting handle.
#[derive(Clone)]
pub struct CompletionSender {
    tx: Sender<Completion>,
}

impl CompletionSender {
    /// Post a completion callback.
    ///
    /// # Errors
    /// `PortClosed` once the owning scheduler has been dropped.
    pub fn post<F>(&self, action: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
    {
        self.send(None, Box::new(action))
    }

    /// Post a completion callback with a trace label.
    ///
    /// # Errors
    /// `PortClosed` once the owning scheduler has been dropped.
    pub fn post_labelled<F>(&self, label: impl Into<String>, action: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&mut Context<'_>) -> AppResult<()> + Send + 'static,
    {
        self.send(Some(label.into()), Box::new(action))
    }

    fn send(&self, label: Option<String>, action: Box<dyn Action>) -> Result<(), SchedulerError> {
        self.tx
            .send(Completion { label, action })
            .map_err(|_| SchedulerError::PortClosed)
    }
}

/// Receiving side owned by the scheduler.
pub struct CompletionPort {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl CompletionPort {
    /// Create an unbounded port.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A new posting handle.
    pub fn sender(&self) -> CompletionSender {
        CompletionSender { tx: self.tx.clone() }
    }

    /// Take every completion posted so far, in posting order.
    pub fn drain(&self) -> Vec<Completion> {
        self.rx.try_iter().collect()
    }

    /// Number of completions posted but not yet ingested.
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }
}

impl Default for CompletionPort {
    fn default() -> Self {
        Self::new()
    }
}
