//! Promise-like values settled by one work item and observed by others.
//!
//! Continuations never run synchronously: settling a [`Deferred`] (or
//! chaining onto one that is already settled) queues each continuation as a
//! microtask. An I/O completion that resolves a deferred therefore has its
//! continuations run in the microtask drain directly after it.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{Context, Submit};

/// Settled value of a [`Deferred`]. Rejections carry a rendered message.
pub type Settled<T> = Result<T, String>;

type Continuation<T> = Box<dyn FnOnce(&mut Context<'_>, Settled<T>) + Send>;

enum DeferredState<T> {
    Pending(Vec<Continuation<T>>),
    Settled(Settled<T>),
}

/// One-shot settled-later value shared between work items.
pub struct Deferred<T> {
    state: Arc<Mutex<DeferredState<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for Deferred<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deferred<T>
where
    T: Clone + Send + 'static,
{
    /// Create a pending deferred.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DeferredState::Pending(Vec::new()))),
        }
    }

    /// Create a deferred that is already resolved.
    pub fn resolved(value: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeferredState::Settled(Ok(value)))),
        }
    }

    /// Whether the deferred has been resolved or rejected.
    pub fn is_settled(&self) -> bool {
        matches!(*self.state.lock(), DeferredState::Settled(_))
    }

    /// The settled value, if any.
    pub fn peek(&self) -> Option<Settled<T>> {
        match &*self.state.lock() {
            DeferredState::Settled(outcome) => Some(outcome.clone()),
            DeferredState::Pending(_) => None,
        }
    }

    /// Resolve with `value`. Returns `false` if already settled.
    pub fn resolve<S: Submit>(&self, sx: &mut S, value: T) -> bool {
        self.settle(sx, Ok(value))
    }

    /// Reject with `error`. Returns `false` if already settled.
    pub fn reject<S: Submit>(&self, sx: &mut S, error: impl std::fmt::Display) -> bool {
        self.settle(sx, Err(error.to_string()))
    }

    fn settle<S: Submit>(&self, sx: &mut S, outcome: Settled<T>) -> bool {
        let waiters = {
            let mut state = self.state.lock();
            let DeferredState::Pending(waiters) = &mut *state else {
                return false;
            };
            let waiters = std::mem::take(waiters);
            *state = DeferredState::Settled(outcome.clone());
            waiters
        };
        for waiter in waiters {
            schedule(sx, waiter, outcome.clone());
        }
        true
    }

    /// Register a continuation and return a deferred settled by its result.
    ///
    /// `Err` from `f` rejects the returned deferred, which is how a `catch`
    /// further down the chain observes it.
    pub fn then<U, S, F>(&self, sx: &mut S, f: F) -> Deferred<U>
    where
        U: Clone + Send + 'static,
        S: Submit,
        F: FnOnce(&mut Context<'_>, Settled<T>) -> Settled<U> + Send + 'static,
    {
        let next = Deferred::<U>::new();
        let downstream = next.clone();
        let continuation: Continuation<T> = Box::new(move |cx, outcome| {
            match f(cx, outcome) {
                Ok(value) => downstream.resolve(cx, value),
                Err(error) => downstream.reject(cx, error),
            };
        });

        let ready = {
            let mut state = self.state.lock();
            match &mut *state {
                DeferredState::Pending(waiters) => {
                    waiters.push(continuation);
                    None
                }
                DeferredState::Settled(outcome) => Some((continuation, outcome.clone())),
            }
        };
        if let Some((continuation, outcome)) = ready {
            schedule(sx, continuation, outcome);
        }
        next
    }

    /// Register a handler that only sees rejections; values pass through.
    pub fn catch<S, F>(&self, sx: &mut S, f: F) -> Self
    where
        S: Submit,
        F: FnOnce(&mut Context<'_>, String) -> Settled<T> + Send + 'static,
    {
        self.then(sx, move |cx, outcome| match outcome {
            Ok(value) => Ok(value),
            Err(error) => f(cx, error),
        })
    }
}

fn schedule<T, S>(sx: &mut S, continuation: Continuation<T>, outcome: Settled<T>)
where
    T: Send + 'static,
    S: Submit,
{
    sx.submit_microtask(move |cx| {
        continuation(cx, outcome);
        Ok(())
    });
}
