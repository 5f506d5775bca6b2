//! Bounded worker pool for independent tasks
//!
//! - Fixed worker count draining a shared queue
//! - Every task runs to completion; all errors are returned
//! - Cancellation stops dispatch and aborts in-flight tasks
//! - [`Results`] collects per-task output keyed by task ID

use crate::error::TaskError;
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A unit of work with a unique ID
pub trait Task {
    /// Key for results and errors
    fn id(&self) -> String;
}

/// Concurrent result collector keyed by task ID
#[derive(Debug)]
pub struct Results<T> {
    inner: DashMap<String, T>,
}

impl<T: Clone> Results<T> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Record the output of a task, replacing any previous value
    pub fn store(&self, id: impl Into<String>, value: T) {
        self.inner.insert(id.into(), value);
    }

    /// Stored value for a task ID
    #[must_use]
    pub fn get(&self, id: &str) -> Option<T> {
        self.inner.get(id).map(|v| v.value().clone())
    }

    /// Stored IDs in sorted order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Consume into `(id, value)` pairs sorted by ID
    #[must_use]
    pub fn into_sorted(self) -> Vec<(String, T)> {
        let mut out: Vec<(String, T)> = self.inner.into_iter().collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl<T: Clone> Default for Results<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `command` over every task with at most `concurrency` in flight.
///
/// Returns one error per failed, cancelled or duplicate task, sorted by
/// task ID. An empty vector means every task succeeded.
pub async fn run_tasks<T, E, F, Fut>(
    tasks: Vec<T>,
    concurrency: usize,
    cancel: &CancellationToken,
    command: F,
) -> Vec<TaskError<E>>
where
    T: Task,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut pending = VecDeque::with_capacity(tasks.len());
    for task in tasks {
        let id = task.id();
        if seen.insert(id.clone()) {
            pending.push_back(task);
        } else {
            errors.push(TaskError::DuplicateId(id));
        }
    }

    let workers = concurrency.max(1).min(pending.len().max(1));
    let queue = Mutex::new(pending);
    let failures = Mutex::new(Vec::new());

    {
        let queue = &queue;
        let failures = &failures;
        let command = &command;
        join_all((0..workers).map(|worker| async move {
            loop {
                if cancel.is_cancelled() {
                    break;
                }
                let Some(task) = queue.lock().pop_front() else {
                    break;
                };
                let id = task.id();
                tracing::trace!(worker, task = %id, "dispatching task");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        failures.lock().push(TaskError::Cancelled(id));
                    }
                    result = command(task) => {
                        if let Err(source) = result {
                            failures.lock().push(TaskError::Failed { id, source });
                        }
                    }
                }
            }
        }))
        .await;
    }

    errors.extend(failures.into_inner());
    errors.extend(
        queue
            .into_inner()
            .into_iter()
            .map(|task| TaskError::Cancelled(task.id())),
    );
    errors.sort_by(|a, b| a.id().cmp(b.id()));
    errors
}
