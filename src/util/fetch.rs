//! Page fetch state and component-scoped cancellation.
//!
//! DESIGN
//! ======
//! Each page builds a [`CancelScope`] with [`use_cancel_scope`]; the scope is
//! cancelled in `on_cleanup`, which aborts every fetch started through it. A
//! fetch that resolves after cleanup yields `None` and its result is dropped
//! instead of being written into signals that belong to a dead view.
//!
//! Pages that refetch when a route parameter changes also hold a
//! [`FetchGeneration`]: only the most recently started fetch may write its
//! result, so a slow response for a previous parameter cannot land last.

#[cfg(test)]
#[path = "fetch_test.rs"]
mod fetch_test;

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{AbortHandle, abortable};
use leptos::prelude::*;

use crate::net::error::ClientError;

#[derive(Clone, Debug, PartialEq)]
pub enum FetchState<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> FetchState<T> {
    /// Failures carry the user-facing message.
    #[must_use]
    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => {
                log::warn!("fetch failed: {err}");
                Self::Failed(err.user_message())
            }
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancelScope {
    cancelled: Arc<AtomicBool>,
    next_task: Arc<AtomicU64>,
    handles: Arc<Mutex<Vec<(u64, AbortHandle)>>>,
}

impl CancelScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Abort every task started through this scope. Idempotent.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::Relaxed) {
            return;
        }
        if let Ok(mut handles) = self.handles.lock() {
            for (_, handle) in handles.drain(..) {
                handle.abort();
            }
        }
    }

    /// Tasks started through this scope that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.handles.lock().map_or(0, |handles| handles.len())
    }

    /// Run `task` unless the scope is cancelled first. Returns `None` when
    /// the result must be discarded.
    pub async fn run<F: Future>(&self, task: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        let id = self.next_task.fetch_add(1, Ordering::Relaxed);
        let (task, handle) = abortable(task);
        if let Ok(mut handles) = self.handles.lock() {
            handles.push((id, handle));
        }
        let outcome = task.await;
        if let Ok(mut handles) = self.handles.lock() {
            handles.retain(|(task_id, _)| *task_id != id);
        }
        match outcome {
            Ok(output) if !self.is_cancelled() => Some(output),
            _ => {
                log::debug!("discarding fetch result after view cleanup");
                None
            }
        }
    }
}

/// Latest-wins ticketing for fetches restarted by a reactive effect.
#[derive(Clone, Debug, Default)]
pub struct FetchGeneration {
    current: Arc<AtomicU64>,
}

impl FetchGeneration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation when called and wrap `task`. The wrapped
    /// future yields `None` if another generation started while `task` ran.
    pub fn run<F: Future>(&self, task: F) -> impl Future<Output = Option<F::Output>> + use<F> {
        let ticket = self.current.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let current = Arc::clone(&self.current);
        async move {
            let output = task.await;
            if current.load(Ordering::Relaxed) == ticket {
                Some(output)
            } else {
                log::debug!("discarding superseded fetch result");
                None
            }
        }
    }
}

/// A scope cancelled when the current reactive owner is cleaned up.
pub fn use_cancel_scope() -> CancelScope {
    let scope = CancelScope::new();
    let on_drop = scope.clone();
    on_cleanup(move || on_drop.cancel());
    scope
}

/// Run `task` on the local executor and store its outcome in `state`,
/// unless `scope` is cancelled first.
pub fn spawn_fetch<T, F>(scope: &CancelScope, state: RwSignal<FetchState<T>>, task: F)
where
    T: Send + Sync + 'static,
    F: Future<Output = Result<T, ClientError>> + 'static,
{
    let scope = scope.clone();
    state.set(FetchState::Loading);
    leptos::task::spawn_local(async move {
        if let Some(result) = scope.run(task).await {
            state.set(FetchState::from_result(result));
        }
    });
}

/// [`spawn_fetch`] for effects that rerun on route changes: results from a
/// superseded run are dropped.
pub fn spawn_latest_fetch<T, F>(
    scope: &CancelScope,
    generation: &FetchGeneration,
    state: RwSignal<FetchState<T>>,
    task: F,
) where
    T: Send + Sync + 'static,
    F: Future<Output = Result<T, ClientError>> + 'static,
{
    let scope = scope.clone();
    let task = generation.run(task);
    state.set(FetchState::Loading);
    leptos::task::spawn_local(async move {
        if let Some(Some(result)) = scope.run(task).await {
            state.set(FetchState::from_result(result));
        }
    });
}
