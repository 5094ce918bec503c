//! Controllers that sit between a UI and the [`crate::repository::HabitRepository`].
//!
//! Each controller owns one [`ViewState`], published through a
//! `tokio::sync::watch` channel, and runs every operation as a task tied to
//! its own lifetime: dropping a controller aborts whatever it still has in
//! flight.
//!
//! Operations return the spawned task's `JoinHandle`. A UI can ignore it and
//! just observe the state; tests and the CLI await it.

mod detail;
mod edit;
mod list;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

use crate::error::RepositoryError;
use crate::models::ViewState;
use crate::repository::{self, HabitStream};

pub use detail::HabitDetailController;
pub use edit::HabitEditController;
pub use list::HabitListController;

/// Tasks owned by a controller. Dropping the scope aborts all of them.
#[derive(Default)]
pub(crate) struct TaskScope {
    handles: Mutex<Vec<AbortHandle>>,
}

impl TaskScope {
    pub(crate) fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = tokio::spawn(future);
        let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        handles.retain(|h| !h.is_finished());
        handles.push(handle.abort_handle());
        handle
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        let handles = self.handles.get_mut().unwrap_or_else(PoisonError::into_inner);
        for handle in handles.drain(..) {
            handle.abort();
        }
    }
}

/// A controller's published state plus a request counter.
///
/// Every load takes a ticket; only the newest ticket may publish its result,
/// so a slow earlier request never overwrites a later one.
pub(crate) struct ViewStateCell {
    sender: watch::Sender<ViewState>,
    latest: AtomicU64,
}

impl ViewStateCell {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(ViewState::default());
        Self {
            sender,
            latest: AtomicU64::new(0),
        }
    }

    pub(crate) fn current(&self) -> ViewState {
        self.sender.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.sender.subscribe()
    }

    pub(crate) fn replace(&self, state: ViewState) {
        self.sender.send_replace(state);
    }

    pub(crate) fn next_ticket(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Starts a load: takes a ticket and shows `Loading` over the current habits.
    pub(crate) fn begin(&self) -> u64 {
        let ticket = self.next_ticket();
        let habits = self.sender.borrow().habits.clone();
        self.replace(ViewState::loading(habits));
        ticket
    }

    /// Publishes `state` at once and marks every load still in flight as
    /// stale, so none of them can overwrite it.
    pub(crate) fn publish(&self, state: ViewState) {
        let ticket = self.next_ticket();
        self.finish(ticket, state);
    }

    /// Publishes `state` if no newer load has started since `ticket`.
    pub(crate) fn finish(&self, ticket: u64, state: ViewState) -> bool {
        if self.latest.load(Ordering::SeqCst) != ticket {
            tracing::debug!("Dropping stale result for request {}", ticket);
            return false;
        }
        self.replace(state);
        true
    }
}

/// How a controller reads an empty query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotFoundPolicy {
    /// Empty means failure, reported with the error's message.
    Fail,
    /// Empty is a legitimate answer: success with no habits.
    Empty,
}

/// Converts one query result into the view state it should produce.
pub(crate) fn state_for(
    result: repository::HabitResult,
    policy: NotFoundPolicy,
    default_message: &str,
) -> ViewState {
    match result {
        Ok(habits) => ViewState::success(habits),
        Err(RepositoryError::NotFound) if policy == NotFoundPolicy::Empty => {
            ViewState::success(Vec::new())
        }
        Err(e) => {
            let message = e.message().unwrap_or_else(|| default_message.to_string());
            tracing::warn!("Habit query failed: {}", message);
            ViewState::failed(message)
        }
    }
}

/// Awaits the first emission of `stream` and publishes it under `ticket`.
pub(crate) async fn load_first(
    cell: &ViewStateCell,
    ticket: u64,
    stream: HabitStream,
    policy: NotFoundPolicy,
    default_message: &str,
) {
    let result = repository::first(stream).await;
    cell.finish(ticket, state_for(result, policy, default_message));
}
