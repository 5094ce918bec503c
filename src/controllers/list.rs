use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{load_first, state_for, NotFoundPolicy, TaskScope, ViewStateCell};
use crate::models::{sort_by_name, FilterType, SortType, ViewState};
use crate::repository::HabitRepository;

const FETCH_FAILED: &str = "Failed to fetch habits";
const FILTER_FAILED: &str = "Failed to filter habits";
const DELETE_FAILED: &str = "Failed to delete habit";

/// Drives the habit list: load, filter, sort, delete.
///
/// A fresh controller starts loading the full list immediately.
pub struct HabitListController<R: HabitRepository> {
    repository: Arc<R>,
    state: Arc<ViewStateCell>,
    scope: TaskScope,
}

impl<R: HabitRepository> HabitListController<R> {
    /// Must be called within a tokio runtime.
    pub fn new(repository: Arc<R>) -> Self {
        let controller = Self {
            repository,
            state: Arc::new(ViewStateCell::new()),
            scope: TaskScope::default(),
        };
        // The UI awaits nothing; the initial load lands in the view state.
        drop(controller.refresh());
        controller
    }

    pub fn state(&self) -> ViewState {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Replaces the list with the store's current contents.
    pub fn refresh(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let stream = self.repository.list();
        let ticket = state.begin();
        tracing::debug!("Refreshing habit list (request {})", ticket);

        self.scope.spawn(async move {
            load_first(&state, ticket, stream, NotFoundPolicy::Fail, FETCH_FAILED).await;
        })
    }

    /// Deletes the habit and reloads the list once the delete has completed.
    pub fn delete(&self, id: Uuid) -> JoinHandle<()> {
        let repository = self.repository.clone();
        let state = self.state.clone();
        tracing::debug!("Deleting habit {}", id);

        self.scope.spawn(async move {
            if let Err(e) = repository.delete(id).await {
                let message = e.message().unwrap_or_else(|| DELETE_FAILED.to_string());
                tracing::warn!("Failed to delete habit {}: {}", id, message);
                state.publish(ViewState::failed(message));
                return;
            }

            let ticket = state.begin();
            load_first(&state, ticket, repository.list(), NotFoundPolicy::Fail, FETCH_FAILED)
                .await;
        })
    }

    /// Replaces the list with the habits matching `kind`.
    pub fn filter(&self, kind: FilterType) -> JoinHandle<()> {
        let state = self.state.clone();
        let stream = self.repository.get_filtered(kind.as_filter());
        let ticket = state.begin();
        tracing::debug!("Filtering habits by {:?} (request {})", kind, ticket);

        self.scope.spawn(async move {
            load_first(&state, ticket, stream, NotFoundPolicy::Fail, FILTER_FAILED).await;
        })
    }

    /// Reorders the habits currently held by name. Touches neither the store
    /// nor any load in flight.
    pub fn sort(&self, direction: SortType) {
        let habits = self.state.current().habits;
        self.state
            .replace(ViewState::success(sort_by_name(habits, direction)));
    }

    /// Mirrors every emission of the full-list subscription into the view
    /// state until the controller is dropped.
    ///
    /// Each emission replaces the list, so a filter or sort applied while
    /// watching holds only until the next write to the store.
    pub fn watch(&self) -> JoinHandle<()> {
        let state = self.state.clone();
        let mut stream = self.repository.list();
        tracing::debug!("Watching habit list");

        self.scope.spawn(async move {
            while let Some(result) = stream.next().await {
                let ticket = state.next_ticket();
                state.finish(ticket, state_for(result, NotFoundPolicy::Fail, FETCH_FAILED));
            }
        })
    }
}
