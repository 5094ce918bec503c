use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::detail::lookup;
use super::{TaskScope, ViewStateCell};
use crate::error::RepositoryError;
use crate::models::{Habit, HabitInput, ViewState};
use crate::repository::HabitRepository;

const ADD_FAILED: &str = "Failed to add habit";
const UPDATE_FAILED: &str = "Failed to update habit";

/// Backs the add/edit form.
///
/// Successful writes leave the view state alone; observers see them through
/// their own list or detail queries. Failed writes are published as a
/// `Failed` view state and also returned through the task's handle.
pub struct HabitEditController<R: HabitRepository> {
    repository: Arc<R>,
    state: Arc<ViewStateCell>,
    scope: TaskScope,
}

impl<R: HabitRepository> HabitEditController<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            state: Arc::new(ViewStateCell::new()),
            scope: TaskScope::default(),
        }
    }

    pub fn state(&self) -> ViewState {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Loads the habit being edited. Same contract as the detail lookup.
    pub fn get_by_id(&self, id: Option<Uuid>) -> Option<JoinHandle<()>> {
        let id = id?;
        Some(lookup(&self.repository, &self.state, &self.scope, id))
    }

    pub fn add(&self, habit: HabitInput) -> JoinHandle<Result<Habit, RepositoryError>> {
        let repository = self.repository.clone();
        let state = self.state.clone();
        tracing::debug!(
            "Adding habit {} (completed: {})",
            habit.name,
            habit.is_complete()
        );

        self.scope.spawn(async move {
            let result = repository.add(habit).await;
            if let Err(e) = &result {
                publish_failure(&state, e, ADD_FAILED);
            }
            result
        })
    }

    pub fn update(&self, habit: HabitInput, id: Uuid) -> JoinHandle<Result<(), RepositoryError>> {
        let repository = self.repository.clone();
        let state = self.state.clone();
        tracing::debug!(
            "Updating habit {} (completed: {})",
            id,
            habit.is_complete()
        );

        self.scope.spawn(async move {
            let result = repository.update(habit, id).await;
            if let Err(e) = &result {
                publish_failure(&state, e, UPDATE_FAILED);
            }
            result
        })
    }
}

fn publish_failure(state: &ViewStateCell, error: &RepositoryError, default_message: &str) {
    let message = error
        .message()
        .unwrap_or_else(|| default_message.to_string());
    tracing::warn!("{}: {}", default_message, message);
    state.publish(ViewState::failed(message));
}
