use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{load_first, NotFoundPolicy, TaskScope, ViewStateCell};
use crate::models::ViewState;
use crate::repository::HabitRepository;

pub(crate) const LOOKUP_FAILED: &str = "Failed to fetch habit";

/// Loads a single habit for display.
pub struct HabitDetailController<R: HabitRepository> {
    repository: Arc<R>,
    state: Arc<ViewStateCell>,
    scope: TaskScope,
}

impl<R: HabitRepository> HabitDetailController<R> {
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

    /// Loads the habit with `id` into the view state.
    ///
    /// A missing id does nothing and returns `None`. A habit that no longer
    /// exists yields a successful, empty state.
    pub fn get_by_id(&self, id: Option<Uuid>) -> Option<JoinHandle<()>> {
        let id = id?;
        Some(lookup(&self.repository, &self.state, &self.scope, id))
    }
}

/// Shared by the detail and edit controllers.
pub(crate) fn lookup<R: HabitRepository>(
    repository: &Arc<R>,
    state: &Arc<ViewStateCell>,
    scope: &TaskScope,
    id: Uuid,
) -> JoinHandle<()> {
    let state = state.clone();
    let stream = repository.get_by_id(id);
    let ticket = state.begin();
    tracing::debug!("Looking up habit {} (request {})", id, ticket);

    scope.spawn(async move {
        load_first(&state, ticket, stream, NotFoundPolicy::Empty, LOOKUP_FAILED).await;
    })
}
