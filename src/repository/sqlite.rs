use std::sync::Arc;

use futures::StreamExt;
use uuid::Uuid;

use super::{once, HabitRepository, HabitResult, HabitStream};
use crate::db::Database;
use crate::error::RepositoryError;
use crate::models::{FilterType, Frequency, Habit, HabitInput};

type Query = Arc<dyn Fn(&Database) -> anyhow::Result<Vec<Habit>> + Send + Sync>;

/// [`HabitRepository`] backed by the embedded SQLite store.
///
/// Store calls are blocking and run on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteHabitRepository {
    db: Database,
}

impl SqliteHabitRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || op(&db)).await?;
        result.map_err(RepositoryError::from)
    }

    /// Runs `query` now and again after every store revision.
    fn live_query(&self, query: Query) -> HabitStream {
        let db = self.db.clone();
        let changes = db.subscribe_changes();

        futures::stream::unfold(
            (db, changes, query, true),
            |(db, mut changes, query, first)| async move {
                if !first && changes.changed().await.is_err() {
                    return None;
                }
                changes.borrow_and_update();

                let result = run_query(db.clone(), query.clone()).await;
                Some((result, (db, changes, query, false)))
            },
        )
        .boxed()
    }
}

async fn run_query(db: Database, query: Query) -> HabitResult {
    let habits = tokio::task::spawn_blocking(move || query(&db)).await??;
    if habits.is_empty() {
        Err(RepositoryError::NotFound)
    } else {
        Ok(habits)
    }
}

impl HabitRepository for SqliteHabitRepository {
    fn configure(&self) -> Result<(), RepositoryError> {
        self.db.configure().map_err(RepositoryError::from)
    }

    async fn add(&self, habit: HabitInput) -> Result<Habit, RepositoryError> {
        habit.validate()?;
        let created = self.blocking(move |db| db.insert_habit(habit)).await?;
        tracing::debug!("Added habit {} ({})", created.id, created.name);
        Ok(created)
    }

    fn list(&self) -> HabitStream {
        self.live_query(Arc::new(|db: &Database| db.get_all_habits()))
    }

    fn get_by_id(&self, id: Uuid) -> HabitStream {
        self.live_query(Arc::new(move |db: &Database| -> anyhow::Result<Vec<Habit>> {
            Ok(db.get_habit(id)?.into_iter().collect())
        }))
    }

    fn get_filtered(&self, filter: &str) -> HabitStream {
        if filter == FilterType::ALL_SENTINEL {
            return self.list();
        }
        match Frequency::from_str(filter) {
            Some(frequency) => {
                self.live_query(Arc::new(move |db: &Database| {
                    db.get_habits_by_frequency(frequency)
                }))
            }
            None => once(Err(RepositoryError::Validation(format!(
                "Unknown frequency filter: {}",
                filter
            )))),
        }
    }

    async fn update(&self, habit: HabitInput, id: Uuid) -> Result<(), RepositoryError> {
        habit.validate()?;
        let matched = self.blocking(move |db| db.update_habit(id, habit)).await?;
        if !matched {
            tracing::debug!("Update skipped, no habit with id {}", id);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let removed = self.blocking(move |db| db.delete_habit(id)).await?;
        if !removed {
            tracing::debug!("Delete skipped, no habit with id {}", id);
        }
        Ok(())
    }
}
