//! The contract controllers use to reach the habit store.
//!
//! Reads are live queries: each returns a [`HabitStream`] whose first item
//! reflects the store as it is now and whose later items follow every write.
//! An empty result is reported as [`RepositoryError::NotFound`] so callers can
//! decide whether "nothing there" is a failure for them.

mod sqlite;

use std::future::Future;

use futures::stream::BoxStream;
use futures::StreamExt;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{Habit, HabitInput};

pub use sqlite::SqliteHabitRepository;

pub type HabitResult = Result<Vec<Habit>, RepositoryError>;

/// Push-based subscription to a habit query.
pub type HabitStream = BoxStream<'static, HabitResult>;

pub trait HabitRepository: Send + Sync + 'static {
    /// Opens the store if needed. Idempotent.
    fn configure(&self) -> Result<(), RepositoryError>;

    /// Stores a new habit and returns it with its assigned id.
    ///
    /// The stored `completed` flag must be [`HabitInput::is_complete`] for
    /// `habit`; callers never supply it.
    fn add(&self, habit: HabitInput) -> impl Future<Output = Result<Habit, RepositoryError>> + Send;

    fn list(&self) -> HabitStream;

    /// At most one habit, the one with `id`.
    fn get_by_id(&self, id: Uuid) -> HabitStream;

    /// Habits whose frequency equals `filter`, or every habit when `filter` is
    /// [`crate::models::FilterType::ALL_SENTINEL`].
    fn get_filtered(&self, filter: &str) -> HabitStream;

    /// Overwrites the habit with `id`. Missing ids are not an error.
    ///
    /// As with [`HabitRepository::add`], `completed` is re-derived from the
    /// new streaks with [`HabitInput::is_complete`].
    fn update(
        &self,
        habit: HabitInput,
        id: Uuid,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Removes the habit with `id`. Missing ids are not an error.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Waits for the first emission of a subscription and drops the rest.
pub async fn first(mut stream: HabitStream) -> HabitResult {
    stream.next().await.unwrap_or_else(|| {
        Err(RepositoryError::Unexpected(
            "Subscription closed before emitting".to_string(),
        ))
    })
}

/// A stream that emits `result` once and ends.
pub fn once(result: HabitResult) -> HabitStream {
    futures::stream::once(async move { result }).boxed()
}
