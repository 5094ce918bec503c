//! Domain models for habitsync.
//!
//! - [`Habit`]: a recurring goal with streak progress, as stored.
//! - [`HabitInput`]: the payload of a create or update; `completed` is derived
//!   from it at write time.
//! - [`ViewState`]: the snapshot a controller publishes to its observers.

mod habit;
mod view_state;

pub use habit::*;
pub use view_state::*;
