use serde::{Deserialize, Serialize};

use super::{Frequency, Habit};

/// Lifecycle of a controller's data.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewStatus {
    #[default]
    Initial,
    Loading,
    Success,
    Failed,
}

/// Immutable snapshot of what a controller currently shows.
///
/// Controllers replace the whole value on every change; `message` is only
/// ever set alongside [`ViewStatus::Failed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub status: ViewStatus,
    pub habits: Vec<Habit>,
    pub message: Option<String>,
}

impl ViewState {
    pub fn loading(habits: Vec<Habit>) -> Self {
        Self {
            status: ViewStatus::Loading,
            habits,
            message: None,
        }
    }

    pub fn success(habits: Vec<Habit>) -> Self {
        Self {
            status: ViewStatus::Success,
            habits,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ViewStatus::Failed,
            habits: Vec::new(),
            message: Some(message.into()),
        }
    }
}

/// Frequency filter offered on the habit list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    #[default]
    All,
    Daily,
    Weekly,
}

impl FilterType {
    /// Sentinel understood by the repository as "no frequency filter".
    pub const ALL_SENTINEL: &'static str = "All";

    /// The repository's filter value: the sentinel or a literal frequency.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::All => Self::ALL_SENTINEL,
            Self::Daily => Frequency::Daily.as_str(),
            Self::Weekly => Frequency::Weekly.as_str(),
        }
    }
}

/// Direction for the in-memory name sort.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortType {
    #[default]
    Ascending,
    Descending,
}

/// Orders habits by name using case-sensitive byte-wise comparison.
///
/// The sort is stable, so habits with equal names keep their relative order.
pub fn sort_by_name(mut habits: Vec<Habit>, direction: SortType) -> Vec<Habit> {
    match direction {
        SortType::Ascending => habits.sort_by(|a, b| a.name.cmp(&b.name)),
        SortType::Descending => habits.sort_by(|a, b| b.name.cmp(&a.name)),
    }
    habits
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::Category;

    fn named(name: &str) -> Habit {
        let now = Utc::now();
        Habit {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            frequency: Frequency::Daily,
            category: Category::Others,
            total_streak: 1,
            completed_streak: 0,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn names(habits: &[Habit]) -> Vec<&str> {
        habits.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn default_state_is_initial_and_empty() {
        let state = ViewState::default();
        assert_eq!(state.status, ViewStatus::Initial);
        assert!(state.habits.is_empty());
        assert!(state.message.is_none());
    }

    #[test]
    fn sort_is_case_sensitive() {
        let sorted = sort_by_name(
            vec![named("reading"), named("Reading"), named("Exercise")],
            SortType::Ascending,
        );
        assert_eq!(names(&sorted), vec!["Exercise", "Reading", "reading"]);
    }

    #[test]
    fn descending_is_reverse_of_ascending() {
        let habits = vec![
            named("Reading"),
            named("Sunday Meal Prep"),
            named("Exercise"),
            named("Meditation"),
        ];
        let asc = sort_by_name(habits.clone(), SortType::Ascending);
        let mut desc = sort_by_name(habits, SortType::Descending);
        desc.reverse();
        assert_eq!(names(&asc), names(&desc));
        assert_eq!(
            names(&asc),
            vec!["Exercise", "Meditation", "Reading", "Sunday Meal Prep"]
        );
    }

    #[test]
    fn filter_maps_to_repository_values() {
        assert_eq!(FilterType::All.as_filter(), "All");
        assert_eq!(FilterType::Daily.as_filter(), "Daily");
        assert_eq!(FilterType::Weekly.as_filter(), "Weekly");
    }
}
