use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RepositoryError;

/// A user-defined recurring goal with streak progress.
///
/// `completed` is written together with the streak counters on every create
/// or update and is never recomputed on read. A record whose `total_streak`
/// was changed without resupplying `completed_streak` keeps whatever
/// `completed` value the last full write produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub frequency: Frequency,
    pub category: Category,
    /// Number of periods that make up the goal.
    pub total_streak: u32,
    /// Number of periods completed so far.
    pub completed_streak: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How often a habit is meant to be performed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    pub const ALL: [Frequency; 2] = [Self::Daily, Self::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Daily" => Some(Self::Daily),
            "Weekly" => Some(Self::Weekly),
            _ => None,
        }
    }
}

/// The category a habit is filed under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Health,
    Productivity,
    #[serde(rename = "Personal Growth")]
    PersonalGrowth,
    Finance,
    Creativity,
    Others,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::Health,
        Self::Productivity,
        Self::PersonalGrowth,
        Self::Finance,
        Self::Creativity,
        Self::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::Productivity => "Productivity",
            Self::PersonalGrowth => "Personal Growth",
            Self::Finance => "Finance",
            Self::Creativity => "Creativity",
            Self::Others => "Others",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Health" => Some(Self::Health),
            "Productivity" => Some(Self::Productivity),
            "Personal Growth" => Some(Self::PersonalGrowth),
            "Finance" => Some(Self::Finance),
            "Creativity" => Some(Self::Creativity),
            "Others" => Some(Self::Others),
            _ => None,
        }
    }
}

/// Write payload for creating or overwriting a habit.
///
/// Carries every user-editable field; the store assigns the id and timestamps
/// and derives `completed` from the streak counters at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitInput {
    pub name: String,
    pub description: String,
    pub frequency: Frequency,
    pub category: Category,
    pub total_streak: u32,
    pub completed_streak: u32,
}

impl HabitInput {
    /// A habit is complete once its progress reaches the target. Equality counts.
    pub fn is_complete(&self) -> bool {
        self.completed_streak >= self.total_streak
    }

    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.name.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "Habit name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<&Habit> for HabitInput {
    fn from(habit: &Habit) -> Self {
        Self {
            name: habit.name.clone(),
            description: habit.description.clone(),
            frequency: habit.frequency,
            category: habit.category,
            total_streak: habit.total_streak,
            completed_streak: habit.completed_streak,
        }
    }
}
