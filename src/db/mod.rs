mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use tokio::sync::watch;
use uuid::Uuid;

use crate::models::*;

const HABIT_COLUMNS: &str = "id, name, description, frequency, category, total_streak, \
     completed_streak, completed, created_at, updated_at";

/// Shared handle to the embedded habit store.
///
/// Cloning is cheap and every clone talks to the same connection. Each write
/// that changes a row bumps a revision counter that live queries watch.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open habit store at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "habitsync")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("habitsync.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            conn: Arc::new(Mutex::new(conn)),
            revision: Arc::new(revision),
        }
    }

    /// Makes sure the schema is in place. Safe to call any number of times,
    /// from any number of clones.
    pub fn configure(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    /// Receiver that observes a new revision after every write that changed
    /// the store.
    pub fn subscribe_changes(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // ============================================================
    // Habit operations
    // ============================================================

    pub fn insert_habit(&self, input: HabitInput) -> Result<Habit> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let completed = input.is_complete();

        {
            let conn = self.lock()?;
            conn.execute(
                "INSERT INTO habits (id, name, description, frequency, category, total_streak,
                                     completed_streak, completed, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    id.to_string(),
                    &input.name,
                    &input.description,
                    input.frequency.as_str(),
                    input.category.as_str(),
                    input.total_streak,
                    input.completed_streak,
                    completed,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ),
            )
            .context("Failed to insert habit")?;
        }
        self.bump_revision();

        Ok(Habit {
            id,
            name: input.name,
            description: input.description,
            frequency: input.frequency,
            category: input.category,
            total_streak: input.total_streak,
            completed_streak: input.completed_streak,
            completed,
            created_at: now,
            updated_at: now,
        })
    }

    /// All habits in insertion order.
    pub fn get_all_habits(&self) -> Result<Vec<Habit>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits ORDER BY rowid"
        ))?;

        let habits = stmt
            .query_map([], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    pub fn get_habit(&self, id: Uuid) -> Result<Option<Habit>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(habit_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_habits_by_frequency(&self, frequency: Frequency) -> Result<Vec<Habit>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE frequency = ? ORDER BY rowid"
        ))?;

        let habits = stmt
            .query_map([frequency.as_str()], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    /// Overwrites every user-editable field of the habit with `id`.
    ///
    /// Returns `false` without touching the store when nothing matches.
    pub fn update_habit(&self, id: Uuid, input: HabitInput) -> Result<bool> {
        let rows = {
            let conn = self.lock()?;
            conn.execute(
                "UPDATE habits SET name = ?, description = ?, frequency = ?, category = ?,
                                   total_streak = ?, completed_streak = ?, completed = ?,
                                   updated_at = ?
                 WHERE id = ?",
                (
                    &input.name,
                    &input.description,
                    input.frequency.as_str(),
                    input.category.as_str(),
                    input.total_streak,
                    input.completed_streak,
                    input.is_complete(),
                    Utc::now().to_rfc3339(),
                    id.to_string(),
                ),
            )
            .context("Failed to update habit")?
        };

        if rows > 0 {
            self.bump_revision();
        }
        Ok(rows > 0)
    }

    pub fn delete_habit(&self, id: Uuid) -> Result<bool> {
        let rows = {
            let conn = self.lock()?;
            conn.execute("DELETE FROM habits WHERE id = ?", [id.to_string()])
                .context("Failed to delete habit")?
        };

        if rows > 0 {
            self.bump_revision();
        }
        Ok(rows > 0)
    }
}

/// Unknown categories read as `Others`. Unknown frequencies are an error:
/// frequency filters match the stored label exactly, so a fallback here would
/// list a habit under a frequency its filter never returns.
fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let frequency_label = row.get::<_, String>(3)?;
    let frequency = Frequency::from_str(&frequency_label).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("Unknown habit frequency: {}", frequency_label).into(),
        )
    })?;
    let created_at = parse_datetime(row.get::<_, String>(8)?);
    Ok(Habit {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        frequency,
        category: Category::from_str(&row.get::<_, String>(4)?).unwrap_or(Category::Others),
        total_streak: row.get(5)?,
        completed_streak: row.get(6)?,
        completed: row.get(7)?,
        created_at,
        updated_at: parse_datetime(row.get::<_, String>(9)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
