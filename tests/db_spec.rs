use habitsync::db::Database;
use habitsync::models::*;
use speculate2::speculate;
use uuid::Uuid;

/// Rewrites one column of a stored habit behind the store's back, the way an
/// older or foreign writer could leave it.
fn overwrite_label(path: &std::path::Path, id: Uuid, column: &str, value: &str) {
    let conn = rusqlite::Connection::open(path).expect("Failed to open raw connection");
    conn.execute(
        &format!("UPDATE habits SET {} = ? WHERE id = ?", column),
        (value, id.to_string()),
    )
    .expect("Raw update failed");
}

fn habit_input(name: &str, frequency: Frequency, total: u32, done: u32) -> HabitInput {
    HabitInput {
        name: name.to_string(),
        description: format!("{} description", name),
        frequency,
        category: Category::Health,
        total_streak: total,
        completed_streak: done,
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.configure().expect("Failed to configure store");
    }

    describe "configure" {
        it "can be called repeatedly" {
            db.configure().expect("Second configure failed");
            db.clone().configure().expect("Configure through a clone failed");
        }
    }

    describe "insert_habit" {
        it "stores every field and assigns an id" {
            let habit = db.insert_habit(HabitInput {
                name: "Reading".to_string(),
                description: "Read 20 pages of a book every night".to_string(),
                frequency: Frequency::Weekly,
                category: Category::PersonalGrowth,
                total_streak: 15,
                completed_streak: 7,
            }).expect("Failed to insert");

            assert!(!habit.id.is_nil());
            let found = db.get_habit(habit.id).expect("Query failed").expect("Habit missing");
            assert_eq!(found.name, "Reading");
            assert_eq!(found.description, "Read 20 pages of a book every night");
            assert_eq!(found.frequency, Frequency::Weekly);
            assert_eq!(found.category, Category::PersonalGrowth);
            assert_eq!(found.total_streak, 15);
            assert_eq!(found.completed_streak, 7);
        }

        it "marks a habit complete when progress reaches the target" {
            let done = db.insert_habit(habit_input("Exercise", Frequency::Daily, 5, 5)).expect("Failed");
            let pending = db.insert_habit(habit_input("Meditation", Frequency::Daily, 5, 2)).expect("Failed");

            assert!(done.completed);
            assert!(!pending.completed);

            assert!(db.get_habit(done.id).unwrap().unwrap().completed);
            assert!(!db.get_habit(pending.id).unwrap().unwrap().completed);
        }

        it "gives every habit a distinct id" {
            let a = db.insert_habit(habit_input("Same", Frequency::Daily, 1, 0)).expect("Failed");
            let b = db.insert_habit(habit_input("Same", Frequency::Daily, 1, 0)).expect("Failed");
            assert_ne!(a.id, b.id);
        }
    }

    describe "get_all_habits" {
        it "returns an empty list for an empty store" {
            assert!(db.get_all_habits().expect("Query failed").is_empty());
        }

        it "returns habits in insertion order" {
            for name in ["Reading", "Exercise", "Sunday Meal Prep", "Meditation"] {
                db.insert_habit(habit_input(name, Frequency::Daily, 1, 0)).expect("Failed");
            }

            let names: Vec<String> = db.get_all_habits().expect("Query failed")
                .into_iter().map(|h| h.name).collect();
            assert_eq!(names, vec!["Reading", "Exercise", "Sunday Meal Prep", "Meditation"]);
        }
    }

    describe "get_habits_by_frequency" {
        it "returns only habits with that frequency" {
            db.insert_habit(habit_input("Exercise", Frequency::Daily, 10, 7)).expect("Failed");
            db.insert_habit(habit_input("Reading", Frequency::Weekly, 15, 7)).expect("Failed");
            db.insert_habit(habit_input("Meditation", Frequency::Daily, 20, 7)).expect("Failed");

            let daily = db.get_habits_by_frequency(Frequency::Daily).expect("Query failed");
            assert_eq!(daily.len(), 2);
            assert!(daily.iter().all(|h| h.frequency == Frequency::Daily));

            let weekly = db.get_habits_by_frequency(Frequency::Weekly).expect("Query failed");
            assert_eq!(weekly.len(), 1);
            assert_eq!(weekly[0].name, "Reading");
        }
    }

    describe "update_habit" {
        it "overwrites every editable field and recomputes completion" {
            let habit = db.insert_habit(habit_input("Exercise", Frequency::Daily, 10, 7)).expect("Failed");
            assert!(!habit.completed);

            let matched = db.update_habit(habit.id, HabitInput {
                name: "Morning Run".to_string(),
                description: "5k".to_string(),
                frequency: Frequency::Weekly,
                category: Category::Finance,
                total_streak: 10,
                completed_streak: 10,
            }).expect("Update failed");
            assert!(matched);

            let updated = db.get_habit(habit.id).unwrap().unwrap();
            assert_eq!(updated.name, "Morning Run");
            assert_eq!(updated.description, "5k");
            assert_eq!(updated.frequency, Frequency::Weekly);
            assert_eq!(updated.category, Category::Finance);
            assert!(updated.completed);
            assert_eq!(updated.created_at, habit.created_at);
        }

        it "reports no match for an unknown id" {
            let matched = db.update_habit(Uuid::new_v4(), habit_input("Ghost", Frequency::Daily, 1, 1))
                .expect("Update failed");
            assert!(!matched);
            assert!(db.get_all_habits().unwrap().is_empty());
        }
    }

    describe "delete_habit" {
        it "removes only the matching habit" {
            let keep = db.insert_habit(habit_input("Keep", Frequency::Daily, 1, 0)).expect("Failed");
            let gone = db.insert_habit(habit_input("Gone", Frequency::Daily, 1, 0)).expect("Failed");

            assert!(db.delete_habit(gone.id).expect("Delete failed"));

            let remaining = db.get_all_habits().unwrap();
            assert_eq!(remaining.len(), 1);
            assert_eq!(remaining[0].id, keep.id);
        }

        it "is a no-op for an unknown id" {
            db.insert_habit(habit_input("Keep", Frequency::Daily, 1, 0)).expect("Failed");
            assert!(!db.delete_habit(Uuid::new_v4()).expect("Delete failed"));
            assert_eq!(db.get_all_habits().unwrap().len(), 1);
        }
    }

    describe "subscribe_changes" {
        it "advances on writes that change the store" {
            let mut changes = db.subscribe_changes();
            let start = *changes.borrow_and_update();

            let habit = db.insert_habit(habit_input("Exercise", Frequency::Daily, 1, 0)).expect("Failed");
            assert!(changes.has_changed().unwrap());
            assert_eq!(*changes.borrow_and_update(), start + 1);

            db.delete_habit(habit.id).expect("Delete failed");
            assert_eq!(*changes.borrow_and_update(), start + 2);
        }

        it "stays put on writes that match nothing" {
            let mut changes = db.subscribe_changes();
            changes.borrow_and_update();

            db.delete_habit(Uuid::new_v4()).expect("Delete failed");
            db.update_habit(Uuid::new_v4(), habit_input("Ghost", Frequency::Daily, 1, 1)).expect("Update failed");

            assert!(!changes.has_changed().unwrap());
        }
    }

    describe "open" {
        it "persists habits across handles on disk" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("store").join("habits.db");

            let first = Database::open(path.clone()).expect("Open failed");
            first.configure().expect("Configure failed");
            let habit = first.insert_habit(habit_input("Reading", Frequency::Weekly, 3, 1)).expect("Failed");
            drop(first);

            let second = Database::open(path).expect("Reopen failed");
            second.configure().expect("Configure failed");
            let found = second.get_habit(habit.id).expect("Query failed");
            assert_eq!(found.map(|h| h.name), Some("Reading".to_string()));
        }
    }

    describe "stored labels" {
        it "reads an unknown category as Others" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("habits.db");
            let db = Database::open(path.clone()).expect("Open failed");
            db.configure().expect("Configure failed");
            let habit = db.insert_habit(habit_input("Reading", Frequency::Weekly, 3, 1)).expect("Failed");

            overwrite_label(&path, habit.id, "category", "Gardening");

            let found = db.get_habit(habit.id).expect("Query failed").expect("Habit missing");
            assert_eq!(found.category, Category::Others);
            assert_eq!(db.get_habits_by_frequency(Frequency::Weekly).expect("Query failed").len(), 1);
        }

        it "rejects an unknown frequency instead of guessing one" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("habits.db");
            let db = Database::open(path.clone()).expect("Open failed");
            db.configure().expect("Configure failed");
            let habit = db.insert_habit(habit_input("Stretch", Frequency::Daily, 3, 1)).expect("Failed");

            overwrite_label(&path, habit.id, "frequency", "Monthly");

            let err = db.get_all_habits().expect_err("Unknown frequency should not read");
            assert!(format!("{:#}", err).contains("Monthly"));
            assert!(db.get_habit(habit.id).is_err());
            assert!(db.get_habits_by_frequency(Frequency::Daily).expect("Query failed").is_empty());
        }
    }
}
