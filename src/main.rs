use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use habitsync::config::AppConfig;
use habitsync::controllers::{HabitDetailController, HabitEditController, HabitListController};
use habitsync::db::Database;
use habitsync::error::RepositoryError;
use habitsync::models::*;
use habitsync::repository::{HabitRepository, SqliteHabitRepository};

#[derive(Parser)]
#[command(name = "habitsync")]
#[command(about = "Track habits and streak progress")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Habit store location, overriding the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a habit
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, value_enum, default_value = "daily")]
        frequency: FrequencyArg,
        #[arg(short, long, value_enum, default_value = "others")]
        category: CategoryArg,
        /// Streak target
        #[arg(short, long, default_value = "1")]
        total: u32,
        /// Streak progress so far
        #[arg(long, default_value = "0")]
        completed: u32,
    },
    /// List habits
    List {
        #[arg(short, long, value_enum, default_value = "all")]
        filter: FilterArg,
        #[arg(short, long, value_enum)]
        sort: Option<SortArg>,
    },
    /// Show one habit
    Show { id: Uuid },
    /// Change fields of a habit; omitted fields keep their value
    Edit {
        id: Uuid,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_enum)]
        frequency: Option<FrequencyArg>,
        #[arg(short, long, value_enum)]
        category: Option<CategoryArg>,
        #[arg(short, long)]
        total: Option<u32>,
        #[arg(long)]
        completed: Option<u32>,
    },
    /// Delete a habit
    Delete { id: Uuid },
}

#[derive(Clone, Copy, ValueEnum)]
enum FrequencyArg {
    Daily,
    Weekly,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Daily => Frequency::Daily,
            FrequencyArg::Weekly => Frequency::Weekly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Health,
    Productivity,
    PersonalGrowth,
    Finance,
    Creativity,
    Others,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Health => Category::Health,
            CategoryArg::Productivity => Category::Productivity,
            CategoryArg::PersonalGrowth => Category::PersonalGrowth,
            CategoryArg::Finance => Category::Finance,
            CategoryArg::Creativity => Category::Creativity,
            CategoryArg::Others => Category::Others,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Daily,
    Weekly,
}

impl From<FilterArg> for FilterType {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => FilterType::All,
            FilterArg::Daily => FilterType::Daily,
            FilterArg::Weekly => FilterType::Weekly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortType {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Asc => SortType::Ascending,
            SortArg::Desc => SortType::Descending,
        }
    }
}

/// Initialize tracing on stderr so stdout carries only command output
fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_habit(habit: &Habit) {
    let mark = if habit.completed { "x" } else { " " };
    println!(
        "[{}] {}  {} ({}, {})  {}/{}",
        mark,
        habit.id,
        habit.name,
        habit.frequency.as_str(),
        habit.category.as_str(),
        habit.completed_streak,
        habit.total_streak
    );
    if !habit.description.is_empty() {
        println!("      {}", habit.description);
    }
}

fn ensure_not_failed(state: &ViewState) -> anyhow::Result<()> {
    if state.status == ViewStatus::Failed {
        anyhow::bail!(
            "{}",
            state.message.as_deref().unwrap_or("An error occurred")
        );
    }
    Ok(())
}

/// Prints the habits of a finished view state, or fails with its message.
fn print_state(state: &ViewState) -> anyhow::Result<()> {
    ensure_not_failed(state)?;
    for habit in &state.habits {
        print_habit(habit);
    }
    Ok(())
}

/// The list controller reports an empty store as a failure carrying the
/// not-found message.
fn is_empty_store(state: &ViewState) -> bool {
    state.status == ViewStatus::Failed
        && state.message.as_deref() == Some(RepositoryError::NotFound.to_string().as_str())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref());
    init_tracing(&config.log_filter);

    let db = match cli.db.or(config.database_path.clone()) {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    let repository = Arc::new(SqliteHabitRepository::new(db));
    repository.configure()?;

    match cli.command {
        Commands::Add {
            name,
            description,
            frequency,
            category,
            total,
            completed,
        } => {
            let controller = HabitEditController::new(repository);
            let habit = controller
                .add(HabitInput {
                    name,
                    description,
                    frequency: frequency.into(),
                    category: category.into(),
                    total_streak: total,
                    completed_streak: completed,
                })
                .await??;
            print_habit(&habit);
        }
        Commands::List { filter, sort } => {
            let controller = HabitListController::new(repository);
            controller.filter(filter.into()).await?;

            let state = controller.state();
            if is_empty_store(&state) {
                println!("No habits yet.");
                return Ok(());
            }

            if let Some(direction) = sort.map(SortType::from).or(config.default_sort) {
                controller.sort(direction);
            }
            print_state(&controller.state())?;
        }
        Commands::Show { id } => {
            let controller = HabitDetailController::new(repository);
            if let Some(handle) = controller.get_by_id(Some(id)) {
                handle.await?;
            }

            let state = controller.state();
            if state.status == ViewStatus::Success && state.habits.is_empty() {
                anyhow::bail!("Habit {} not found", id);
            }
            print_state(&state)?;
        }
        Commands::Edit {
            id,
            name,
            description,
            frequency,
            category,
            total,
            completed,
        } => {
            let controller = HabitEditController::new(repository);
            if let Some(handle) = controller.get_by_id(Some(id)) {
                handle.await?;
            }

            let state = controller.state();
            ensure_not_failed(&state)?;
            let existing = state
                .habits
                .first()
                .ok_or_else(|| anyhow::anyhow!("Habit {} not found", id))?;

            let mut input = HabitInput::from(existing);
            if let Some(name) = name {
                input.name = name;
            }
            if let Some(description) = description {
                input.description = description;
            }
            if let Some(frequency) = frequency {
                input.frequency = frequency.into();
            }
            if let Some(category) = category {
                input.category = category.into();
            }
            if let Some(total) = total {
                input.total_streak = total;
            }
            if let Some(completed) = completed {
                input.completed_streak = completed;
            }

            controller.update(input, id).await??;

            if let Some(handle) = controller.get_by_id(Some(id)) {
                handle.await?;
            }
            print_state(&controller.state())?;
        }
        Commands::Delete { id } => {
            let controller = HabitListController::new(repository);
            controller.delete(id).await?;

            let state = controller.state();
            if !is_empty_store(&state) {
                ensure_not_failed(&state)?;
            }
            println!("Deleted {}", id);
        }
    }

    Ok(())
}
