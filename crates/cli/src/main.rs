#![warn(clippy::pedantic)]

//! Command line front end of the workout progression generator.
//!
//! Usage:
//! ```bash
//! repcoach import-catalog catalog.json
//! repcoach export-catalog > backup.json
//! repcoach onboard --user <UUID> --plan <UUID> --days 1,3,5 --experience 2 --equipment none
//! repcoach change-plan --user <UUID> --plan <UUID> --days 1,3,5
//! repcoach complete --user <UUID> --workout <UUID> --log sets.json
//! repcoach feature-exercise --user <UUID> --workout <UUID> --exercise <UUID> --slot <UUID>
//! repcoach upcoming --user <UUID>
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use log::{LevelFilter, info};
use repcoach_domain::{
    self as domain, ExerciseSelectionService, LogbookService, ScheduleService,
    WorkoutGeneratorService,
};
use repcoach_storage::{CatalogStore, SqliteStore, seed};
use uuid::Uuid;

mod logger;
mod output;
mod settings;

use settings::{DEFAULT_SETTINGS_FILE, Settings};

#[derive(Parser, Debug)]
#[command(
    name = "repcoach",
    about = "Workout progression generator",
    long_about = "Schedules workouts for a member's progression plan and fills the next due workout from skeleton templates"
)]
struct Cli {
    /// Settings file
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Database file, overrides the settings file
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the training catalog with the content of a JSON file
    ImportCatalog { file: PathBuf },
    /// Write the stored training catalog as JSON
    ExportCatalog,
    /// Set up plan, workout days, experience level and equipment of a member
    Onboard {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        plan: Uuid,
        /// Comma separated weekdays, 0 (Sunday) to 6 (Saturday)
        #[arg(long)]
        days: String,
        #[arg(long)]
        experience: u32,
        /// Comma separated equipment ids, `none`, or empty for no restriction
        #[arg(long, default_value = "")]
        equipment: String,
    },
    /// Assign a progression plan and rebuild the schedule
    #[command(alias = "plan-changed")]
    ChangePlan {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        plan: Uuid,
        #[arg(long)]
        days: String,
    },
    /// Change experience level and equipment of a member
    UpdateProfile {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        experience: u32,
        #[arg(long, default_value = "")]
        equipment: String,
    },
    /// Recompute the exercises available to a member
    AssignExercises {
        #[arg(long)]
        user: Uuid,
    },
    /// Lay out empty workouts for the member's workout days
    Rebuild {
        #[arg(long)]
        user: Uuid,
    },
    /// Fill the next due workout
    Materialize {
        #[arg(long)]
        user: Uuid,
    },
    /// Show one workout
    Show {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        workout: Uuid,
    },
    /// List materialized workouts from today on
    Upcoming {
        #[arg(long)]
        user: Uuid,
    },
    /// Record logged sets, complete the workout and fill the next one
    #[command(alias = "workout-completed")]
    Complete {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        workout: Uuid,
        /// JSON file with the logged sets per exercise slot
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Add an exercise to a section of a materialized workout, or put it into one of its slots
    FeatureExercise {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        workout: Uuid,
        #[arg(long)]
        exercise: Uuid,
        /// Section to append the exercise to
        #[arg(long, conflicts_with = "slot", required_unless_present = "slot")]
        section: Option<Uuid>,
        /// Exercise slot to replace
        #[arg(long)]
        slot: Option<Uuid>,
    },
    /// Show the sets logged for a workout
    Logbook {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        workout: Uuid,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        settings.level_filter()?
    };
    logger::init(level, settings.log_format).context("failed to initialize logger")?;

    let database = cli.database.unwrap_or(settings.database);
    let store = SqliteStore::open(&database)
        .with_context(|| format!("failed to open database {}", database.display()))?;
    let service = domain::Service::new(store);

    run(&service, cli.command).await
}

async fn run(service: &domain::Service<SqliteStore>, command: Command) -> Result<()> {
    match command {
        Command::ImportCatalog { file } => {
            let catalog = seed::parse_catalog(&read(&file)?)
                .with_context(|| format!("invalid catalog {}", file.display()))?;
            service
                .repository()
                .import_catalog(&catalog)
                .await
                .map_err(failed("import catalog"))?;
            info!(
                "imported {} exercises, {} plans and {} skeleton workouts",
                catalog.exercises.len(),
                catalog.plans.len(),
                catalog.skeletons.len()
            );
        }
        Command::ExportCatalog => {
            let catalog = service
                .repository()
                .export_catalog()
                .await
                .map_err(failed("export catalog"))?;
            println!("{}", seed::serialize_catalog(&catalog)?);
        }
        Command::Onboard {
            user,
            plan,
            days,
            experience,
            equipment,
        } => {
            let workout = service
                .onboard(
                    user.into(),
                    domain::Onboarding {
                        plan_id: plan.into(),
                        workout_days: days,
                        experience_level: experience.into(),
                        available_equipment: domain::AvailableEquipment::from_str(&equipment)?,
                    },
                )
                .await
                .map_err(failed("onboard member"))?;
            print_materialized(workout);
        }
        Command::ChangePlan { user, plan, days } => {
            let workout = service
                .change_plan(user.into(), plan.into(), &days)
                .await
                .map_err(failed("change plan"))?;
            print_materialized(workout);
        }
        Command::UpdateProfile {
            user,
            experience,
            equipment,
        } => {
            let count = service
                .update_training_profile(
                    user.into(),
                    experience.into(),
                    domain::AvailableEquipment::from_str(&equipment)?,
                )
                .await
                .map_err(failed("update training profile"))?;
            println!("{count} exercises available");
        }
        Command::AssignExercises { user } => {
            let count = service
                .assign_available_exercises(user.into())
                .await
                .map_err(failed("assign exercises"))?;
            println!("{count} exercises available");
        }
        Command::Rebuild { user } => {
            let count = service
                .rebuild_schedule(user.into())
                .await
                .map_err(failed("rebuild schedule"))?;
            println!("{count} workouts scheduled");
        }
        Command::Materialize { user } => {
            let workout = service
                .materialize_next_workout(user.into())
                .await
                .map_err(failed("materialize workout"))?;
            print_materialized(workout);
        }
        Command::Show { user, workout } => {
            let workout = service
                .get_workout(user.into(), workout.into())
                .await
                .map_err(failed("read workout"))?;
            print_json(&output::Workout::from(&workout))?;
        }
        Command::Upcoming { user } => {
            let workouts = service
                .get_upcoming_workouts(user.into())
                .await
                .map_err(failed("read workouts"))?;
            print_json(
                &workouts
                    .iter()
                    .map(output::Workout::from)
                    .collect::<Vec<_>>(),
            )?;
        }
        Command::Complete { user, workout, log } => {
            let exercises = match log {
                Some(path) => read_logged_exercises(&path)?,
                None => vec![],
            };
            let next = service
                .complete_workout(user.into(), workout.into(), exercises)
                .await
                .map_err(failed("complete workout"))?;
            print_materialized(next);
        }
        Command::FeatureExercise {
            user,
            workout,
            exercise,
            section,
            slot,
        } => {
            let featured = match (section, slot) {
                (Some(section), _) => domain::FeaturedExercise::AddToSection {
                    section_id: section.into(),
                    exercise_id: exercise.into(),
                },
                (None, Some(slot)) => domain::FeaturedExercise::Replace {
                    workout_exercise_id: slot.into(),
                    exercise_id: exercise.into(),
                },
                (None, None) => return Err(anyhow!("either --section or --slot is required")),
            };
            let slot = service
                .add_featured_exercise(user.into(), workout.into(), featured)
                .await
                .map_err(failed("add featured exercise"))?;
            println!("exercise {exercise} in slot {slot}");
        }
        Command::Logbook { user, workout } => {
            let logged = service
                .get_logged_sets(user.into(), workout.into())
                .await
                .map_err(failed("read logged sets"))?;
            print_json(
                &logged
                    .iter()
                    .map(output::LoggedExercise::from)
                    .collect::<Vec<_>>(),
            )?;
        }
    }
    Ok(())
}

fn failed<E: std::fmt::Display>(action: &'static str) -> impl FnOnce(E) -> anyhow::Error {
    move |err| anyhow!("failed to {action}: {err}")
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_logged_exercises(path: &Path) -> Result<Vec<domain::LoggedExercise>> {
    let logged: Vec<output::LoggedExercise> = serde_json::from_str(&read(path)?)
        .with_context(|| format!("invalid logged sets in {}", path.display()))?;
    Ok(logged
        .into_iter()
        .map(domain::LoggedExercise::try_from)
        .collect::<Result<_, _>>()?)
}

fn print_materialized(workout: Option<domain::ScheduledWorkoutID>) {
    match workout {
        Some(id) => println!("materialized workout {id}"),
        None => println!("no workout due"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
