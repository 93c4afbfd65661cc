use std::{collections::BTreeSet, path::Path, str::FromStr, sync::Mutex};

use chrono::NaiveDate;
use log::debug;
use repcoach_domain as domain;
use rusqlite::{Connection, OptionalExtension, Row, Statement, params};
use strum::{AsRefStr, EnumString};
use uuid::Uuid;

use crate::{
    CatalogStore,
    seed::{self, SeedError},
};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS exercises(
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        experience_level INTEGER NOT NULL,
        weight_option TEXT
    )",
    "CREATE TABLE IF NOT EXISTS exercise_types(
        exercise_id TEXT NOT NULL,
        exercise_type TEXT NOT NULL,
        PRIMARY KEY(exercise_id, exercise_type)
    )",
    "CREATE INDEX IF NOT EXISTS idx_exercise_types_type ON exercise_types(exercise_type)",
    "CREATE TABLE IF NOT EXISTS exercise_equipment(
        exercise_id TEXT NOT NULL,
        equipment_id TEXT NOT NULL,
        PRIMARY KEY(exercise_id, equipment_id)
    )",
    "CREATE TABLE IF NOT EXISTS progression_plans(
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        days_per_week INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS plan_days(
        plan_id TEXT NOT NULL,
        day INTEGER NOT NULL,
        progression_id TEXT NOT NULL,
        PRIMARY KEY(plan_id, day)
    )",
    "CREATE TABLE IF NOT EXISTS progressions(
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        default_sets INTEGER NOT NULL,
        default_reps INTEGER NOT NULL,
        default_time INTEGER NOT NULL,
        default_rest INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS progression_sessions(
        progression_id TEXT NOT NULL,
        day INTEGER NOT NULL,
        section_type TEXT,
        sets INTEGER,
        reps INTEGER,
        time INTEGER,
        rest INTEGER,
        weight REAL
    )",
    "CREATE INDEX IF NOT EXISTS idx_progression_sessions_progression
        ON progression_sessions(progression_id)",
    "CREATE TABLE IF NOT EXISTS skeleton_workouts(
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS skeleton_focus(
        skeleton_id TEXT NOT NULL,
        progression_id TEXT NOT NULL,
        PRIMARY KEY(skeleton_id, progression_id)
    )",
    "CREATE TABLE IF NOT EXISTS skeleton_sections(
        id TEXT PRIMARY KEY,
        skeleton_id TEXT NOT NULL,
        display_order INTEGER NOT NULL,
        section_type TEXT NOT NULL,
        title TEXT NOT NULL,
        rest INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS skeleton_categories(
        section_id TEXT NOT NULL,
        display_order INTEGER NOT NULL,
        exercise_type TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS user_profiles(
        user_id TEXT PRIMARY KEY,
        progression_plan_id TEXT,
        progression_plan_day INTEGER NOT NULL,
        experience_level INTEGER NOT NULL,
        available_equipment TEXT NOT NULL,
        workout_days TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS available_exercises(
        user_id TEXT NOT NULL,
        exercise_id TEXT NOT NULL,
        PRIMARY KEY(user_id, exercise_id)
    )",
    "CREATE TABLE IF NOT EXISTS user_progressions(
        user_id TEXT NOT NULL,
        progression_id TEXT NOT NULL,
        session_count INTEGER NOT NULL,
        PRIMARY KEY(user_id, progression_id)
    )",
    "CREATE TABLE IF NOT EXISTS user_workouts(
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        workout_date TEXT NOT NULL,
        progression_plan_id TEXT NOT NULL,
        state TEXT NOT NULL,
        progression_id TEXT,
        title TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_user_workouts_user ON user_workouts(user_id, workout_date)",
    "CREATE TABLE IF NOT EXISTS user_workout_sections(
        id TEXT PRIMARY KEY,
        workout_id TEXT NOT NULL,
        display_order INTEGER NOT NULL,
        section_type TEXT NOT NULL,
        title TEXT NOT NULL,
        rest INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_user_workout_sections_workout
        ON user_workout_sections(workout_id)",
    "CREATE TABLE IF NOT EXISTS user_workout_exercises(
        id TEXT PRIMARY KEY,
        workout_id TEXT NOT NULL,
        section_id TEXT NOT NULL,
        display_order INTEGER NOT NULL,
        exercise_type TEXT NOT NULL,
        exercise_id TEXT,
        sets INTEGER NOT NULL,
        reps INTEGER NOT NULL,
        time INTEGER NOT NULL,
        rest INTEGER NOT NULL,
        weight REAL,
        weight_option TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_user_workout_exercises_section
        ON user_workout_exercises(section_id)",
    "CREATE TABLE IF NOT EXISTS user_workout_stats(
        user_id TEXT NOT NULL,
        workout_id TEXT NOT NULL,
        workout_exercise_id TEXT NOT NULL,
        difficulty INTEGER NOT NULL,
        set_number INTEGER NOT NULL,
        reps INTEGER,
        time INTEGER,
        weight REAL,
        PRIMARY KEY(workout_id, workout_exercise_id, set_number)
    )",
];

/// Relational store backed by a single SQLite connection.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, SqliteError> {
        debug!("opening database {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, SqliteError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(connection: Connection) -> Result<Self, SqliteError> {
        for statement in SCHEMA {
            connection.execute(statement, [])?;
        }
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, SqliteError>,
    ) -> Result<T, domain::StorageError> {
        let connection = self.connection.lock().map_err(|_| SqliteError::Poisoned)?;
        Ok(f(&connection)?)
    }

    fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, SqliteError>,
    ) -> Result<T, domain::StorageError> {
        self.with_connection(|connection| {
            let transaction = connection.unchecked_transaction()?;
            let result = f(&transaction)?;
            transaction.commit()?;
            Ok(result)
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SqliteError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Uuid(#[from] uuid::Error),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error("invalid {column}: {value}")]
    InvalidValue { column: &'static str, value: String },
    #[error("database connection is poisoned")]
    Poisoned,
}

impl From<SqliteError> for domain::StorageError {
    fn from(value: SqliteError) -> Self {
        domain::StorageError::Other(Box::new(value))
    }
}

#[derive(AsRefStr, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
enum WorkoutStatus {
    Empty,
    Materialized,
    Completed,
}

impl From<&domain::WorkoutState> for WorkoutStatus {
    fn from(value: &domain::WorkoutState) -> Self {
        match value {
            domain::WorkoutState::Empty => WorkoutStatus::Empty,
            domain::WorkoutState::Materialized(_) => WorkoutStatus::Materialized,
            domain::WorkoutState::Completed(_) => WorkoutStatus::Completed,
        }
    }
}

fn parse_uuid(value: &str) -> Result<Uuid, SqliteError> {
    Ok(Uuid::parse_str(value)?)
}

fn query_uuids(statement: &mut Statement<'_>, id: &str) -> Result<Vec<Uuid>, SqliteError> {
    statement
        .query_map([id], |row| row.get::<_, String>(0))?
        .map(|value| parse_uuid(&value?))
        .collect()
}

impl CatalogStore for SqliteStore {
    async fn import_catalog(&self, catalog: &domain::Catalog) -> Result<(), domain::UpdateError> {
        let catalog = seed::Catalog::from(catalog);
        self.with_transaction(|connection| {
            for table in [
                "exercises",
                "exercise_types",
                "exercise_equipment",
                "progression_plans",
                "plan_days",
                "progressions",
                "progression_sessions",
                "skeleton_workouts",
                "skeleton_focus",
                "skeleton_sections",
                "skeleton_categories",
            ] {
                connection.execute(&format!("DELETE FROM {table}"), [])?;
            }
            for exercise in &catalog.exercises {
                let id = exercise.id.to_string();
                connection.execute(
                    "INSERT INTO exercises(id, title, experience_level, weight_option)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        id,
                        exercise.title,
                        exercise.experience_level,
                        exercise.weight_option
                    ],
                )?;
                for exercise_type in &exercise.exercise_types {
                    connection.execute(
                        "INSERT INTO exercise_types(exercise_id, exercise_type) VALUES (?1, ?2)",
                        params![id, exercise_type.to_string()],
                    )?;
                }
                for equipment in &exercise.equipment {
                    connection.execute(
                        "INSERT INTO exercise_equipment(exercise_id, equipment_id) VALUES (?1, ?2)",
                        params![id, equipment.to_string()],
                    )?;
                }
            }
            for plan in &catalog.plans {
                connection.execute(
                    "INSERT INTO progression_plans(id, title, days_per_week) VALUES (?1, ?2, ?3)",
                    params![plan.id.to_string(), plan.title, plan.days_per_week],
                )?;
            }
            for plan_day in &catalog.plan_days {
                connection.execute(
                    "INSERT INTO plan_days(plan_id, day, progression_id) VALUES (?1, ?2, ?3)",
                    params![
                        plan_day.plan_id.to_string(),
                        plan_day.day,
                        plan_day.progression_id.to_string()
                    ],
                )?;
            }
            for progression in &catalog.progressions {
                connection.execute(
                    "INSERT INTO progressions(
                        id, title, default_sets, default_reps, default_time, default_rest
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        progression.id.to_string(),
                        progression.title,
                        progression.default_sets,
                        progression.default_reps,
                        progression.default_time,
                        progression.default_rest
                    ],
                )?;
            }
            for session in &catalog.sessions {
                connection.execute(
                    "INSERT INTO progression_sessions(
                        progression_id, day, section_type, sets, reps, time, rest, weight
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        session.progression_id.to_string(),
                        session.day,
                        session.section_type.map(|t| t.to_string()),
                        session.sets,
                        session.reps,
                        session.time,
                        session.rest,
                        session.weight
                    ],
                )?;
            }
            for skeleton in &catalog.skeletons {
                let id = skeleton.id.to_string();
                connection.execute(
                    "INSERT INTO skeleton_workouts(id, title) VALUES (?1, ?2)",
                    params![id, skeleton.title],
                )?;
                for progression_id in &skeleton.focus {
                    connection.execute(
                        "INSERT INTO skeleton_focus(skeleton_id, progression_id) VALUES (?1, ?2)",
                        params![id, progression_id.to_string()],
                    )?;
                }
                for section in &skeleton.sections {
                    let section_id = section.id.to_string();
                    connection.execute(
                        "INSERT INTO skeleton_sections(
                            id, skeleton_id, display_order, section_type, title, rest
                         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        params![
                            section_id,
                            id,
                            section.display_order,
                            section.section_type.to_string(),
                            section.title,
                            section.rest
                        ],
                    )?;
                    for category in &section.categories {
                        connection.execute(
                            "INSERT INTO skeleton_categories(section_id, display_order, exercise_type)
                             VALUES (?1, ?2, ?3)",
                            params![
                                section_id,
                                category.display_order,
                                category.exercise_type.to_string()
                            ],
                        )?;
                    }
                }
            }
            debug!(
                "imported catalog with {} exercises and {} skeleton workouts",
                catalog.exercises.len(),
                catalog.skeletons.len()
            );
            Ok(())
        })?;
        Ok(())
    }

    async fn export_catalog(&self) -> Result<domain::Catalog, domain::ReadError> {
        Ok(self.with_connection(|connection| {
            let mut plans = connection
                .prepare("SELECT id, title, days_per_week FROM progression_plans ORDER BY id")?;
            let plans = plans
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, u32>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|(id, title, days_per_week)| {
                    Ok(domain::ProgressionPlan::try_from(seed::ProgressionPlan {
                        id: parse_uuid(&id)?,
                        title,
                        days_per_week,
                    })?)
                })
                .collect::<Result<Vec<_>, SqliteError>>()?;
            let mut plan_days = connection.prepare(
                "SELECT plan_id, day, progression_id FROM plan_days ORDER BY plan_id, day",
            )?;
            let plan_days = plan_days
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|(plan_id, day, progression_id)| {
                    Ok(domain::PlanDay::from(seed::PlanDay {
                        plan_id: parse_uuid(&plan_id)?,
                        day,
                        progression_id: parse_uuid(&progression_id)?,
                    }))
                })
                .collect::<Result<Vec<_>, SqliteError>>()?;
            let mut progressions = connection.prepare(
                "SELECT id, title, default_sets, default_reps, default_time, default_rest
                 FROM progressions ORDER BY id",
            )?;
            let progressions = progressions
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, progression_row(row)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|(id, progression)| {
                    Ok(domain::Progression::try_from(seed::Progression {
                        id: parse_uuid(&id)?,
                        ..progression
                    })?)
                })
                .collect::<Result<Vec<_>, SqliteError>>()?;
            let mut skeletons =
                connection.prepare("SELECT id, title FROM skeleton_workouts ORDER BY id")?;
            let skeletons = skeletons
                .query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|(id, title)| load_skeleton(connection, &id, title))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(domain::Catalog {
                exercises: load_exercises(connection, None)?,
                plans,
                plan_days,
                progressions,
                sessions: load_sessions(connection, None)?,
                skeletons,
            })
        })?)
    }
}

fn profile_row(row: &Row) -> rusqlite::Result<(String, Option<String>, u32, u32, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn load_profile(
    connection: &Connection,
    user_id: domain::UserID,
) -> Result<Option<domain::UserProfile>, SqliteError> {
    let Some((id, plan_id, plan_day, experience_level, equipment, workout_days)) = connection
        .query_row(
            "SELECT user_id, progression_plan_id, progression_plan_day, experience_level,
                    available_equipment, workout_days
             FROM user_profiles WHERE user_id = ?1",
            [user_id.to_string()],
            profile_row,
        )
        .optional()?
    else {
        return Ok(None);
    };
    Ok(Some(domain::UserProfile {
        user_id: parse_uuid(&id)?.into(),
        progression_plan_id: plan_id.as_deref().map(parse_uuid).transpose()?.map(From::from),
        progression_plan_day: plan_day,
        experience_level: experience_level.into(),
        available_equipment: domain::AvailableEquipment::from_str(&equipment).map_err(|_| {
            SqliteError::InvalidValue {
                column: "available_equipment",
                value: equipment.clone(),
            }
        })?,
        workout_days: domain::WorkoutDays::from_str(&workout_days).map_err(|_| {
            SqliteError::InvalidValue {
                column: "workout_days",
                value: workout_days.clone(),
            }
        })?,
    }))
}

impl domain::UserRepository for SqliteStore {
    async fn read_user_profile(
        &self,
        id: domain::UserID,
    ) -> Result<domain::UserProfile, domain::ReadError> {
        self.with_connection(|connection| load_profile(connection, id))?
            .ok_or(domain::ReadError::NotFound)
    }

    async fn create_user_profile(
        &self,
        profile: domain::UserProfile,
    ) -> Result<domain::UserProfile, domain::CreateError> {
        let created = self.with_connection(|connection| {
            if load_profile(connection, profile.user_id)?.is_some() {
                return Ok(false);
            }
            connection.execute(
                "INSERT INTO user_profiles(
                    user_id, progression_plan_id, progression_plan_day, experience_level,
                    available_equipment, workout_days
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    profile.user_id.to_string(),
                    profile.progression_plan_id.map(|id| id.to_string()),
                    profile.progression_plan_day,
                    *profile.experience_level,
                    profile.available_equipment.to_string(),
                    profile.workout_days.to_string()
                ],
            )?;
            Ok(true)
        })?;
        if !created {
            return Err(domain::CreateError::Conflict);
        }
        Ok(profile)
    }

    async fn replace_user_profile(
        &self,
        profile: domain::UserProfile,
    ) -> Result<domain::UserProfile, domain::UpdateError> {
        let changed = self.with_connection(|connection| {
            Ok(connection.execute(
                "UPDATE user_profiles
                 SET progression_plan_id = ?2, progression_plan_day = ?3, experience_level = ?4,
                     available_equipment = ?5, workout_days = ?6
                 WHERE user_id = ?1",
                params![
                    profile.user_id.to_string(),
                    profile.progression_plan_id.map(|id| id.to_string()),
                    profile.progression_plan_day,
                    *profile.experience_level,
                    profile.available_equipment.to_string(),
                    profile.workout_days.to_string()
                ],
            )?)
        })?;
        if changed == 0 {
            return Err(domain::UpdateError::NotFound);
        }
        Ok(profile)
    }
}

fn load_exercises(
    connection: &Connection,
    exercise_type: Option<domain::ExerciseTypeID>,
) -> Result<Vec<domain::Exercise>, SqliteError> {
    let mut statement = connection.prepare(
        "SELECT id, title, experience_level, weight_option FROM exercises
         WHERE ?1 IS NULL
            OR id IN (SELECT exercise_id FROM exercise_types WHERE exercise_type = ?1)
         ORDER BY id",
    )?;
    let rows = statement
        .query_map([exercise_type.map(|t| t.to_string())], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let mut types =
        connection.prepare("SELECT exercise_type FROM exercise_types WHERE exercise_id = ?1")?;
    let mut equipment =
        connection.prepare("SELECT equipment_id FROM exercise_equipment WHERE exercise_id = ?1")?;
    rows.into_iter()
        .map(|(id, title, experience_level, weight_option)| {
            let exercise = seed::Exercise {
                id: parse_uuid(&id)?,
                title,
                experience_level,
                exercise_types: query_uuids(&mut types, &id)?,
                equipment: query_uuids(&mut equipment, &id)?,
                weight_option,
            };
            Ok(domain::Exercise::try_from(exercise)?)
        })
        .collect()
}

impl domain::ExerciseRepository for SqliteStore {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self.with_connection(|connection| load_exercises(connection, None))?)
    }

    async fn read_exercises_of_type(
        &self,
        exercise_type: domain::ExerciseTypeID,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self.with_connection(|connection| load_exercises(connection, Some(exercise_type)))?)
    }
}

impl domain::AvailableExerciseRepository for SqliteStore {
    async fn read_available_exercises(
        &self,
        user_id: domain::UserID,
    ) -> Result<BTreeSet<domain::ExerciseID>, domain::ReadError> {
        Ok(self.with_connection(|connection| {
            let mut statement = connection
                .prepare("SELECT exercise_id FROM available_exercises WHERE user_id = ?1")?;
            Ok(query_uuids(&mut statement, &user_id.to_string())?
                .into_iter()
                .map(domain::ExerciseID::from)
                .collect())
        })?)
    }

    async fn replace_available_exercises(
        &self,
        user_id: domain::UserID,
        exercises: BTreeSet<domain::ExerciseID>,
    ) -> Result<usize, domain::UpdateError> {
        Ok(self.with_transaction(|connection| {
            let user_id = user_id.to_string();
            connection.execute(
                "DELETE FROM available_exercises WHERE user_id = ?1",
                [&user_id],
            )?;
            for exercise_id in &exercises {
                connection.execute(
                    "INSERT INTO available_exercises(user_id, exercise_id) VALUES (?1, ?2)",
                    params![user_id, exercise_id.to_string()],
                )?;
            }
            Ok(exercises.len())
        })?)
    }
}

fn progression_row(row: &Row) -> rusqlite::Result<seed::Progression> {
    Ok(seed::Progression {
        id: Uuid::nil(),
        title: row.get(1)?,
        default_sets: row.get(2)?,
        default_reps: row.get(3)?,
        default_time: row.get(4)?,
        default_rest: row.get(5)?,
    })
}

fn load_progression(
    connection: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Option<domain::Progression>, SqliteError> {
    let Some((id, progression)) = connection
        .query_row(sql, params, |row| {
            Ok((row.get::<_, String>(0)?, progression_row(row)?))
        })
        .optional()?
    else {
        return Ok(None);
    };
    Ok(Some(domain::Progression::try_from(seed::Progression {
        id: parse_uuid(&id)?,
        ..progression
    })?))
}

impl domain::ProgressionRepository for SqliteStore {
    async fn read_progression_plan(
        &self,
        id: domain::ProgressionPlanID,
    ) -> Result<domain::ProgressionPlan, domain::ReadError> {
        self.with_connection(|connection| {
            let Some((title, days_per_week)) = connection
                .query_row(
                    "SELECT title, days_per_week FROM progression_plans WHERE id = ?1",
                    [id.to_string()],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)),
                )
                .optional()?
            else {
                return Ok(None);
            };
            Ok(Some(domain::ProgressionPlan::try_from(
                seed::ProgressionPlan {
                    id: *id,
                    title,
                    days_per_week,
                },
            )?))
        })?
        .ok_or(domain::ReadError::NotFound)
    }

    async fn read_plan_day_progression(
        &self,
        plan_id: domain::ProgressionPlanID,
        day: u32,
    ) -> Result<Option<domain::Progression>, domain::ReadError> {
        Ok(self.with_connection(|connection| {
            load_progression(
                connection,
                "SELECT p.id, p.title, p.default_sets, p.default_reps, p.default_time,
                        p.default_rest
                 FROM plan_days d JOIN progressions p ON p.id = d.progression_id
                 WHERE d.plan_id = ?1 AND d.day = ?2",
                params![plan_id.to_string(), day],
            )
        })?)
    }

    async fn read_progression(
        &self,
        id: domain::ProgressionID,
    ) -> Result<Option<domain::Progression>, domain::ReadError> {
        Ok(self.with_connection(|connection| {
            load_progression(
                connection,
                "SELECT id, title, default_sets, default_reps, default_time, default_rest
                 FROM progressions WHERE id = ?1",
                [id.to_string()],
            )
        })?)
    }

    async fn read_progression_sessions(
        &self,
        id: domain::ProgressionID,
    ) -> Result<Vec<domain::ProgressionSession>, domain::ReadError> {
        Ok(self.with_connection(|connection| load_sessions(connection, Some(id)))?)
    }
}

fn load_sessions(
    connection: &Connection,
    progression_id: Option<domain::ProgressionID>,
) -> Result<Vec<domain::ProgressionSession>, SqliteError> {
    let mut statement = connection.prepare(
        "SELECT progression_id, day, section_type, sets, reps, time, rest, weight
         FROM progression_sessions
         WHERE ?1 IS NULL OR progression_id = ?1
         ORDER BY progression_id, day, rowid",
    )?;
    let rows = statement
        .query_map([progression_id.map(|id| id.to_string())], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<u32>>(3)?,
                row.get::<_, Option<u32>>(4)?,
                row.get::<_, Option<u32>>(5)?,
                row.get::<_, Option<u32>>(6)?,
                row.get::<_, Option<f32>>(7)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter()
        .map(
            |(progression_id, day, section_type, sets, reps, time, rest, weight)| {
                Ok(domain::ProgressionSession::try_from(
                    seed::ProgressionSession {
                        progression_id: parse_uuid(&progression_id)?,
                        day,
                        section_type: section_type.as_deref().map(parse_uuid).transpose()?,
                        sets,
                        reps,
                        time,
                        rest,
                        weight,
                    },
                )?)
            },
        )
        .collect()
}

impl domain::UserProgressionRepository for SqliteStore {
    async fn read_user_progression(
        &self,
        user_id: domain::UserID,
        progression_id: domain::ProgressionID,
    ) -> Result<Option<domain::UserProgression>, domain::ReadError> {
        Ok(self.with_connection(|connection| {
            load_user_progression(connection, user_id, progression_id)
        })?)
    }

    async fn create_user_progression(
        &self,
        user_id: domain::UserID,
        progression_id: domain::ProgressionID,
    ) -> Result<domain::UserProgression, domain::CreateError> {
        let inserted = self.with_connection(|connection| {
            Ok(connection.execute(
                "INSERT OR IGNORE INTO user_progressions(user_id, progression_id, session_count)
                 VALUES (?1, ?2, 1)",
                params![user_id.to_string(), progression_id.to_string()],
            )?)
        })?;
        if inserted == 0 {
            return Err(domain::CreateError::Conflict);
        }
        Ok(domain::UserProgression {
            user_id,
            progression_id,
            session_count: 1,
        })
    }

    async fn increment_session_count(
        &self,
        user_id: domain::UserID,
        progression_id: domain::ProgressionID,
    ) -> Result<domain::UserProgression, domain::UpdateError> {
        self.with_transaction(|connection| {
            connection.execute(
                "UPDATE user_progressions SET session_count = session_count + 1
                 WHERE user_id = ?1 AND progression_id = ?2",
                params![user_id.to_string(), progression_id.to_string()],
            )?;
            load_user_progression(connection, user_id, progression_id)
        })?
        .ok_or(domain::UpdateError::NotFound)
    }
}

fn load_user_progression(
    connection: &Connection,
    user_id: domain::UserID,
    progression_id: domain::ProgressionID,
) -> Result<Option<domain::UserProgression>, SqliteError> {
    Ok(connection
        .query_row(
            "SELECT session_count FROM user_progressions
             WHERE user_id = ?1 AND progression_id = ?2",
            params![user_id.to_string(), progression_id.to_string()],
            |row| row.get::<_, u32>(0),
        )
        .optional()?
        .map(|session_count| domain::UserProgression {
            user_id,
            progression_id,
            session_count,
        }))
}

impl domain::SkeletonRepository for SqliteStore {
    async fn read_skeleton_for_progression(
        &self,
        progression_id: domain::ProgressionID,
    ) -> Result<Option<domain::SkeletonWorkout>, domain::ReadError> {
        Ok(self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT s.id, s.title
                     FROM skeleton_workouts s JOIN skeleton_focus f ON f.skeleton_id = s.id
                     WHERE f.progression_id = ?1
                     ORDER BY s.id LIMIT 1",
                    [progression_id.to_string()],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?
                .map(|(id, title)| load_skeleton(connection, &id, title))
                .transpose()
        })?)
    }
}

fn load_skeleton(
    connection: &Connection,
    id: &str,
    title: String,
) -> Result<domain::SkeletonWorkout, SqliteError> {
    let mut focus =
        connection.prepare("SELECT progression_id FROM skeleton_focus WHERE skeleton_id = ?1")?;
    let mut sections = connection.prepare(
        "SELECT id, display_order, section_type, title, rest
         FROM skeleton_sections WHERE skeleton_id = ?1 ORDER BY rowid",
    )?;
    let mut categories = connection.prepare(
        "SELECT display_order, exercise_type FROM skeleton_categories
         WHERE section_id = ?1 ORDER BY rowid",
    )?;
    let section_rows = sections
        .query_map([id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u32>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let skeleton = seed::SkeletonWorkout {
        id: parse_uuid(id)?,
        title,
        focus: query_uuids(&mut focus, id)?,
        sections: section_rows
            .into_iter()
            .map(|(section_id, display_order, section_type, title, rest)| {
                Ok(seed::SkeletonSection {
                    id: parse_uuid(&section_id)?,
                    display_order,
                    section_type: parse_uuid(&section_type)?,
                    title,
                    rest,
                    categories: categories
                        .query_map([&section_id], |row| {
                            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
                        })?
                        .map(|category| {
                            let (display_order, exercise_type) = category?;
                            Ok(seed::SkeletonCategory {
                                display_order,
                                exercise_type: parse_uuid(&exercise_type)?,
                            })
                        })
                        .collect::<Result<Vec<_>, SqliteError>>()?,
                })
            })
            .collect::<Result<Vec<_>, SqliteError>>()?,
    };
    Ok(domain::SkeletonWorkout::try_from(skeleton)?)
}

struct WorkoutRow {
    id: String,
    user_id: String,
    date: NaiveDate,
    plan_id: String,
    status: String,
    progression_id: Option<String>,
    title: Option<String>,
}

const WORKOUT_COLUMNS: &str =
    "id, user_id, workout_date, progression_plan_id, state, progression_id, title";

fn workout_row(row: &Row) -> rusqlite::Result<WorkoutRow> {
    Ok(WorkoutRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        plan_id: row.get(3)?,
        status: row.get(4)?,
        progression_id: row.get(5)?,
        title: row.get(6)?,
    })
}

fn load_workout(
    connection: &Connection,
    row: WorkoutRow,
) -> Result<domain::ScheduledWorkout, SqliteError> {
    let status =
        WorkoutStatus::from_str(&row.status).map_err(|_| SqliteError::InvalidValue {
            column: "state",
            value: row.status.clone(),
        })?;
    let state = match status {
        WorkoutStatus::Empty => domain::WorkoutState::Empty,
        WorkoutStatus::Materialized => {
            domain::WorkoutState::Materialized(load_content(connection, &row)?)
        }
        WorkoutStatus::Completed => {
            domain::WorkoutState::Completed(load_content(connection, &row)?)
        }
    };
    Ok(domain::ScheduledWorkout {
        id: parse_uuid(&row.id)?.into(),
        user_id: parse_uuid(&row.user_id)?.into(),
        date: row.date,
        progression_plan_id: parse_uuid(&row.plan_id)?.into(),
        state,
    })
}

fn load_content(
    connection: &Connection,
    row: &WorkoutRow,
) -> Result<domain::WorkoutContent, SqliteError> {
    let progression_id = row
        .progression_id
        .as_deref()
        .ok_or(SqliteError::InvalidValue {
            column: "progression_id",
            value: String::new(),
        })?;
    let title = row.title.as_deref().unwrap_or_default();
    let mut sections = connection.prepare(
        "SELECT id, display_order, section_type, title, rest
         FROM user_workout_sections WHERE workout_id = ?1 ORDER BY display_order",
    )?;
    let mut exercises = connection.prepare(
        "SELECT id, display_order, exercise_type, exercise_id, sets, reps, time, rest, weight,
                weight_option
         FROM user_workout_exercises WHERE section_id = ?1 ORDER BY display_order",
    )?;
    let section_rows = sections
        .query_map([&row.id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, u32>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    let mut content_sections = vec![];
    for (section_id, display_order, section_type, section_title, rest) in section_rows {
        let exercise_rows = exercises
            .query_map([&section_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    (
                        row.get::<_, u32>(4)?,
                        row.get::<_, u32>(5)?,
                        row.get::<_, u32>(6)?,
                        row.get::<_, u32>(7)?,
                        row.get::<_, Option<f32>>(8)?,
                        row.get::<_, String>(9)?,
                    ),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut workout_exercises = vec![];
        for (id, display_order, exercise_type, exercise_id, parameters) in exercise_rows {
            let (sets, reps, time, rest, weight, weight_option) = parameters;
            workout_exercises.push(domain::WorkoutExercise {
                id: parse_uuid(&id)?.into(),
                display_order,
                exercise_type: parse_uuid(&exercise_type)?.into(),
                exercise_id: exercise_id.as_deref().map(parse_uuid).transpose()?.map(From::from),
                parameters: domain::SetParameters {
                    sets: domain::Sets::new(sets).map_err(SeedError::from)?,
                    reps: domain::Reps::new(reps).map_err(SeedError::from)?,
                    time: domain::Time::new(time).map_err(SeedError::from)?,
                    rest: domain::Time::new(rest).map_err(SeedError::from)?,
                    weight: weight
                        .map(domain::Weight::new)
                        .transpose()
                        .map_err(SeedError::from)?,
                    weight_option: seed::parse_weight_option(&weight_option)?,
                },
            });
        }
        content_sections.push(domain::WorkoutSection {
            id: parse_uuid(&section_id)?.into(),
            display_order,
            section_type: parse_uuid(&section_type)?.into(),
            title: domain::Title::new(&section_title).map_err(SeedError::from)?,
            rest: domain::Time::new(rest).map_err(SeedError::from)?,
            exercises: workout_exercises,
        });
    }
    Ok(domain::WorkoutContent {
        progression_id: parse_uuid(progression_id)?.into(),
        title: domain::Title::new(title).map_err(SeedError::from)?,
        sections: content_sections,
    })
}

fn delete_workout_content(connection: &Connection, workout_id: &str) -> Result<(), SqliteError> {
    connection.execute(
        "DELETE FROM user_workout_exercises WHERE workout_id = ?1",
        [workout_id],
    )?;
    connection.execute(
        "DELETE FROM user_workout_sections WHERE workout_id = ?1",
        [workout_id],
    )?;
    Ok(())
}

fn insert_workout_content(
    connection: &Connection,
    workout_id: &str,
    content: &domain::WorkoutContent,
) -> Result<(), SqliteError> {
    for section in &content.sections {
        let section_id = section.id.to_string();
        connection.execute(
            "INSERT INTO user_workout_sections(
                id, workout_id, display_order, section_type, title, rest
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                section_id,
                workout_id,
                section.display_order,
                section.section_type.to_string(),
                section.title.to_string(),
                u32::from(section.rest)
            ],
        )?;
        for exercise in &section.exercises {
            let parameters = &exercise.parameters;
            connection.execute(
                "INSERT INTO user_workout_exercises(
                    id, workout_id, section_id, display_order, exercise_type, exercise_id,
                    sets, reps, time, rest, weight, weight_option
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    exercise.id.to_string(),
                    workout_id,
                    section_id,
                    exercise.display_order,
                    exercise.exercise_type.to_string(),
                    exercise.exercise_id.map(|id| id.to_string()),
                    u32::from(parameters.sets),
                    u32::from(parameters.reps),
                    u32::from(parameters.time),
                    u32::from(parameters.rest),
                    parameters.weight.map(f32::from),
                    parameters.weight_option.as_ref()
                ],
            )?;
        }
    }
    Ok(())
}

impl domain::WorkoutRepository for SqliteStore {
    async fn read_scheduled_workouts(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::ScheduledWorkout>, domain::ReadError> {
        Ok(self.with_connection(|connection| {
            let mut statement = connection.prepare(&format!(
                "SELECT {WORKOUT_COLUMNS} FROM user_workouts
                 WHERE user_id = ?1 ORDER BY workout_date, id"
            ))?;
            let rows = statement
                .query_map([user_id.to_string()], workout_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter()
                .map(|row| load_workout(connection, row))
                .collect()
        })?)
    }

    async fn read_scheduled_workout(
        &self,
        id: domain::ScheduledWorkoutID,
    ) -> Result<domain::ScheduledWorkout, domain::ReadError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    &format!("SELECT {WORKOUT_COLUMNS} FROM user_workouts WHERE id = ?1"),
                    [id.to_string()],
                    workout_row,
                )
                .optional()?
                .map(|row| load_workout(connection, row))
                .transpose()
        })?
        .ok_or(domain::ReadError::NotFound)
    }

    async fn create_scheduled_workouts(
        &self,
        user_id: domain::UserID,
        plan_id: domain::ProgressionPlanID,
        dates: Vec<NaiveDate>,
    ) -> Result<Vec<domain::ScheduledWorkout>, domain::CreateError> {
        Ok(self.with_transaction(|connection| {
            let mut workouts = vec![];
            for date in dates {
                let workout = domain::ScheduledWorkout {
                    id: domain::ScheduledWorkoutID::new_v4(),
                    user_id,
                    date,
                    progression_plan_id: plan_id,
                    state: domain::WorkoutState::Empty,
                };
                connection.execute(
                    "INSERT INTO user_workouts(id, user_id, workout_date, progression_plan_id, state)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        workout.id.to_string(),
                        user_id.to_string(),
                        date,
                        plan_id.to_string(),
                        WorkoutStatus::Empty.as_ref()
                    ],
                )?;
                workouts.push(workout);
            }
            Ok(workouts)
        })?)
    }

    async fn replace_scheduled_workout(
        &self,
        workout: domain::ScheduledWorkout,
    ) -> Result<domain::ScheduledWorkout, domain::UpdateError> {
        let replaced = self.with_transaction(|connection| {
            let id = workout.id.to_string();
            let content = workout.content();
            let changed = connection.execute(
                "UPDATE user_workouts
                 SET user_id = ?2, workout_date = ?3, progression_plan_id = ?4, state = ?5,
                     progression_id = ?6, title = ?7
                 WHERE id = ?1",
                params![
                    id,
                    workout.user_id.to_string(),
                    workout.date,
                    workout.progression_plan_id.to_string(),
                    WorkoutStatus::from(&workout.state).as_ref(),
                    content.map(|c| c.progression_id.to_string()),
                    content.map(|c| c.title.to_string())
                ],
            )?;
            if changed == 0 {
                return Ok(false);
            }
            delete_workout_content(connection, &id)?;
            if let Some(content) = content {
                insert_workout_content(connection, &id, content)?;
            }
            Ok(true)
        })?;
        if !replaced {
            return Err(domain::UpdateError::NotFound);
        }
        Ok(workout)
    }

    async fn delete_pending_workouts(
        &self,
        user_id: domain::UserID,
        from: NaiveDate,
    ) -> Result<usize, domain::DeleteError> {
        Ok(self.with_transaction(|connection| {
            let pending = "SELECT id FROM user_workouts
                           WHERE user_id = ?1 AND state != 'completed' AND workout_date >= ?2";
            for table in [
                "user_workout_exercises",
                "user_workout_sections",
                "user_workout_stats",
            ] {
                connection.execute(
                    &format!("DELETE FROM {table} WHERE workout_id IN ({pending})"),
                    params![user_id.to_string(), from],
                )?;
            }
            Ok(connection.execute(
                "DELETE FROM user_workouts
                 WHERE user_id = ?1 AND state != 'completed' AND workout_date >= ?2",
                params![user_id.to_string(), from],
            )?)
        })?)
    }
}

impl domain::LogbookRepository for SqliteStore {
    async fn read_logged_sets(
        &self,
        user_id: domain::UserID,
        workout_id: domain::ScheduledWorkoutID,
    ) -> Result<Vec<domain::LoggedExercise>, domain::ReadError> {
        Ok(self.with_connection(|connection| {
            let mut statement = connection.prepare(
                "SELECT workout_exercise_id, difficulty, set_number, reps, time, weight
                 FROM user_workout_stats
                 WHERE user_id = ?1 AND workout_id = ?2
                 ORDER BY workout_exercise_id, set_number",
            )?;
            let rows = statement
                .query_map(
                    params![user_id.to_string(), workout_id.to_string()],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, u8>(1)?,
                            row.get::<_, u32>(2)?,
                            row.get::<_, Option<u32>>(3)?,
                            row.get::<_, Option<u32>>(4)?,
                            row.get::<_, Option<f32>>(5)?,
                        ))
                    },
                )?
                .collect::<Result<Vec<_>, _>>()?;
            let mut logged: Vec<domain::LoggedExercise> = vec![];
            for (exercise_id, difficulty, set_number, reps, time, weight) in rows {
                let workout_exercise_id = domain::WorkoutExerciseID::from(parse_uuid(&exercise_id)?);
                let set = domain::LoggedSet {
                    set_number,
                    reps: reps.map(domain::Reps::new).transpose().map_err(SeedError::from)?,
                    time: time.map(domain::Time::new).transpose().map_err(SeedError::from)?,
                    weight: weight
                        .map(domain::Weight::new)
                        .transpose()
                        .map_err(SeedError::from)?,
                };
                match logged.last_mut() {
                    Some(last) if last.workout_exercise_id == workout_exercise_id => {
                        last.sets.push(set);
                    }
                    _ => logged.push(domain::LoggedExercise {
                        workout_exercise_id,
                        difficulty: domain::Difficulty::try_from(difficulty).map_err(|_| {
                            SqliteError::InvalidValue {
                                column: "difficulty",
                                value: difficulty.to_string(),
                            }
                        })?,
                        sets: vec![set],
                    }),
                }
            }
            Ok(logged)
        })?)
    }

    async fn replace_logged_sets(
        &self,
        user_id: domain::UserID,
        workout_id: domain::ScheduledWorkoutID,
        exercise: domain::LoggedExercise,
    ) -> Result<domain::LoggedExercise, domain::UpdateError> {
        self.with_transaction(|connection| {
            let user_id = user_id.to_string();
            let workout_id = workout_id.to_string();
            let workout_exercise_id = exercise.workout_exercise_id.to_string();
            connection.execute(
                "DELETE FROM user_workout_stats
                 WHERE user_id = ?1 AND workout_id = ?2 AND workout_exercise_id = ?3",
                params![user_id, workout_id, workout_exercise_id],
            )?;
            for set in &exercise.sets {
                connection.execute(
                    "INSERT INTO user_workout_stats(
                        user_id, workout_id, workout_exercise_id, difficulty, set_number,
                        reps, time, weight
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        user_id,
                        workout_id,
                        workout_exercise_id,
                        exercise.difficulty as u8,
                        set.set_number,
                        set.reps.map(u32::from),
                        set.time.map(u32::from),
                        set.weight.map(f32::from)
                    ],
                )?;
            }
            Ok(())
        })?;
        Ok(exercise)
    }
}
