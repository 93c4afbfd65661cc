//! JSON views of scheduled workouts and logged sets, and the logbook input format.

use chrono::NaiveDate;
use repcoach_domain as domain;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Debug, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub date: NaiveDate,
    pub progression_plan_id: Uuid,
    pub state: State,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progression_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub sections: Vec<Section>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Empty,
    Materialized,
    Completed,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Section {
    pub id: Uuid,
    pub display_order: u32,
    pub section_type: Uuid,
    pub title: String,
    pub rest: u32,
    pub exercises: Vec<Exercise>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub display_order: u32,
    pub exercise_type: Uuid,
    pub exercise_id: Option<Uuid>,
    pub sets: u32,
    pub reps: u32,
    pub time: u32,
    pub rest: u32,
    pub weight: Option<f32>,
    pub weight_option: String,
}

impl From<&domain::ScheduledWorkout> for Workout {
    fn from(value: &domain::ScheduledWorkout) -> Self {
        let content = value.content();
        Self {
            id: *value.id,
            date: value.date,
            progression_plan_id: *value.progression_plan_id,
            state: match value.state {
                domain::WorkoutState::Empty => State::Empty,
                domain::WorkoutState::Materialized(_) => State::Materialized,
                domain::WorkoutState::Completed(_) => State::Completed,
            },
            progression_id: content.map(|c| *c.progression_id),
            title: content.map(|c| c.title.to_string()),
            sections: content
                .map(|c| c.sections.iter().map(Section::from).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<&domain::WorkoutSection> for Section {
    fn from(value: &domain::WorkoutSection) -> Self {
        Self {
            id: *value.id,
            display_order: value.display_order,
            section_type: *value.section_type,
            title: value.title.to_string(),
            rest: value.rest.into(),
            exercises: value
                .exercises
                .iter()
                .map(|e| Exercise {
                    id: *e.id,
                    display_order: e.display_order,
                    exercise_type: *e.exercise_type,
                    exercise_id: e.exercise_id.map(|id| *id),
                    sets: e.parameters.sets.into(),
                    reps: e.parameters.reps.into(),
                    time: e.parameters.time.into(),
                    rest: e.parameters.rest.into(),
                    weight: e.parameters.weight.map(Into::into),
                    weight_option: e.parameters.weight_option.as_ref().to_string(),
                })
                .collect(),
        }
    }
}

/// Sets a member logged for one exercise slot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggedExercise {
    pub workout_exercise_id: Uuid,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    pub sets: Vec<LoggedSet>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LoggedSet {
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub time: Option<u32>,
    #[serde(default)]
    pub weight: Option<f32>,
}

fn default_difficulty() -> u8 {
    domain::Difficulty::default() as u8
}

impl From<&domain::LoggedExercise> for LoggedExercise {
    fn from(value: &domain::LoggedExercise) -> Self {
        Self {
            workout_exercise_id: *value.workout_exercise_id,
            difficulty: value.difficulty as u8,
            sets: value
                .sets
                .iter()
                .map(|s| LoggedSet {
                    reps: s.reps.map(Into::into),
                    time: s.time.map(Into::into),
                    weight: s.weight.map(Into::into),
                })
                .collect(),
        }
    }
}

impl TryFrom<LoggedExercise> for domain::LoggedExercise {
    type Error = InputError;

    fn try_from(value: LoggedExercise) -> Result<Self, Self::Error> {
        Ok(Self {
            workout_exercise_id: value.workout_exercise_id.into(),
            difficulty: domain::Difficulty::try_from(value.difficulty)?,
            sets: (1..)
                .zip(value.sets)
                .map(|(set_number, set)| {
                    Ok(domain::LoggedSet {
                        set_number,
                        reps: set.reps.map(domain::Reps::new).transpose()?,
                        time: set.time.map(domain::Time::new).transpose()?,
                        weight: set.weight.map(domain::Weight::new).transpose()?,
                    })
                })
                .collect::<Result<_, InputError>>()?,
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum InputError {
    #[error(transparent)]
    Difficulty(#[from] domain::DifficultyError),
    #[error(transparent)]
    Reps(#[from] domain::RepsError),
    #[error(transparent)]
    Time(#[from] domain::TimeError),
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
}
