//! JSON representation of the training catalog.

use std::str::FromStr;

use uuid::Uuid;

use repcoach_domain as domain;

pub fn parse_catalog(json: &str) -> Result<domain::Catalog, SeedError> {
    let catalog: Catalog = serde_json::from_str(json)?;
    domain::Catalog::try_from(catalog)
}

pub fn serialize_catalog(catalog: &domain::Catalog) -> Result<String, SeedError> {
    Ok(serde_json::to_string_pretty(&Catalog::from(catalog))?)
}

#[derive(thiserror::Error, Debug)]
pub enum SeedError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Title(#[from] domain::TitleError),
    #[error(transparent)]
    Sets(#[from] domain::SetsError),
    #[error(transparent)]
    Reps(#[from] domain::RepsError),
    #[error(transparent)]
    Time(#[from] domain::TimeError),
    #[error(transparent)]
    Weight(#[from] domain::WeightError),
    #[error("invalid weight option: {0}")]
    WeightOption(String),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Catalog {
    pub exercises: Vec<Exercise>,
    pub plans: Vec<ProgressionPlan>,
    pub plan_days: Vec<PlanDay>,
    pub progressions: Vec<Progression>,
    pub sessions: Vec<ProgressionSession>,
    pub skeletons: Vec<SkeletonWorkout>,
}

impl From<&domain::Catalog> for Catalog {
    fn from(value: &domain::Catalog) -> Self {
        Self {
            exercises: value.exercises.iter().map(Exercise::from).collect(),
            plans: value.plans.iter().map(ProgressionPlan::from).collect(),
            plan_days: value.plan_days.iter().map(PlanDay::from).collect(),
            progressions: value.progressions.iter().map(Progression::from).collect(),
            sessions: value.sessions.iter().map(ProgressionSession::from).collect(),
            skeletons: value.skeletons.iter().map(SkeletonWorkout::from).collect(),
        }
    }
}

impl TryFrom<Catalog> for domain::Catalog {
    type Error = SeedError;

    fn try_from(value: Catalog) -> Result<Self, Self::Error> {
        Ok(Self {
            exercises: value
                .exercises
                .into_iter()
                .map(domain::Exercise::try_from)
                .collect::<Result<_, _>>()?,
            plans: value
                .plans
                .into_iter()
                .map(domain::ProgressionPlan::try_from)
                .collect::<Result<_, _>>()?,
            plan_days: value.plan_days.into_iter().map(From::from).collect(),
            progressions: value
                .progressions
                .into_iter()
                .map(domain::Progression::try_from)
                .collect::<Result<_, _>>()?,
            sessions: value
                .sessions
                .into_iter()
                .map(domain::ProgressionSession::try_from)
                .collect::<Result<_, _>>()?,
            skeletons: value
                .skeletons
                .into_iter()
                .map(domain::SkeletonWorkout::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: Uuid,
    pub title: String,
    pub experience_level: u32,
    pub exercise_types: Vec<Uuid>,
    #[serde(default)]
    pub equipment: Vec<Uuid>,
    #[serde(default)]
    pub weight_option: Option<String>,
}

impl From<&domain::Exercise> for Exercise {
    fn from(value: &domain::Exercise) -> Self {
        Self {
            id: *value.id,
            title: value.title.to_string(),
            experience_level: *value.experience_level,
            exercise_types: value.exercise_types.iter().map(|t| **t).collect(),
            equipment: value.equipment.iter().map(|e| **e).collect(),
            weight_option: value.weight_option.map(|o| o.as_ref().to_string()),
        }
    }
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = SeedError;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: domain::Title::new(&value.title)?,
            experience_level: value.experience_level.into(),
            exercise_types: value.exercise_types.into_iter().map(From::from).collect(),
            equipment: value.equipment.into_iter().map(From::from).collect(),
            weight_option: value
                .weight_option
                .as_deref()
                .map(parse_weight_option)
                .transpose()?,
        })
    }
}

pub(crate) fn parse_weight_option(value: &str) -> Result<domain::WeightOption, SeedError> {
    domain::WeightOption::from_str(value).map_err(|_| SeedError::WeightOption(value.to_string()))
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgressionPlan {
    pub id: Uuid,
    pub title: String,
    pub days_per_week: u32,
}

impl From<&domain::ProgressionPlan> for ProgressionPlan {
    fn from(value: &domain::ProgressionPlan) -> Self {
        Self {
            id: *value.id,
            title: value.title.to_string(),
            days_per_week: value.days_per_week,
        }
    }
}

impl TryFrom<ProgressionPlan> for domain::ProgressionPlan {
    type Error = SeedError;

    fn try_from(value: ProgressionPlan) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: domain::Title::new(&value.title)?,
            days_per_week: value.days_per_week,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlanDay {
    pub plan_id: Uuid,
    pub day: u32,
    pub progression_id: Uuid,
}

impl From<&domain::PlanDay> for PlanDay {
    fn from(value: &domain::PlanDay) -> Self {
        Self {
            plan_id: *value.plan_id,
            day: value.day,
            progression_id: *value.progression_id,
        }
    }
}

impl From<PlanDay> for domain::PlanDay {
    fn from(value: PlanDay) -> Self {
        Self {
            plan_id: value.plan_id.into(),
            day: value.day,
            progression_id: value.progression_id.into(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Progression {
    pub id: Uuid,
    pub title: String,
    pub default_sets: u32,
    pub default_reps: u32,
    #[serde(default)]
    pub default_time: u32,
    #[serde(default)]
    pub default_rest: u32,
}

impl From<&domain::Progression> for Progression {
    fn from(value: &domain::Progression) -> Self {
        Self {
            id: *value.id,
            title: value.title.to_string(),
            default_sets: value.default_sets.into(),
            default_reps: value.default_reps.into(),
            default_time: value.default_time.into(),
            default_rest: value.default_rest.into(),
        }
    }
}

impl TryFrom<Progression> for domain::Progression {
    type Error = SeedError;

    fn try_from(value: Progression) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: domain::Title::new(&value.title)?,
            default_sets: domain::Sets::new(value.default_sets)?,
            default_reps: domain::Reps::new(value.default_reps)?,
            default_time: domain::Time::new(value.default_time)?,
            default_rest: domain::Time::new(value.default_rest)?,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ProgressionSession {
    pub progression_id: Uuid,
    pub day: u32,
    #[serde(default)]
    pub section_type: Option<Uuid>,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub time: Option<u32>,
    #[serde(default)]
    pub rest: Option<u32>,
    #[serde(default)]
    pub weight: Option<f32>,
}

impl From<&domain::ProgressionSession> for ProgressionSession {
    fn from(value: &domain::ProgressionSession) -> Self {
        Self {
            progression_id: *value.progression_id,
            day: value.day,
            section_type: value.section_type.map(|t| *t),
            sets: value.sets.map(Into::into),
            reps: value.reps.map(Into::into),
            time: value.time.map(Into::into),
            rest: value.rest.map(Into::into),
            weight: value.weight.map(Into::into),
        }
    }
}

impl TryFrom<ProgressionSession> for domain::ProgressionSession {
    type Error = SeedError;

    fn try_from(value: ProgressionSession) -> Result<Self, Self::Error> {
        Ok(Self {
            progression_id: value.progression_id.into(),
            day: value.day,
            section_type: value.section_type.map(From::from),
            sets: value.sets.map(domain::Sets::new).transpose()?,
            reps: value.reps.map(domain::Reps::new).transpose()?,
            time: value.time.map(domain::Time::new).transpose()?,
            rest: value.rest.map(domain::Time::new).transpose()?,
            weight: value.weight.map(domain::Weight::new).transpose()?,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SkeletonWorkout {
    pub id: Uuid,
    pub title: String,
    pub focus: Vec<Uuid>,
    pub sections: Vec<SkeletonSection>,
}

impl From<&domain::SkeletonWorkout> for SkeletonWorkout {
    fn from(value: &domain::SkeletonWorkout) -> Self {
        Self {
            id: *value.id,
            title: value.title.to_string(),
            focus: value.focus.iter().map(|p| **p).collect(),
            sections: value.sections.iter().map(SkeletonSection::from).collect(),
        }
    }
}

impl TryFrom<SkeletonWorkout> for domain::SkeletonWorkout {
    type Error = SeedError;

    fn try_from(value: SkeletonWorkout) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            title: domain::Title::new(&value.title)?,
            focus: value.focus.into_iter().map(From::from).collect(),
            sections: value
                .sections
                .into_iter()
                .map(domain::SkeletonSection::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SkeletonSection {
    pub id: Uuid,
    pub display_order: u32,
    pub section_type: Uuid,
    pub title: String,
    #[serde(default)]
    pub rest: u32,
    pub categories: Vec<SkeletonCategory>,
}

impl From<&domain::SkeletonSection> for SkeletonSection {
    fn from(value: &domain::SkeletonSection) -> Self {
        Self {
            id: *value.id,
            display_order: value.display_order,
            section_type: *value.section_type,
            title: value.title.to_string(),
            rest: value.rest.into(),
            categories: value
                .categories
                .iter()
                .map(|c| SkeletonCategory {
                    display_order: c.display_order,
                    exercise_type: *c.exercise_type,
                })
                .collect(),
        }
    }
}

impl TryFrom<SkeletonSection> for domain::SkeletonSection {
    type Error = SeedError;

    fn try_from(value: SkeletonSection) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            display_order: value.display_order,
            section_type: value.section_type.into(),
            title: domain::Title::new(&value.title)?,
            rest: domain::Time::new(value.rest)?,
            categories: value
                .categories
                .into_iter()
                .map(|c| domain::SkeletonCategory {
                    display_order: c.display_order,
                    exercise_type: c.exercise_type.into(),
                })
                .collect(),
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonCategory {
    pub display_order: u32,
    pub exercise_type: Uuid,
}
