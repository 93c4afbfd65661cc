use crate::{
    ExerciseID, ProgressionID, ProgressionPlanID, SlotError, TransitionError, WorkoutDaysError,
};

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("conflict")]
    Conflict,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<UpdateError> for CreateError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::Conflict | UpdateError::NotFound => CreateError::Conflict,
            UpdateError::Storage(storage) => CreateError::Storage(storage),
            UpdateError::Other(other) => CreateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UpdateError {
    #[error("conflict")]
    Conflict,
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for UpdateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => UpdateError::NotFound,
            ReadError::Storage(storage) => UpdateError::Storage(storage),
            ReadError::Other(other) => UpdateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DeleteError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

/// Rejections reported before any schedule mutation happens.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("You must select {required} days a week for the {plan} Plan.")]
    DaysPerWeek {
        required: u32,
        selected: usize,
        plan: String,
    },
    #[error(transparent)]
    WorkoutDays(#[from] WorkoutDaysError),
    #[error("no progression plan assigned")]
    NoPlan,
    #[error("unknown progression plan")]
    UnknownPlan,
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CatalogMiss {
    #[error("no progression for day {day} of plan {plan:?}")]
    Progression { plan: ProgressionPlanID, day: u32 },
    #[error("no defaults for progression {0:?}")]
    ProgressionDefaults(ProgressionID),
    #[error("no skeleton workout for progression {progression:?}")]
    Skeleton { progression: ProgressionID },
}

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    CatalogMiss(#[from] CatalogMiss),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for GenerateError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => GenerateError::NotFound,
            ReadError::Storage(storage) => GenerateError::Storage(storage),
            ReadError::Other(other) => GenerateError::Other(other),
        }
    }
}

impl From<CreateError> for GenerateError {
    fn from(value: CreateError) -> Self {
        match value {
            CreateError::Conflict => GenerateError::Other("conflict".into()),
            CreateError::Storage(storage) => GenerateError::Storage(storage),
            CreateError::Other(other) => GenerateError::Other(other),
        }
    }
}

impl From<UpdateError> for GenerateError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => GenerateError::NotFound,
            UpdateError::Conflict => GenerateError::Other("conflict".into()),
            UpdateError::Storage(storage) => GenerateError::Storage(storage),
            UpdateError::Other(other) => GenerateError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PlanChangeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for PlanChangeError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => PlanChangeError::NotFound,
            ReadError::Storage(storage) => PlanChangeError::Storage(storage),
            ReadError::Other(other) => PlanChangeError::Other(other),
        }
    }
}

impl From<CreateError> for PlanChangeError {
    fn from(value: CreateError) -> Self {
        PlanChangeError::Generate(value.into())
    }
}

impl From<UpdateError> for PlanChangeError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => PlanChangeError::NotFound,
            UpdateError::Conflict => PlanChangeError::Other("conflict".into()),
            UpdateError::Storage(storage) => PlanChangeError::Storage(storage),
            UpdateError::Other(other) => PlanChangeError::Other(other),
        }
    }
}

impl From<DeleteError> for PlanChangeError {
    fn from(value: DeleteError) -> Self {
        match value {
            DeleteError::Storage(storage) => PlanChangeError::Storage(storage),
            DeleteError::Other(other) => PlanChangeError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for CompletionError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => CompletionError::NotFound,
            ReadError::Storage(storage) => CompletionError::Storage(storage),
            ReadError::Other(other) => CompletionError::Other(other),
        }
    }
}

impl From<CreateError> for CompletionError {
    fn from(value: CreateError) -> Self {
        CompletionError::Generate(value.into())
    }
}

impl From<UpdateError> for CompletionError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => CompletionError::NotFound,
            UpdateError::Conflict => CompletionError::Other("conflict".into()),
            UpdateError::Storage(storage) => CompletionError::Storage(storage),
            UpdateError::Other(other) => CompletionError::Other(other),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WorkoutEditError {
    #[error("not found")]
    NotFound,
    #[error("unknown exercise {0}")]
    UnknownExercise(ExerciseID),
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl From<ReadError> for WorkoutEditError {
    fn from(value: ReadError) -> Self {
        match value {
            ReadError::NotFound => WorkoutEditError::NotFound,
            ReadError::Storage(storage) => WorkoutEditError::Storage(storage),
            ReadError::Other(other) => WorkoutEditError::Other(other),
        }
    }
}

impl From<UpdateError> for WorkoutEditError {
    fn from(value: UpdateError) -> Self {
        match value {
            UpdateError::NotFound => WorkoutEditError::NotFound,
            UpdateError::Conflict => WorkoutEditError::Other("conflict".into()),
            UpdateError::Storage(storage) => WorkoutEditError::Storage(storage),
            UpdateError::Other(other) => WorkoutEditError::Other(other),
        }
    }
}
