use chrono::NaiveDate;

use crate::{
    CreateError, DeleteError, Exercise, ExerciseID, ExerciseTypeID, GenerateError, ProgressionID,
    ProgressionPlanID, ReadError, SectionTypeID, SetParameters, Time, Title, UpdateError, UserID,
    WeightOption, WorkoutEditError,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutGeneratorService {
    /// Fills the member's next due workout from the skeleton of the current
    /// plan day. `Ok(None)` means that no workout is due or it is already filled.
    async fn materialize_next_workout(
        &self,
        user_id: UserID,
    ) -> Result<Option<ScheduledWorkoutID>, GenerateError>;

    async fn get_workout(
        &self,
        user_id: UserID,
        id: ScheduledWorkoutID,
    ) -> Result<ScheduledWorkout, ReadError>;

    /// Materialized, incomplete workouts dated today or later.
    async fn get_upcoming_workouts(
        &self,
        user_id: UserID,
    ) -> Result<Vec<ScheduledWorkout>, ReadError>;

    /// Puts an exercise chosen by the member into a materialized workout that
    /// is not completed yet. Returns the slot holding the exercise.
    async fn add_featured_exercise(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
        featured: FeaturedExercise,
    ) -> Result<WorkoutExerciseID, WorkoutEditError>;
}

#[allow(async_fn_in_trait)]
pub trait WorkoutRepository {
    async fn read_scheduled_workouts(
        &self,
        user_id: UserID,
    ) -> Result<Vec<ScheduledWorkout>, ReadError>;
    async fn read_scheduled_workout(
        &self,
        id: ScheduledWorkoutID,
    ) -> Result<ScheduledWorkout, ReadError>;
    async fn create_scheduled_workouts(
        &self,
        user_id: UserID,
        plan_id: ProgressionPlanID,
        dates: Vec<NaiveDate>,
    ) -> Result<Vec<ScheduledWorkout>, CreateError>;
    async fn replace_scheduled_workout(
        &self,
        workout: ScheduledWorkout,
    ) -> Result<ScheduledWorkout, UpdateError>;
    /// Deletes the member's incomplete workouts dated on or after `from`,
    /// including their sections and exercises.
    async fn delete_pending_workouts(
        &self,
        user_id: UserID,
        from: NaiveDate,
    ) -> Result<usize, DeleteError>;
}

crate::id_type!(ScheduledWorkoutID);
crate::id_type!(WorkoutSectionID);
crate::id_type!(WorkoutExerciseID);

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledWorkout {
    pub id: ScheduledWorkoutID,
    pub user_id: UserID,
    pub date: NaiveDate,
    pub progression_plan_id: ProgressionPlanID,
    pub state: WorkoutState,
}

impl ScheduledWorkout {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.state, WorkoutState::Completed(_))
    }

    #[must_use]
    pub fn is_materialized(&self) -> bool {
        !matches!(self.state, WorkoutState::Empty)
    }

    #[must_use]
    pub fn content(&self) -> Option<&WorkoutContent> {
        match &self.state {
            WorkoutState::Empty => None,
            WorkoutState::Materialized(content) | WorkoutState::Completed(content) => {
                Some(content)
            }
        }
    }

    #[must_use]
    pub fn progression_id(&self) -> Option<ProgressionID> {
        self.content().map(|c| c.progression_id)
    }

    pub fn materialize(self, content: WorkoutContent) -> Result<Self, TransitionError> {
        match self.state {
            WorkoutState::Empty => Ok(Self {
                state: WorkoutState::Materialized(content),
                ..self
            }),
            WorkoutState::Materialized(_) => Err(TransitionError::AlreadyMaterialized),
            WorkoutState::Completed(_) => Err(TransitionError::AlreadyCompleted),
        }
    }

    /// Content that can still be changed, which is only the case while the
    /// workout is materialized.
    pub fn editable_content(&mut self) -> Result<&mut WorkoutContent, TransitionError> {
        match &mut self.state {
            WorkoutState::Empty => Err(TransitionError::NotMaterialized),
            WorkoutState::Materialized(content) => Ok(content),
            WorkoutState::Completed(_) => Err(TransitionError::AlreadyCompleted),
        }
    }

    /// Completing an already completed workout leaves it unchanged.
    pub fn complete(self) -> Result<Self, TransitionError> {
        match self.state {
            WorkoutState::Empty => Err(TransitionError::NotMaterialized),
            WorkoutState::Materialized(content) => Ok(Self {
                state: WorkoutState::Completed(content),
                ..self
            }),
            WorkoutState::Completed(_) => Ok(self),
        }
    }
}

/// Lifecycle of a scheduled workout: empty, then materialized, then completed.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutState {
    Empty,
    Materialized(WorkoutContent),
    Completed(WorkoutContent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutContent {
    pub progression_id: ProgressionID,
    pub title: Title,
    pub sections: Vec<WorkoutSection>,
}

impl WorkoutContent {
    pub fn exercises(&self) -> impl Iterator<Item = &WorkoutExercise> {
        self.sections.iter().flat_map(|s| s.exercises.iter())
    }

    /// Appends a slot for the exercise after the last slot of a section,
    /// taking over the parameters of that slot.
    pub fn add_to_section(
        &mut self,
        section_id: WorkoutSectionID,
        exercise: &Exercise,
    ) -> Result<WorkoutExerciseID, SlotError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or(SlotError::UnknownSection(section_id))?;
        let last = section
            .exercises
            .iter()
            .max_by_key(|e| e.display_order)
            .ok_or(SlotError::EmptySection(section_id))?;
        let mut slot = WorkoutExercise {
            id: WorkoutExerciseID::new_v4(),
            display_order: last.display_order + 1,
            ..last.clone()
        };
        slot.assign(exercise);
        let id = slot.id;
        section.exercises.push(slot);
        Ok(id)
    }

    pub fn replace_exercise(
        &mut self,
        slot_id: WorkoutExerciseID,
        exercise: &Exercise,
    ) -> Result<(), SlotError> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.exercises.iter_mut())
            .find(|e| e.id == slot_id)
            .ok_or(SlotError::UnknownSlot(slot_id))?
            .assign(exercise);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSection {
    pub id: WorkoutSectionID,
    pub display_order: u32,
    pub section_type: SectionTypeID,
    pub title: Title,
    pub rest: Time,
    pub exercises: Vec<WorkoutExercise>,
}

/// Exercise slot of a workout. Slots without a matching exercise keep
/// `exercise_id` empty but still carry parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub id: WorkoutExerciseID,
    pub display_order: u32,
    pub exercise_type: ExerciseTypeID,
    pub exercise_id: Option<ExerciseID>,
    pub parameters: SetParameters,
}

impl WorkoutExercise {
    /// The slot keeps its exercise type if the exercise has it.
    fn assign(&mut self, exercise: &Exercise) {
        self.exercise_id = Some(exercise.id);
        if !exercise.exercise_types.contains(&self.exercise_type) {
            self.exercise_type = exercise
                .exercise_types
                .first()
                .copied()
                .unwrap_or(self.exercise_type);
        }
        self.parameters.weight_option = exercise.weight_option.unwrap_or_default();
        if self.parameters.weight_option == WeightOption::Bodyweight {
            self.parameters.weight = None;
        }
    }
}

/// Member's change of a materialized workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeaturedExercise {
    AddToSection {
        section_id: WorkoutSectionID,
        exercise_id: ExerciseID,
    },
    Replace {
        workout_exercise_id: WorkoutExerciseID,
        exercise_id: ExerciseID,
    },
}

impl FeaturedExercise {
    #[must_use]
    pub fn exercise_id(&self) -> ExerciseID {
        match self {
            FeaturedExercise::AddToSection { exercise_id, .. }
            | FeaturedExercise::Replace { exercise_id, .. } => *exercise_id,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SlotError {
    #[error("unknown section {0}")]
    UnknownSection(WorkoutSectionID),
    #[error("section {0} has no exercise slot")]
    EmptySection(WorkoutSectionID),
    #[error("unknown exercise slot {0}")]
    UnknownSlot(WorkoutExerciseID),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TransitionError {
    #[error("workout is not materialized")]
    NotMaterialized,
    #[error("workout is already materialized")]
    AlreadyMaterialized,
    #[error("workout is already completed")]
    AlreadyCompleted,
}

/// Finds the workout of a plan to materialize next.
///
/// Workouts of other plans are ignored. If the member has completed a workout
/// of the plan on or before today, the earliest incomplete workout dated on or
/// after that completed one is due. Otherwise the earliest incomplete workout
/// dated on or before today is due.
#[must_use]
pub fn next_due_workout(
    workouts: &[ScheduledWorkout],
    plan_id: ProgressionPlanID,
    today: NaiveDate,
) -> Option<&ScheduledWorkout> {
    let of_plan = move || {
        workouts
            .iter()
            .filter(move |w| w.progression_plan_id == plan_id)
    };
    let previous = of_plan()
        .filter(|w| w.is_completed() && w.date <= today)
        .max_by_key(|w| w.date);
    let incomplete = of_plan().filter(|w| !w.is_completed());
    match previous {
        Some(previous) => incomplete
            .filter(|w| w.date >= previous.date)
            .min_by_key(|w| (w.date, w.id)),
        None => incomplete
            .filter(|w| w.date <= today)
            .min_by_key(|w| (w.date, w.id)),
    }
}
