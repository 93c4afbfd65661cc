use std::collections::BTreeSet;

use crate::{
    AvailableEquipment, ExperienceLevel, ReadError, Title, UpdateError, UserID, WeightOption,
};

#[allow(async_fn_in_trait)]
pub trait ExerciseSelectionService {
    /// Picks one exercise of the given type that the member is eligible for and
    /// has the equipment for. `Ok(None)` means that no exercise qualifies.
    async fn select_exercise(
        &self,
        user_id: UserID,
        available_equipment: &AvailableEquipment,
        exercise_type: ExerciseTypeID,
    ) -> Result<Option<Exercise>, ReadError>;

    /// Replaces the member's eligible exercises by every catalog exercise at or
    /// below the member's experience level. Returns the number of eligible exercises.
    async fn assign_available_exercises(&self, user_id: UserID) -> Result<usize, UpdateError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn read_exercises_of_type(
        &self,
        exercise_type: ExerciseTypeID,
    ) -> Result<Vec<Exercise>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait AvailableExerciseRepository {
    async fn read_available_exercises(
        &self,
        user_id: UserID,
    ) -> Result<BTreeSet<ExerciseID>, ReadError>;
    async fn replace_available_exercises(
        &self,
        user_id: UserID,
        exercises: BTreeSet<ExerciseID>,
    ) -> Result<usize, UpdateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub title: Title,
    pub experience_level: ExperienceLevel,
    pub exercise_types: BTreeSet<ExerciseTypeID>,
    pub equipment: BTreeSet<EquipmentID>,
    pub weight_option: Option<WeightOption>,
}

impl Exercise {
    #[must_use]
    pub fn is_suitable(
        &self,
        exercise_type: ExerciseTypeID,
        available: &BTreeSet<ExerciseID>,
        available_equipment: &AvailableEquipment,
    ) -> bool {
        self.exercise_types.contains(&exercise_type)
            && available.contains(&self.id)
            && available_equipment.permits(&self.equipment)
    }
}

crate::id_type!(ExerciseID);
crate::id_type!(ExerciseTypeID);
crate::id_type!(EquipmentID);

/// Exercises a member of the given experience level may be assigned.
#[must_use]
pub fn eligible_exercises(
    exercises: &[Exercise],
    experience_level: ExperienceLevel,
) -> BTreeSet<ExerciseID> {
    exercises
        .iter()
        .filter(|e| e.experience_level <= experience_level)
        .map(|e| e.id)
        .collect()
}

/// Candidates for an exercise slot, ordered by title.
#[must_use]
pub fn selection_candidates(
    exercises: Vec<Exercise>,
    exercise_type: ExerciseTypeID,
    available: &BTreeSet<ExerciseID>,
    available_equipment: &AvailableEquipment,
) -> Vec<Exercise> {
    let mut candidates = exercises
        .into_iter()
        .filter(|e| e.is_suitable(exercise_type, available, available_equipment))
        .collect::<Vec<_>>();
    candidates.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
    candidates
}
