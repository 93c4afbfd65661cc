use crate::{
    CompletionError, Difficulty, ReadError, Reps, ScheduledWorkoutID, Time, UpdateError, UserID,
    Weight, WorkoutContent, WorkoutExerciseID,
};

#[allow(async_fn_in_trait)]
pub trait LogbookService {
    /// Records the logged sets, advances the session count of the workout's
    /// progression on first completion, marks the workout completed and
    /// materializes the next due workout.
    async fn complete_workout(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
        exercises: Vec<LoggedExercise>,
    ) -> Result<Option<ScheduledWorkoutID>, CompletionError>;

    async fn get_logged_sets(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
    ) -> Result<Vec<LoggedExercise>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait LogbookRepository {
    async fn read_logged_sets(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
    ) -> Result<Vec<LoggedExercise>, ReadError>;
    /// Replaces all sets previously logged for the same exercise slot.
    async fn replace_logged_sets(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
        exercise: LoggedExercise,
    ) -> Result<LoggedExercise, UpdateError>;
}

/// Results a member logged for one exercise slot of a workout.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedExercise {
    pub workout_exercise_id: WorkoutExerciseID,
    pub difficulty: Difficulty,
    pub sets: Vec<LoggedSet>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoggedSet {
    pub set_number: u32,
    pub reps: Option<Reps>,
    pub time: Option<Time>,
    pub weight: Option<Weight>,
}

/// Splits logged exercises into those belonging to a slot of the workout and
/// the ids of unknown slots.
#[must_use]
pub fn partition_logged_exercises(
    content: &WorkoutContent,
    exercises: Vec<LoggedExercise>,
) -> (Vec<LoggedExercise>, Vec<WorkoutExerciseID>) {
    let (known, unknown): (Vec<_>, Vec<_>) = exercises.into_iter().partition(|logged| {
        content
            .exercises()
            .any(|e| e.id == logged.workout_exercise_id)
    });
    (
        known,
        unknown.into_iter().map(|e| e.workout_exercise_id).collect(),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{SetParameters, Title, WorkoutExercise, WorkoutSection};

    use super::*;

    fn logged(id: u128) -> LoggedExercise {
        LoggedExercise {
            workout_exercise_id: id.into(),
            difficulty: Difficulty::Hard,
            sets: vec![
                LoggedSet {
                    set_number: 1,
                    reps: Some(Reps::new(10).unwrap()),
                    time: None,
                    weight: Some(Weight::new(40.0).unwrap()),
                },
                LoggedSet {
                    set_number: 2,
                    reps: Some(Reps::new(8).unwrap()),
                    time: None,
                    weight: Some(Weight::new(40.0).unwrap()),
                },
            ],
        }
    }

    #[test]
    fn test_partition_logged_exercises() {
        let content = WorkoutContent {
            progression_id: 1.into(),
            title: Title::new("Upper Body").unwrap(),
            sections: vec![WorkoutSection {
                id: 1.into(),
                display_order: 1,
                section_type: 1.into(),
                title: Title::new("Main").unwrap(),
                rest: Time::default(),
                exercises: vec![1, 2]
                    .into_iter()
                    .map(|id| WorkoutExercise {
                        id: id.into(),
                        display_order: 1,
                        exercise_type: 1.into(),
                        exercise_id: None,
                        parameters: SetParameters::default(),
                    })
                    .collect(),
            }],
        };
        assert_eq!(
            partition_logged_exercises(&content, vec![logged(2), logged(3), logged(1)]),
            (
                vec![logged(2), logged(1)],
                vec![WorkoutExerciseID::from(3)]
            )
        );
    }
}
