use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use log::debug;
use repcoach_domain as domain;

use crate::CatalogStore;

/// Keeps catalog and member data in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    catalog: domain::Catalog,
    profiles: BTreeMap<domain::UserID, domain::UserProfile>,
    available_exercises: BTreeMap<domain::UserID, BTreeSet<domain::ExerciseID>>,
    user_progressions: BTreeMap<(domain::UserID, domain::ProgressionID), domain::UserProgression>,
    workouts: BTreeMap<domain::ScheduledWorkoutID, domain::ScheduledWorkout>,
    logbook: BTreeMap<
        (domain::ScheduledWorkoutID, domain::WorkoutExerciseID),
        (domain::UserID, domain::LoggedExercise),
    >,
}

impl MemoryStore {
    #[must_use]
    pub fn new(catalog: domain::Catalog) -> Self {
        Self {
            state: Mutex::new(State {
                catalog,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, domain::StorageError> {
        self.state
            .lock()
            .map_err(|err| domain::StorageError::Other(err.to_string().into()))
    }
}

impl CatalogStore for MemoryStore {
    async fn import_catalog(&self, catalog: &domain::Catalog) -> Result<(), domain::UpdateError> {
        self.state()?.catalog = catalog.clone();
        debug!(
            "imported catalog with {} exercises",
            catalog.exercises.len()
        );
        Ok(())
    }

    async fn export_catalog(&self) -> Result<domain::Catalog, domain::ReadError> {
        Ok(self.state()?.catalog.clone())
    }
}

impl domain::UserRepository for MemoryStore {
    async fn read_user_profile(
        &self,
        id: domain::UserID,
    ) -> Result<domain::UserProfile, domain::ReadError> {
        self.state()?
            .profiles
            .get(&id)
            .cloned()
            .ok_or(domain::ReadError::NotFound)
    }

    async fn create_user_profile(
        &self,
        profile: domain::UserProfile,
    ) -> Result<domain::UserProfile, domain::CreateError> {
        let mut state = self.state()?;
        if state.profiles.contains_key(&profile.user_id) {
            return Err(domain::CreateError::Conflict);
        }
        state.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn replace_user_profile(
        &self,
        profile: domain::UserProfile,
    ) -> Result<domain::UserProfile, domain::UpdateError> {
        let mut state = self.state()?;
        let Some(entry) = state.profiles.get_mut(&profile.user_id) else {
            return Err(domain::UpdateError::NotFound);
        };
        *entry = profile.clone();
        Ok(profile)
    }
}

impl domain::ExerciseRepository for MemoryStore {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self.state()?.catalog.exercises.clone())
    }

    async fn read_exercises_of_type(
        &self,
        exercise_type: domain::ExerciseTypeID,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        Ok(self
            .state()?
            .catalog
            .exercises
            .iter()
            .filter(|e| e.exercise_types.contains(&exercise_type))
            .cloned()
            .collect())
    }
}

impl domain::AvailableExerciseRepository for MemoryStore {
    async fn read_available_exercises(
        &self,
        user_id: domain::UserID,
    ) -> Result<BTreeSet<domain::ExerciseID>, domain::ReadError> {
        Ok(self
            .state()?
            .available_exercises
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_available_exercises(
        &self,
        user_id: domain::UserID,
        exercises: BTreeSet<domain::ExerciseID>,
    ) -> Result<usize, domain::UpdateError> {
        let count = exercises.len();
        self.state()?.available_exercises.insert(user_id, exercises);
        Ok(count)
    }
}

impl domain::ProgressionRepository for MemoryStore {
    async fn read_progression_plan(
        &self,
        id: domain::ProgressionPlanID,
    ) -> Result<domain::ProgressionPlan, domain::ReadError> {
        self.state()?
            .catalog
            .plan(id)
            .cloned()
            .ok_or(domain::ReadError::NotFound)
    }

    async fn read_plan_day_progression(
        &self,
        plan_id: domain::ProgressionPlanID,
        day: u32,
    ) -> Result<Option<domain::Progression>, domain::ReadError> {
        Ok(self
            .state()?
            .catalog
            .plan_day_progression(plan_id, day)
            .cloned())
    }

    async fn read_progression(
        &self,
        id: domain::ProgressionID,
    ) -> Result<Option<domain::Progression>, domain::ReadError> {
        Ok(self.state()?.catalog.progression(id).cloned())
    }

    async fn read_progression_sessions(
        &self,
        id: domain::ProgressionID,
    ) -> Result<Vec<domain::ProgressionSession>, domain::ReadError> {
        Ok(self.state()?.catalog.sessions_of(id))
    }
}

impl domain::UserProgressionRepository for MemoryStore {
    async fn read_user_progression(
        &self,
        user_id: domain::UserID,
        progression_id: domain::ProgressionID,
    ) -> Result<Option<domain::UserProgression>, domain::ReadError> {
        Ok(self
            .state()?
            .user_progressions
            .get(&(user_id, progression_id))
            .copied())
    }

    async fn create_user_progression(
        &self,
        user_id: domain::UserID,
        progression_id: domain::ProgressionID,
    ) -> Result<domain::UserProgression, domain::CreateError> {
        let mut state = self.state()?;
        if state
            .user_progressions
            .contains_key(&(user_id, progression_id))
        {
            return Err(domain::CreateError::Conflict);
        }
        let user_progression = domain::UserProgression {
            user_id,
            progression_id,
            session_count: 1,
        };
        state
            .user_progressions
            .insert((user_id, progression_id), user_progression);
        Ok(user_progression)
    }

    async fn increment_session_count(
        &self,
        user_id: domain::UserID,
        progression_id: domain::ProgressionID,
    ) -> Result<domain::UserProgression, domain::UpdateError> {
        let mut state = self.state()?;
        let Some(user_progression) = state.user_progressions.get_mut(&(user_id, progression_id))
        else {
            return Err(domain::UpdateError::NotFound);
        };
        user_progression.session_count += 1;
        Ok(*user_progression)
    }
}

impl domain::SkeletonRepository for MemoryStore {
    async fn read_skeleton_for_progression(
        &self,
        progression_id: domain::ProgressionID,
    ) -> Result<Option<domain::SkeletonWorkout>, domain::ReadError> {
        Ok(self.state()?.catalog.skeleton_for(progression_id).cloned())
    }
}

impl domain::WorkoutRepository for MemoryStore {
    async fn read_scheduled_workouts(
        &self,
        user_id: domain::UserID,
    ) -> Result<Vec<domain::ScheduledWorkout>, domain::ReadError> {
        let mut workouts = self
            .state()?
            .workouts
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        workouts.sort_by_key(|w| (w.date, w.id));
        Ok(workouts)
    }

    async fn read_scheduled_workout(
        &self,
        id: domain::ScheduledWorkoutID,
    ) -> Result<domain::ScheduledWorkout, domain::ReadError> {
        self.state()?
            .workouts
            .get(&id)
            .cloned()
            .ok_or(domain::ReadError::NotFound)
    }

    async fn create_scheduled_workouts(
        &self,
        user_id: domain::UserID,
        plan_id: domain::ProgressionPlanID,
        dates: Vec<NaiveDate>,
    ) -> Result<Vec<domain::ScheduledWorkout>, domain::CreateError> {
        let mut state = self.state()?;
        let workouts = dates
            .into_iter()
            .map(|date| domain::ScheduledWorkout {
                id: domain::ScheduledWorkoutID::new_v4(),
                user_id,
                date,
                progression_plan_id: plan_id,
                state: domain::WorkoutState::Empty,
            })
            .collect::<Vec<_>>();
        for workout in &workouts {
            state.workouts.insert(workout.id, workout.clone());
        }
        Ok(workouts)
    }

    async fn replace_scheduled_workout(
        &self,
        workout: domain::ScheduledWorkout,
    ) -> Result<domain::ScheduledWorkout, domain::UpdateError> {
        let mut state = self.state()?;
        let Some(entry) = state.workouts.get_mut(&workout.id) else {
            return Err(domain::UpdateError::NotFound);
        };
        *entry = workout.clone();
        Ok(workout)
    }

    async fn delete_pending_workouts(
        &self,
        user_id: domain::UserID,
        from: NaiveDate,
    ) -> Result<usize, domain::DeleteError> {
        let mut state = self.state()?;
        let pending = state
            .workouts
            .values()
            .filter(|w| w.user_id == user_id && !w.is_completed() && w.date >= from)
            .map(|w| w.id)
            .collect::<BTreeSet<_>>();
        state.workouts.retain(|id, _| !pending.contains(id));
        state
            .logbook
            .retain(|(workout_id, _), _| !pending.contains(workout_id));
        Ok(pending.len())
    }
}

impl domain::LogbookRepository for MemoryStore {
    async fn read_logged_sets(
        &self,
        user_id: domain::UserID,
        workout_id: domain::ScheduledWorkoutID,
    ) -> Result<Vec<domain::LoggedExercise>, domain::ReadError> {
        Ok(self
            .state()?
            .logbook
            .iter()
            .filter(|((id, _), (user, _))| *id == workout_id && *user == user_id)
            .map(|(_, (_, logged))| logged.clone())
            .collect())
    }

    async fn replace_logged_sets(
        &self,
        user_id: domain::UserID,
        workout_id: domain::ScheduledWorkoutID,
        exercise: domain::LoggedExercise,
    ) -> Result<domain::LoggedExercise, domain::UpdateError> {
        self.state()?.logbook.insert(
            (workout_id, exercise.workout_exercise_id),
            (user_id, exercise.clone()),
        );
        Ok(exercise)
    }
}
