use std::str::FromStr;

use log::{debug, error, info, warn};

use crate::{
    AvailableEquipment, AvailableExerciseRepository, CatalogMiss, Clock, CompletionError, Exercise,
    ExerciseRepository, ExerciseSelectionService, ExerciseTypeID, ExperienceLevel, FeaturedExercise,
    GenerateError,
    LocalClock, LogbookRepository, LogbookService, LoggedExercise, Onboarding, Pick,
    PlanChangeError, Progression, ProgressionPlan, ProgressionPlanID, ProgressionRepository,
    RandomPick, ReadError, ScheduleService, ScheduledWorkout, ScheduledWorkoutID,
    SetParameterRequest, SetParameterService, SetParameters, SkeletonRepository, SkeletonWorkout,
    UpdateError, UserID, UserProfile, UserProgressionRepository, UserRepository, ValidationError,
    WorkoutContent, WorkoutDays, WorkoutEditError, WorkoutExercise, WorkoutExerciseID,
    WorkoutGeneratorService,
    WorkoutRepository, WorkoutSection, WorkoutSectionID, eligible_exercises, next_due_workout,
    partition_logged_exercises, schedule_dates, selection_candidates,
};

pub struct Service<R, P = RandomPick, C = LocalClock> {
    repository: R,
    picker: P,
    clock: C,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            picker: RandomPick::from_entropy(),
            clock: LocalClock,
        }
    }
}

impl<R, P, C> Service<R, P, C> {
    pub fn with_picker<Q: Pick>(self, picker: Q) -> Service<R, Q, C> {
        Service {
            repository: self.repository,
            picker,
            clock: self.clock,
        }
    }

    pub fn with_clock<D: Clock>(self, clock: D) -> Service<R, P, D> {
        Service {
            repository: self.repository,
            picker: self.picker,
            clock,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R, P, C> ExerciseSelectionService for Service<R, P, C>
where
    R: ExerciseRepository + AvailableExerciseRepository + UserRepository,
    P: Pick,
{
    async fn select_exercise(
        &self,
        user_id: UserID,
        available_equipment: &AvailableEquipment,
        exercise_type: ExerciseTypeID,
    ) -> Result<Option<Exercise>, ReadError> {
        log_on_error!(
            self.pick_exercise(user_id, available_equipment, exercise_type),
            ReadError,
            "select",
            "exercise"
        )
    }

    async fn assign_available_exercises(&self, user_id: UserID) -> Result<usize, UpdateError> {
        log_on_error!(
            self.replace_available_exercises(user_id),
            UpdateError,
            "assign",
            "available exercises"
        )
    }
}

impl<R, P, C> Service<R, P, C>
where
    R: ExerciseRepository + AvailableExerciseRepository + UserRepository,
    P: Pick,
{
    async fn pick_exercise(
        &self,
        user_id: UserID,
        available_equipment: &AvailableEquipment,
        exercise_type: ExerciseTypeID,
    ) -> Result<Option<Exercise>, ReadError> {
        let exercises = self.repository.read_exercises_of_type(exercise_type).await?;
        let available = self.repository.read_available_exercises(user_id).await?;
        let candidates =
            selection_candidates(exercises, exercise_type, &available, available_equipment);
        debug!(
            "{} candidates for exercise type {exercise_type}",
            candidates.len()
        );
        Ok(self.picker.pick(candidates))
    }

    async fn replace_available_exercises(&self, user_id: UserID) -> Result<usize, UpdateError> {
        let profile = self.repository.read_user_profile(user_id).await?;
        let exercises = self.repository.read_exercises().await?;
        let eligible = eligible_exercises(&exercises, profile.experience_level);
        let count = self
            .repository
            .replace_available_exercises(user_id, eligible)
            .await?;
        info!(
            "assigned {count} exercises to user {user_id} (experience level {})",
            profile.experience_level
        );
        Ok(count)
    }
}

impl<R, P, C> SetParameterService for Service<R, P, C>
where
    R: ProgressionRepository + UserProgressionRepository,
{
    async fn resolve_set_parameters(
        &self,
        request: &SetParameterRequest,
    ) -> Result<SetParameters, GenerateError> {
        log_on_error!(
            self.resolve(request),
            GenerateError,
            "resolve",
            "set parameters"
        )
    }
}

impl<R, P, C> Service<R, P, C>
where
    R: ProgressionRepository + UserProgressionRepository,
{
    async fn resolve(&self, request: &SetParameterRequest) -> Result<SetParameters, GenerateError> {
        let progression = self
            .repository
            .read_progression(request.progression_id)
            .await?
            .ok_or(CatalogMiss::ProgressionDefaults(request.progression_id))?;
        let sessions = self
            .repository
            .read_progression_sessions(request.progression_id)
            .await?;
        let user_progression = match self
            .repository
            .read_user_progression(request.user_id, request.progression_id)
            .await?
        {
            Some(user_progression) => user_progression,
            None => {
                self.repository
                    .create_user_progression(request.user_id, request.progression_id)
                    .await?
            }
        };
        Ok(SetParameters::resolve(
            &progression,
            &sessions,
            user_progression.session_count,
            request.section_type,
            request.weight_option,
        ))
    }
}

impl<R, P, C> WorkoutGeneratorService for Service<R, P, C>
where
    R: UserRepository
        + ExerciseRepository
        + AvailableExerciseRepository
        + ProgressionRepository
        + UserProgressionRepository
        + SkeletonRepository
        + WorkoutRepository,
    P: Pick,
    C: Clock,
{
    async fn materialize_next_workout(
        &self,
        user_id: UserID,
    ) -> Result<Option<ScheduledWorkoutID>, GenerateError> {
        log_on_error!(
            self.materialize(user_id),
            GenerateError,
            "materialize",
            "workout"
        )
    }

    async fn get_workout(
        &self,
        user_id: UserID,
        id: ScheduledWorkoutID,
    ) -> Result<ScheduledWorkout, ReadError> {
        log_on_error!(
            self.read_own_workout(user_id, id),
            ReadError,
            "get",
            "workout"
        )
    }

    async fn get_upcoming_workouts(
        &self,
        user_id: UserID,
    ) -> Result<Vec<ScheduledWorkout>, ReadError> {
        let today = self.clock.today();
        let mut workouts = log_on_error!(
            self.repository.read_scheduled_workouts(user_id),
            ReadError,
            "get",
            "workouts"
        )?;
        workouts.retain(|w| w.is_materialized() && !w.is_completed() && w.date >= today);
        workouts.sort_by_key(|w| w.date);
        Ok(workouts)
    }

    async fn add_featured_exercise(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
        featured: FeaturedExercise,
    ) -> Result<WorkoutExerciseID, WorkoutEditError> {
        log_on_error!(
            self.feature_exercise(user_id, workout_id, featured),
            WorkoutEditError,
            "add",
            "featured exercise"
        )
    }
}

impl<R, P, C> Service<R, P, C>
where
    R: UserRepository
        + ExerciseRepository
        + AvailableExerciseRepository
        + ProgressionRepository
        + UserProgressionRepository
        + SkeletonRepository
        + WorkoutRepository,
    P: Pick,
    C: Clock,
{
    async fn materialize(
        &self,
        user_id: UserID,
    ) -> Result<Option<ScheduledWorkoutID>, GenerateError> {
        let profile = self.repository.read_user_profile(user_id).await?;
        let Some(plan_id) = profile.progression_plan_id else {
            debug!("no progression plan assigned to user {user_id}");
            return Ok(None);
        };
        let workouts = self.repository.read_scheduled_workouts(user_id).await?;
        let Some(workout) = next_due_workout(&workouts, plan_id, self.clock.today()).cloned()
        else {
            debug!("no workout due for user {user_id}");
            return Ok(None);
        };
        if workout.is_materialized() {
            debug!("workout {} is already materialized", workout.id);
            return Ok(None);
        }

        let day = profile.progression_plan_day;
        let progression = self
            .repository
            .read_plan_day_progression(plan_id, day)
            .await?
            .ok_or(CatalogMiss::Progression { plan: plan_id, day })?;
        let skeleton = self
            .repository
            .read_skeleton_for_progression(progression.id)
            .await?
            .ok_or(CatalogMiss::Skeleton {
                progression: progression.id,
            })?;

        let content = self.fill_skeleton(&profile, &progression, &skeleton).await?;
        let workout = workout.materialize(content)?;
        let id = workout.id;
        let date = workout.date;
        self.repository.replace_scheduled_workout(workout).await?;
        info!(
            "materialized workout {id} on {date} for user {user_id} from skeleton {}",
            skeleton.id
        );
        Ok(Some(id))
    }

    async fn fill_skeleton(
        &self,
        profile: &UserProfile,
        progression: &Progression,
        skeleton: &SkeletonWorkout,
    ) -> Result<WorkoutContent, GenerateError> {
        let mut sections = vec![];
        for (section_order, section) in (1..).zip(skeleton.ordered_sections()) {
            let mut exercises = vec![];
            for (exercise_order, category) in (1..).zip(section.ordered_categories()) {
                let exercise = self
                    .select_exercise(
                        profile.user_id,
                        &profile.available_equipment,
                        category.exercise_type,
                    )
                    .await?;
                if exercise.is_none() {
                    warn!(
                        "no exercise of type {} available for user {}",
                        category.exercise_type, profile.user_id
                    );
                }
                let parameters = self
                    .resolve_set_parameters(&SetParameterRequest {
                        user_id: profile.user_id,
                        progression_id: progression.id,
                        exercise_id: exercise.as_ref().map(|e| e.id),
                        weight_option: exercise.as_ref().and_then(|e| e.weight_option),
                        section_type: section.section_type,
                    })
                    .await?;
                exercises.push(WorkoutExercise {
                    id: WorkoutExerciseID::new_v4(),
                    display_order: exercise_order,
                    exercise_type: category.exercise_type,
                    exercise_id: exercise.map(|e| e.id),
                    parameters,
                });
            }
            sections.push(WorkoutSection {
                id: WorkoutSectionID::new_v4(),
                display_order: section_order,
                section_type: section.section_type,
                title: section.title.clone(),
                rest: section.rest,
                exercises,
            });
        }
        Ok(WorkoutContent {
            progression_id: progression.id,
            title: skeleton.title.clone(),
            sections,
        })
    }

    async fn feature_exercise(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
        featured: FeaturedExercise,
    ) -> Result<WorkoutExerciseID, WorkoutEditError> {
        let mut workout = self.read_own_workout(user_id, workout_id).await?;
        let exercise_id = featured.exercise_id();
        let exercise = self
            .repository
            .read_exercises()
            .await?
            .into_iter()
            .find(|e| e.id == exercise_id)
            .ok_or(WorkoutEditError::UnknownExercise(exercise_id))?;
        let content = workout.editable_content()?;
        let slot = match featured {
            FeaturedExercise::AddToSection { section_id, .. } => {
                content.add_to_section(section_id, &exercise)?
            }
            FeaturedExercise::Replace {
                workout_exercise_id,
                ..
            } => {
                content.replace_exercise(workout_exercise_id, &exercise)?;
                workout_exercise_id
            }
        };
        self.repository.replace_scheduled_workout(workout).await?;
        info!("put exercise {exercise_id} into slot {slot} of workout {workout_id}");
        Ok(slot)
    }

    async fn read_own_workout(
        &self,
        user_id: UserID,
        id: ScheduledWorkoutID,
    ) -> Result<ScheduledWorkout, ReadError> {
        let workout = self.repository.read_scheduled_workout(id).await?;
        if workout.user_id != user_id {
            return Err(ReadError::NotFound);
        }
        Ok(workout)
    }
}

impl<R, P, C> ScheduleService for Service<R, P, C>
where
    R: UserRepository
        + ExerciseRepository
        + AvailableExerciseRepository
        + ProgressionRepository
        + UserProgressionRepository
        + SkeletonRepository
        + WorkoutRepository,
    P: Pick,
    C: Clock,
{
    async fn rebuild_schedule(&self, user_id: UserID) -> Result<usize, PlanChangeError> {
        log_on_error!(
            self.rebuild(user_id),
            PlanChangeError,
            "rebuild",
            "schedule"
        )
    }

    async fn change_plan(
        &self,
        user_id: UserID,
        plan_id: ProgressionPlanID,
        workout_days: &str,
    ) -> Result<Option<ScheduledWorkoutID>, PlanChangeError> {
        log_on_error!(
            async {
                let workout_days = self.validate_plan(plan_id, workout_days).await?;
                let mut profile = self.repository.read_user_profile(user_id).await?;
                profile.progression_plan_id = Some(plan_id);
                profile.workout_days = workout_days;
                self.repository.replace_user_profile(profile).await?;
                self.regenerate(user_id).await
            },
            PlanChangeError,
            "change",
            "plan"
        )
    }

    async fn onboard(
        &self,
        user_id: UserID,
        onboarding: Onboarding,
    ) -> Result<Option<ScheduledWorkoutID>, PlanChangeError> {
        log_on_error!(
            async {
                let workout_days = self
                    .validate_plan(onboarding.plan_id, &onboarding.workout_days)
                    .await?;
                let mut profile = match self.repository.read_user_profile(user_id).await {
                    Ok(profile) => profile,
                    Err(ReadError::NotFound) => {
                        self.repository
                            .create_user_profile(UserProfile::new(user_id))
                            .await?
                    }
                    Err(err) => return Err(err.into()),
                };
                profile.progression_plan_id = Some(onboarding.plan_id);
                profile.workout_days = workout_days;
                profile.experience_level = onboarding.experience_level;
                profile.available_equipment = onboarding.available_equipment;
                self.repository.replace_user_profile(profile).await?;
                self.assign_available_exercises(user_id).await?;
                self.regenerate(user_id).await
            },
            PlanChangeError,
            "onboard",
            "user"
        )
    }

    async fn update_training_profile(
        &self,
        user_id: UserID,
        experience_level: ExperienceLevel,
        available_equipment: AvailableEquipment,
    ) -> Result<usize, PlanChangeError> {
        log_on_error!(
            async {
                let mut profile = self.repository.read_user_profile(user_id).await?;
                profile.experience_level = experience_level;
                profile.available_equipment = available_equipment;
                self.repository.replace_user_profile(profile).await?;
                Ok::<_, PlanChangeError>(self.assign_available_exercises(user_id).await?)
            },
            PlanChangeError,
            "update",
            "training profile"
        )
    }
}

impl<R, P, C> Service<R, P, C>
where
    R: UserRepository
        + ExerciseRepository
        + AvailableExerciseRepository
        + ProgressionRepository
        + UserProgressionRepository
        + SkeletonRepository
        + WorkoutRepository,
    P: Pick,
    C: Clock,
{
    async fn rebuild(&self, user_id: UserID) -> Result<usize, PlanChangeError> {
        let profile = self.repository.read_user_profile(user_id).await?;
        let plan_id = profile.progression_plan_id.ok_or(ValidationError::NoPlan)?;
        let today = self.clock.today();
        let deleted = self
            .repository
            .delete_pending_workouts(user_id, today)
            .await?;
        let dates = schedule_dates(&profile.workout_days, today);
        let created = self
            .repository
            .create_scheduled_workouts(user_id, plan_id, dates)
            .await?;
        info!(
            "rebuilt schedule of user {user_id}: {deleted} pending workouts removed, {} scheduled",
            created.len()
        );
        Ok(created.len())
    }

    async fn regenerate(
        &self,
        user_id: UserID,
    ) -> Result<Option<ScheduledWorkoutID>, PlanChangeError> {
        self.rebuild(user_id).await?;
        Ok(self.materialize_next_workout(user_id).await?)
    }

    async fn validate_plan(
        &self,
        plan_id: ProgressionPlanID,
        workout_days: &str,
    ) -> Result<WorkoutDays, PlanChangeError> {
        let workout_days = WorkoutDays::from_str(workout_days).map_err(ValidationError::from)?;
        let plan = match self.repository.read_progression_plan(plan_id).await {
            Ok(plan) => plan,
            Err(ReadError::NotFound) => return Err(ValidationError::UnknownPlan.into()),
            Err(err) => return Err(err.into()),
        };
        check_days_per_week(&plan, &workout_days)?;
        Ok(workout_days)
    }
}

fn check_days_per_week(
    plan: &ProgressionPlan,
    workout_days: &WorkoutDays,
) -> Result<(), ValidationError> {
    if usize::try_from(plan.days_per_week).ok() == Some(workout_days.len()) {
        return Ok(());
    }
    Err(ValidationError::DaysPerWeek {
        required: plan.days_per_week,
        selected: workout_days.len(),
        plan: plan.title.to_string(),
    })
}

impl<R, P, C> LogbookService for Service<R, P, C>
where
    R: UserRepository
        + ExerciseRepository
        + AvailableExerciseRepository
        + ProgressionRepository
        + UserProgressionRepository
        + SkeletonRepository
        + WorkoutRepository
        + LogbookRepository,
    P: Pick,
    C: Clock,
{
    async fn complete_workout(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
        exercises: Vec<LoggedExercise>,
    ) -> Result<Option<ScheduledWorkoutID>, CompletionError> {
        log_on_error!(
            self.record(user_id, workout_id, exercises),
            CompletionError,
            "complete",
            "workout"
        )
    }

    async fn get_logged_sets(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
    ) -> Result<Vec<LoggedExercise>, ReadError> {
        log_on_error!(
            async {
                self.read_own_workout(user_id, workout_id).await?;
                self.repository.read_logged_sets(user_id, workout_id).await
            },
            ReadError,
            "get",
            "logged sets"
        )
    }
}

impl<R, P, C> Service<R, P, C>
where
    R: UserRepository
        + ExerciseRepository
        + AvailableExerciseRepository
        + ProgressionRepository
        + UserProgressionRepository
        + SkeletonRepository
        + WorkoutRepository
        + LogbookRepository,
    P: Pick,
    C: Clock,
{
    async fn record(
        &self,
        user_id: UserID,
        workout_id: ScheduledWorkoutID,
        exercises: Vec<LoggedExercise>,
    ) -> Result<Option<ScheduledWorkoutID>, CompletionError> {
        let workout = self.read_own_workout(user_id, workout_id).await?;
        let first_completion = !workout.is_completed();
        let workout = workout.complete()?;
        let Some(content) = workout.content() else {
            return Err(CompletionError::Other("completed workout without content".into()));
        };
        let progression_id = content.progression_id;

        let (known, unknown) = partition_logged_exercises(content, exercises);
        for id in unknown {
            warn!("ignoring sets of unknown exercise slot {id} in workout {workout_id}");
        }
        for exercise in known {
            self.repository
                .replace_logged_sets(user_id, workout_id, exercise)
                .await?;
        }

        if first_completion {
            let user_progression = match self
                .repository
                .read_user_progression(user_id, progression_id)
                .await?
            {
                Some(_) => {
                    self.repository
                        .increment_session_count(user_id, progression_id)
                        .await?
                }
                None => {
                    self.repository
                        .create_user_progression(user_id, progression_id)
                        .await?
                }
            };
            debug!(
                "session count of user {user_id} for progression {progression_id} is {}",
                user_progression.session_count
            );
        }

        self.repository.replace_scheduled_workout(workout).await?;
        info!("completed workout {workout_id} of user {user_id}");

        Ok(self.materialize_next_workout(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::Title;

    use super::*;

    #[rstest]
    #[case("1,3,5", Ok(()))]
    #[case("1,3", Err(ValidationError::DaysPerWeek { required: 3, selected: 2, plan: "Foundation".to_string() }))]
    #[case("0,1,3,5", Err(ValidationError::DaysPerWeek { required: 3, selected: 4, plan: "Foundation".to_string() }))]
    fn test_check_days_per_week(#[case] days: &str, #[case] expected: Result<(), ValidationError>) {
        let plan = ProgressionPlan {
            id: 1.into(),
            title: Title::new("Foundation").unwrap(),
            days_per_week: 3,
        };
        assert_eq!(
            check_days_per_week(&plan, &WorkoutDays::from_str(days).unwrap()),
            expected
        );
    }

    #[test]
    fn test_service_defaults() {
        let service = Service::new(()).with_clock(crate::FixedClock(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));
        assert_eq!(
            service.clock.today(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(service.picker.pick(vec![1]), Some(1));
    }
}
