use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use repcoach_domain::{
    self as domain, LogbookRepository, LogbookService, ScheduleService, UserProgressionRepository,
    UserRepository, WorkoutGeneratorService, WorkoutRepository,
};

use crate::{
    CatalogStore, MemoryStore, SqliteStore,
    tests::data::{
        AIR_SQUAT, BAND_ROW, CATALOG, DUMBBELL_PRESS, EXPRESS, FOUNDATION, INTENSIVE, INVERTED_ROW,
        LEGS, MAIN, NEXT_MONDAY, PLANK, PULL, PUSH, PUSH_UP, STRENGTH_BASE, TODAY, USER_ID, WARMUP,
        onboarding,
    },
};

trait Store:
    CatalogStore
    + domain::UserRepository
    + domain::ExerciseRepository
    + domain::AvailableExerciseRepository
    + domain::ProgressionRepository
    + domain::UserProgressionRepository
    + domain::SkeletonRepository
    + domain::WorkoutRepository
    + domain::LogbookRepository
{
}

impl<T> Store for T where
    T: CatalogStore
        + domain::UserRepository
        + domain::ExerciseRepository
        + domain::AvailableExerciseRepository
        + domain::ProgressionRepository
        + domain::UserProgressionRepository
        + domain::SkeletonRepository
        + domain::WorkoutRepository
        + domain::LogbookRepository
{
}

type TestService<S> = domain::Service<S, domain::FirstPick, domain::FixedClock>;

fn service<S: Store>(store: S) -> TestService<S> {
    domain::Service::new(store)
        .with_picker(domain::FirstPick)
        .with_clock(domain::FixedClock(TODAY))
}

async fn memory_store() -> MemoryStore {
    MemoryStore::new(CATALOG.clone())
}

async fn sqlite_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.import_catalog(&CATALOG).await.unwrap();
    store
}

async fn onboarded<S: Store>(store: S) -> (TestService<S>, domain::ScheduledWorkoutID) {
    let service = service(store);
    let id = service
        .onboard(USER_ID.into(), onboarding("1,3,5", ""))
        .await
        .unwrap()
        .unwrap();
    (service, id)
}

fn assigned_exercises(workout: &domain::ScheduledWorkout) -> Vec<Option<domain::ExerciseID>> {
    workout
        .content()
        .unwrap()
        .exercises()
        .map(|e| e.exercise_id)
        .collect()
}

fn exercise_ids(ids: &[u128]) -> Vec<Option<domain::ExerciseID>> {
    ids.iter().map(|id| Some((*id).into())).collect()
}

fn logged_exercises(workout: &domain::ScheduledWorkout) -> Vec<domain::LoggedExercise> {
    let mut logged = workout
        .content()
        .unwrap()
        .exercises()
        .map(|e| domain::LoggedExercise {
            workout_exercise_id: e.id,
            difficulty: domain::Difficulty::Hard,
            sets: (1..=u32::from(e.parameters.sets))
                .map(|set_number| domain::LoggedSet {
                    set_number,
                    reps: Some(e.parameters.reps),
                    time: None,
                    weight: e.parameters.weight,
                })
                .collect(),
        })
        .collect::<Vec<_>>();
    logged.sort_by_key(|l| l.workout_exercise_id);
    logged
}

async fn test_onboard_schedules_and_materializes<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;
    let repository = service.repository();

    let workouts = repository
        .read_scheduled_workouts(USER_ID.into())
        .await
        .unwrap();
    assert_eq!(workouts.len(), 39);
    assert_eq!(workouts.iter().filter(|w| w.is_materialized()).count(), 1);
    assert!(workouts.iter().all(|w| w.date >= TODAY));

    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    assert_eq!(workout.date, TODAY);
    let content = workout.content().unwrap();
    assert_eq!(content.title.to_string(), "Full Body");
    assert_eq!(content.progression_id, STRENGTH_BASE.into());
    assert_eq!(
        content
            .sections
            .iter()
            .map(|s| (s.display_order, s.section_type, s.exercises.len()))
            .collect::<Vec<_>>(),
        vec![
            (1, domain::SectionTypeID::from(WARMUP), 1),
            (2, domain::SectionTypeID::from(MAIN), 3)
        ]
    );
    assert_eq!(
        assigned_exercises(&workout),
        exercise_ids(&[PLANK, DUMBBELL_PRESS, BAND_ROW, AIR_SQUAT])
    );
    for exercise in content.exercises() {
        assert_eq!(u32::from(exercise.parameters.sets), 3);
        assert_eq!(u32::from(exercise.parameters.reps), 10);
        assert_eq!(u32::from(exercise.parameters.rest), 60);
        assert_eq!(exercise.parameters.weight, None);
    }

    assert_eq!(
        repository
            .read_user_progression(USER_ID.into(), STRENGTH_BASE.into())
            .await
            .unwrap()
            .map(|p| p.session_count),
        Some(1)
    );
    assert_eq!(
        repository
            .read_user_profile(USER_ID.into())
            .await
            .unwrap()
            .progression_plan_id,
        Some(FOUNDATION.into())
    );
}

async fn test_materialize_is_idempotent<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;
    let before = service.get_workout(USER_ID.into(), id).await.unwrap();

    assert_eq!(
        service
            .materialize_next_workout(USER_ID.into())
            .await
            .unwrap(),
        None
    );
    assert_eq!(
        service
            .materialize_next_workout(USER_ID.into())
            .await
            .unwrap(),
        None
    );

    assert_eq!(service.get_workout(USER_ID.into(), id).await.unwrap(), before);
    assert_eq!(
        service
            .get_upcoming_workouts(USER_ID.into())
            .await
            .unwrap()
            .iter()
            .map(|w| w.id)
            .collect::<Vec<_>>(),
        vec![id]
    );
}

async fn test_onboard_without_equipment<S: Store>(store: S) {
    let service = service(store);
    let id = service
        .onboard(USER_ID.into(), onboarding("1,3,5", "none"))
        .await
        .unwrap()
        .unwrap();

    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    assert_eq!(
        assigned_exercises(&workout),
        exercise_ids(&[PLANK, PUSH_UP, INVERTED_ROW, AIR_SQUAT])
    );
}

async fn test_onboard_with_wrong_number_of_days<S: Store>(store: S) {
    let service = service(store);

    assert!(matches!(
        service
            .onboard(USER_ID.into(), onboarding("1,3", ""))
            .await,
        Err(domain::PlanChangeError::Validation(
            domain::ValidationError::DaysPerWeek {
                required: 3,
                selected: 2,
                ..
            }
        ))
    ));

    let repository = service.repository();
    assert!(matches!(
        repository.read_user_profile(USER_ID.into()).await,
        Err(domain::ReadError::NotFound)
    ));
    assert!(
        repository
            .read_scheduled_workouts(USER_ID.into())
            .await
            .unwrap()
            .is_empty()
    );
}

async fn test_change_plan_without_progression<S: Store>(store: S) {
    let (service, _) = onboarded(store).await;

    assert!(matches!(
        service
            .change_plan(USER_ID.into(), EXPRESS.into(), "1,4")
            .await,
        Err(domain::PlanChangeError::Generate(
            domain::GenerateError::CatalogMiss(domain::CatalogMiss::Progression { day: 1, .. })
        ))
    ));

    let workouts = service
        .repository()
        .read_scheduled_workouts(USER_ID.into())
        .await
        .unwrap();
    assert_eq!(workouts.len(), 26);
    assert!(workouts.iter().all(|w| !w.is_materialized()));
    assert!(
        workouts
            .iter()
            .all(|w| w.progression_plan_id == EXPRESS.into())
    );
}

async fn assert_plan_change_next_week<S: Store>(service: TestService<S>) {
    let service = service.with_clock(domain::FixedClock(NEXT_MONDAY));

    let id = service
        .change_plan(USER_ID.into(), INTENSIVE.into(), "1,4")
        .await
        .unwrap()
        .unwrap();

    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    assert_eq!(workout.date, NEXT_MONDAY);
    assert_eq!(workout.progression_plan_id, INTENSIVE.into());
    assert!(workout.is_materialized());

    let workouts = service
        .repository()
        .read_scheduled_workouts(USER_ID.into())
        .await
        .unwrap();
    assert!(
        workouts
            .iter()
            .filter(|w| w.date >= NEXT_MONDAY)
            .all(|w| w.progression_plan_id == INTENSIVE.into())
    );
    assert_eq!(
        workouts
            .iter()
            .filter(|w| w.progression_plan_id == INTENSIVE.into() && w.is_materialized())
            .count(),
        1
    );
}

async fn test_change_plan_with_overdue_workout<S: Store>(store: S) {
    let (service, _) = onboarded(store).await;
    assert_plan_change_next_week(service).await;
}

async fn test_change_plan_after_completed_workout<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;
    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    service
        .complete_workout(USER_ID.into(), id, logged_exercises(&workout))
        .await
        .unwrap();
    assert_plan_change_next_week(service).await;
}

async fn test_change_plan_with_unknown_plan<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;

    assert!(matches!(
        service
            .change_plan(USER_ID.into(), 99.into(), "1,3,5")
            .await,
        Err(domain::PlanChangeError::Validation(
            domain::ValidationError::UnknownPlan
        ))
    ));
    assert!(
        service
            .get_workout(USER_ID.into(), id)
            .await
            .unwrap()
            .is_materialized()
    );
}

async fn test_complete_workout<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;
    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    let logged = logged_exercises(&workout);
    let mut submitted = logged.clone();
    submitted.push(domain::LoggedExercise {
        workout_exercise_id: 999.into(),
        difficulty: domain::Difficulty::Easy,
        sets: vec![],
    });

    let next = service
        .complete_workout(USER_ID.into(), id, submitted)
        .await
        .unwrap()
        .unwrap();

    let repository = service.repository();
    assert!(
        service
            .get_workout(USER_ID.into(), id)
            .await
            .unwrap()
            .is_completed()
    );
    assert_eq!(
        repository
            .read_user_progression(USER_ID.into(), STRENGTH_BASE.into())
            .await
            .unwrap()
            .map(|p| p.session_count),
        Some(2)
    );

    let mut stored = service.get_logged_sets(USER_ID.into(), id).await.unwrap();
    stored.sort_by_key(|l| l.workout_exercise_id);
    assert_eq!(stored, logged);

    let next = service.get_workout(USER_ID.into(), next).await.unwrap();
    assert_eq!(next.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    let parameters = next
        .content()
        .unwrap()
        .exercises()
        .map(|e| {
            (
                u32::from(e.parameters.sets),
                u32::from(e.parameters.reps),
                e.parameters.weight.map(f32::from),
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(
        parameters,
        vec![
            (3, 12, None),
            (4, 10, Some(22.5)),
            (4, 10, Some(22.5)),
            (4, 10, None),
        ]
    );
}

async fn test_complete_workout_twice<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;
    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();

    service
        .complete_workout(USER_ID.into(), id, logged_exercises(&workout))
        .await
        .unwrap();
    assert_eq!(
        service
            .complete_workout(USER_ID.into(), id, vec![])
            .await
            .unwrap(),
        None
    );

    assert_eq!(
        service
            .repository()
            .read_user_progression(USER_ID.into(), STRENGTH_BASE.into())
            .await
            .unwrap()
            .map(|p| p.session_count),
        Some(2)
    );
    assert_eq!(
        service
            .repository()
            .read_logged_sets(USER_ID.into(), id)
            .await
            .unwrap()
            .len(),
        4
    );
}

async fn test_complete_empty_workout<S: Store>(store: S) {
    let (service, _) = onboarded(store).await;
    let empty = service
        .repository()
        .read_scheduled_workouts(USER_ID.into())
        .await
        .unwrap()
        .into_iter()
        .find(|w| !w.is_materialized())
        .unwrap();

    assert!(matches!(
        service
            .complete_workout(USER_ID.into(), empty.id, vec![])
            .await,
        Err(domain::CompletionError::Transition(
            domain::TransitionError::NotMaterialized
        ))
    ));
}

async fn test_workout_of_other_user<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;

    assert!(matches!(
        service.get_workout(2.into(), id).await,
        Err(domain::ReadError::NotFound)
    ));
    assert!(matches!(
        service.complete_workout(2.into(), id, vec![]).await,
        Err(domain::CompletionError::NotFound)
    ));
}

async fn test_update_training_profile<S: Store>(store: S) {
    let (service, _) = onboarded(store).await;

    assert_eq!(
        service
            .update_training_profile(USER_ID.into(), 1.into(), "none".parse().unwrap())
            .await
            .unwrap(),
        6
    );

    let profile = service
        .repository()
        .read_user_profile(USER_ID.into())
        .await
        .unwrap();
    assert_eq!(profile.experience_level, 1.into());
    assert_eq!(profile.available_equipment, domain::AvailableEquipment::None);
    assert_eq!(profile.workout_days.to_string(), "1,3,5");
}

async fn test_rebuild_keeps_completed_workouts<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;
    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    service
        .complete_workout(USER_ID.into(), id, logged_exercises(&workout))
        .await
        .unwrap();

    assert_eq!(service.rebuild_schedule(USER_ID.into()).await.unwrap(), 39);

    let workouts = service
        .repository()
        .read_scheduled_workouts(USER_ID.into())
        .await
        .unwrap();
    assert_eq!(workouts.len(), 40);
    assert_eq!(workouts.iter().filter(|w| w.is_completed()).count(), 1);
    assert_eq!(workouts.iter().filter(|w| w.is_materialized()).count(), 1);
    assert_eq!(
        service
            .repository()
            .read_logged_sets(USER_ID.into(), id)
            .await
            .unwrap()
            .len(),
        4
    );
}

fn main_slots(
    workout: &domain::ScheduledWorkout,
) -> Vec<(u32, domain::ExerciseTypeID, Option<domain::ExerciseID>)> {
    workout.content().unwrap().sections[1]
        .exercises
        .iter()
        .map(|e| (e.display_order, e.exercise_type, e.exercise_id))
        .collect()
}

fn slot(
    display_order: u32,
    exercise_type: u128,
    exercise_id: u128,
) -> (u32, domain::ExerciseTypeID, Option<domain::ExerciseID>) {
    (display_order, exercise_type.into(), Some(exercise_id.into()))
}

async fn test_add_featured_exercise<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;
    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    let main = &workout.content().unwrap().sections[1];
    assert_eq!(main.section_type, MAIN.into());
    let section_id = main.id;
    let first_slot = main.exercises[0].id;

    let added = service
        .add_featured_exercise(
            USER_ID.into(),
            id,
            domain::FeaturedExercise::AddToSection {
                section_id,
                exercise_id: PUSH_UP.into(),
            },
        )
        .await
        .unwrap();
    let replaced = service
        .add_featured_exercise(
            USER_ID.into(),
            id,
            domain::FeaturedExercise::Replace {
                workout_exercise_id: first_slot,
                exercise_id: INVERTED_ROW.into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(replaced, first_slot);

    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    assert!(!workout.is_completed());
    assert_eq!(
        main_slots(&workout),
        vec![
            slot(1, PULL, INVERTED_ROW),
            slot(2, PULL, BAND_ROW),
            slot(3, LEGS, AIR_SQUAT),
            slot(4, PUSH, PUSH_UP),
        ]
    );
    let content = workout.content().unwrap();
    let added = content.exercises().find(|e| e.id == added).unwrap();
    assert_eq!(added.parameters.weight_option, domain::WeightOption::Bodyweight);
    assert_eq!(u32::from(added.parameters.sets), 3);
}

async fn test_add_featured_exercise_rejected<S: Store>(store: S) {
    let (service, id) = onboarded(store).await;
    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    let slot = workout.content().unwrap().sections[0].exercises[0].id;

    assert!(matches!(
        service
            .add_featured_exercise(
                USER_ID.into(),
                id,
                domain::FeaturedExercise::Replace {
                    workout_exercise_id: slot,
                    exercise_id: 999.into(),
                },
            )
            .await,
        Err(domain::WorkoutEditError::UnknownExercise(_))
    ));
    assert!(matches!(
        service
            .add_featured_exercise(
                USER_ID.into(),
                id,
                domain::FeaturedExercise::AddToSection {
                    section_id: 999.into(),
                    exercise_id: PUSH_UP.into(),
                },
            )
            .await,
        Err(domain::WorkoutEditError::Slot(domain::SlotError::UnknownSection(_)))
    ));

    service
        .complete_workout(USER_ID.into(), id, logged_exercises(&workout))
        .await
        .unwrap();
    assert!(matches!(
        service
            .add_featured_exercise(
                USER_ID.into(),
                id,
                domain::FeaturedExercise::Replace {
                    workout_exercise_id: slot,
                    exercise_id: PUSH_UP.into(),
                },
            )
            .await,
        Err(domain::WorkoutEditError::Transition(
            domain::TransitionError::AlreadyCompleted
        ))
    ));
    let workout = service.get_workout(USER_ID.into(), id).await.unwrap();
    assert!(workout.is_completed());
    assert_eq!(
        workout.content().unwrap().sections[0].exercises[0].exercise_id,
        Some(PLANK.into())
    );
}

async fn test_export_catalog<S: Store>(store: S) {
    assert_eq!(store.export_catalog().await.unwrap(), *CATALOG);
}

macro_rules! for_each_store {
    ($($test: ident),* $(,)?) => {
        mod memory {
            $(
                #[tokio::test]
                async fn $test() {
                    super::$test(super::memory_store().await).await;
                }
            )*
        }

        mod sqlite {
            $(
                #[tokio::test]
                async fn $test() {
                    super::$test(super::sqlite_store().await).await;
                }
            )*
        }
    };
}

for_each_store!(
    test_onboard_schedules_and_materializes,
    test_materialize_is_idempotent,
    test_onboard_without_equipment,
    test_onboard_with_wrong_number_of_days,
    test_change_plan_without_progression,
    test_change_plan_with_unknown_plan,
    test_change_plan_with_overdue_workout,
    test_change_plan_after_completed_workout,
    test_complete_workout,
    test_complete_workout_twice,
    test_complete_empty_workout,
    test_workout_of_other_user,
    test_update_training_profile,
    test_rebuild_keeps_completed_workouts,
    test_add_featured_exercise,
    test_add_featured_exercise_rejected,
    test_export_catalog,
);
