use std::collections::BTreeSet;

use chrono::NaiveDate;
use repcoach_domain as domain;

// Monday
pub const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
pub const NEXT_MONDAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();

pub const USER_ID: u128 = 1;

pub const DUMBBELL: u128 = 101;
pub const BAND: u128 = 102;

pub const PUSH: u128 = 11;
pub const PULL: u128 = 12;
pub const LEGS: u128 = 13;
pub const CORE: u128 = 14;

pub const WARMUP: u128 = 21;
pub const MAIN: u128 = 22;

pub const FOUNDATION: u128 = 1;
pub const EXPRESS: u128 = 2;
pub const INTENSIVE: u128 = 3;

pub const STRENGTH_BASE: u128 = 31;
pub const MOBILITY: u128 = 32;

pub const FULL_BODY: u128 = 41;

pub const PLANK: u128 = 201;
pub const PUSH_UP: u128 = 202;
pub const DUMBBELL_PRESS: u128 = 203;
pub const BAND_ROW: u128 = 204;
pub const INVERTED_ROW: u128 = 205;
pub const GOBLET_SQUAT: u128 = 206;
pub const AIR_SQUAT: u128 = 207;
pub const BARBELL_SQUAT: u128 = 208;

fn exercise(
    id: u128,
    title: &str,
    experience_level: u32,
    exercise_type: u128,
    equipment: &[u128],
    weight_option: domain::WeightOption,
) -> domain::Exercise {
    domain::Exercise {
        id: id.into(),
        title: domain::Title::new(title).unwrap(),
        experience_level: experience_level.into(),
        exercise_types: BTreeSet::from([exercise_type.into()]),
        equipment: equipment.iter().map(|e| (*e).into()).collect(),
        weight_option: Some(weight_option),
    }
}

pub static EXERCISES: std::sync::LazyLock<Vec<domain::Exercise>> =
    std::sync::LazyLock::new(|| {
        vec![
            exercise(PLANK, "Plank", 1, CORE, &[], domain::WeightOption::Bodyweight),
            exercise(PUSH_UP, "Push-up", 1, PUSH, &[], domain::WeightOption::Bodyweight),
            exercise(
                DUMBBELL_PRESS,
                "Dumbbell Press",
                2,
                PUSH,
                &[DUMBBELL],
                domain::WeightOption::Weighted,
            ),
            exercise(BAND_ROW, "Band Row", 1, PULL, &[BAND], domain::WeightOption::Weighted),
            exercise(
                INVERTED_ROW,
                "Inverted Row",
                1,
                PULL,
                &[],
                domain::WeightOption::Bodyweight,
            ),
            exercise(
                GOBLET_SQUAT,
                "Goblet Squat",
                1,
                LEGS,
                &[DUMBBELL],
                domain::WeightOption::Weighted,
            ),
            exercise(AIR_SQUAT, "Air Squat", 1, LEGS, &[], domain::WeightOption::Bodyweight),
            exercise(BARBELL_SQUAT, "Barbell Squat", 3, LEGS, &[], domain::WeightOption::Weighted),
        ]
    });

pub static PROGRESSION: std::sync::LazyLock<domain::Progression> =
    std::sync::LazyLock::new(|| domain::Progression {
        id: STRENGTH_BASE.into(),
        title: domain::Title::new("Strength Base").unwrap(),
        default_sets: domain::Sets::new(3).unwrap(),
        default_reps: domain::Reps::new(10).unwrap(),
        default_time: domain::Time::new(0).unwrap(),
        default_rest: domain::Time::new(60).unwrap(),
    });

fn section(
    id: u128,
    display_order: u32,
    section_type: u128,
    title: &str,
    exercise_types: &[u128],
) -> domain::SkeletonSection {
    domain::SkeletonSection {
        id: id.into(),
        display_order,
        section_type: section_type.into(),
        title: domain::Title::new(title).unwrap(),
        rest: domain::Time::new(90).unwrap(),
        categories: (1..)
            .zip(exercise_types)
            .map(|(display_order, exercise_type)| domain::SkeletonCategory {
                display_order,
                exercise_type: (*exercise_type).into(),
            })
            .collect(),
    }
}

pub static SKELETON: std::sync::LazyLock<domain::SkeletonWorkout> =
    std::sync::LazyLock::new(|| domain::SkeletonWorkout {
        id: FULL_BODY.into(),
        title: domain::Title::new("Full Body").unwrap(),
        focus: BTreeSet::from([STRENGTH_BASE.into()]),
        // Not in display order
        sections: vec![
            section(52, 2, MAIN, "Main", &[PUSH, PULL, LEGS]),
            section(51, 1, WARMUP, "Warmup", &[CORE]),
        ],
    });

pub static CATALOG: std::sync::LazyLock<domain::Catalog> =
    std::sync::LazyLock::new(|| domain::Catalog {
        exercises: EXERCISES.clone(),
        plans: vec![
            domain::ProgressionPlan {
                id: FOUNDATION.into(),
                title: domain::Title::new("Foundation").unwrap(),
                days_per_week: 3,
            },
            domain::ProgressionPlan {
                id: EXPRESS.into(),
                title: domain::Title::new("Express").unwrap(),
                days_per_week: 2,
            },
            domain::ProgressionPlan {
                id: INTENSIVE.into(),
                title: domain::Title::new("Intensive").unwrap(),
                days_per_week: 2,
            },
        ],
        plan_days: vec![
            domain::PlanDay {
                plan_id: FOUNDATION.into(),
                day: 1,
                progression_id: STRENGTH_BASE.into(),
            },
            domain::PlanDay {
                plan_id: FOUNDATION.into(),
                day: 2,
                progression_id: MOBILITY.into(),
            },
            domain::PlanDay {
                plan_id: INTENSIVE.into(),
                day: 1,
                progression_id: STRENGTH_BASE.into(),
            },
        ],
        progressions: vec![
            PROGRESSION.clone(),
            domain::Progression {
                id: MOBILITY.into(),
                title: domain::Title::new("Mobility").unwrap(),
                ..PROGRESSION.clone()
            },
        ],
        sessions: vec![
            domain::ProgressionSession {
                progression_id: STRENGTH_BASE.into(),
                day: 2,
                section_type: None,
                sets: None,
                reps: Some(domain::Reps::new(12).unwrap()),
                time: None,
                rest: None,
                weight: Some(domain::Weight::new(20.0).unwrap()),
            },
            domain::ProgressionSession {
                progression_id: STRENGTH_BASE.into(),
                day: 2,
                section_type: Some(MAIN.into()),
                sets: Some(domain::Sets::new(4).unwrap()),
                reps: None,
                time: None,
                rest: None,
                weight: Some(domain::Weight::new(22.5).unwrap()),
            },
        ],
        skeletons: vec![SKELETON.clone()],
    });

pub fn onboarding(workout_days: &str, available_equipment: &str) -> domain::Onboarding {
    domain::Onboarding {
        plan_id: FOUNDATION.into(),
        workout_days: workout_days.to_string(),
        experience_level: 2.into(),
        available_equipment: available_equipment.parse().unwrap(),
    }
}
