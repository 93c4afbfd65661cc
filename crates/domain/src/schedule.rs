use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};

use crate::{
    AvailableEquipment, ExperienceLevel, PlanChangeError, ProgressionPlanID, ScheduledWorkoutID,
    UserID,
};

/// Length of the look-ahead window, counted from the first matching weekday.
pub const SCHEDULE_HORIZON_DAYS: u64 = 90;

#[allow(async_fn_in_trait)]
pub trait ScheduleService {
    /// Drops the member's pending workouts and lays out empty workouts for the
    /// selected weekdays. Returns the number of scheduled workouts.
    async fn rebuild_schedule(&self, user_id: UserID) -> Result<usize, PlanChangeError>;

    /// Assigns a progression plan and workout days, rebuilds the schedule and
    /// materializes the next due workout.
    async fn change_plan(
        &self,
        user_id: UserID,
        plan_id: ProgressionPlanID,
        workout_days: &str,
    ) -> Result<Option<ScheduledWorkoutID>, PlanChangeError>;

    /// First run of a member: like `change_plan`, but also records the
    /// experience level and equipment and assigns the eligible exercises.
    /// A missing profile is created.
    async fn onboard(
        &self,
        user_id: UserID,
        onboarding: Onboarding,
    ) -> Result<Option<ScheduledWorkoutID>, PlanChangeError>;

    /// Changes experience level and equipment and reassigns the eligible exercises.
    async fn update_training_profile(
        &self,
        user_id: UserID,
        experience_level: ExperienceLevel,
        available_equipment: AvailableEquipment,
    ) -> Result<usize, PlanChangeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Onboarding {
    pub plan_id: ProgressionPlanID,
    pub workout_days: String,
    pub experience_level: ExperienceLevel,
    pub available_equipment: AvailableEquipment,
}

/// Weekdays a member trains on, numbered from 0 (Sunday) to 6 (Saturday).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkoutDays(BTreeSet<u32>);

impl WorkoutDays {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl FromStr for WorkoutDays {
    type Err = WorkoutDaysError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut days = BTreeSet::new();
        if value.trim().is_empty() {
            return Ok(Self(days));
        }
        for day in value.split(',') {
            let day = day.trim();
            let number = day
                .parse::<u32>()
                .map_err(|_| WorkoutDaysError::Invalid(day.to_string()))?;
            if number > 6 {
                return Err(WorkoutDaysError::Invalid(day.to_string()));
            }
            if !days.insert(number) {
                return Err(WorkoutDaysError::Duplicate(number));
            }
        }
        Ok(Self(days))
    }
}

impl fmt::Display for WorkoutDays {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        )
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WorkoutDaysError {
    #[error("Workout day must be a number from 0 (Sunday) to 6 (Saturday): {0}")]
    Invalid(String),
    #[error("Workout day selected more than once: {0}")]
    Duplicate(u32),
}

/// Dates of the workouts to schedule, in ascending order.
///
/// For each weekday, the first date is the next matching day on or after
/// `today`, followed by one date per week within the horizon.
#[must_use]
pub fn schedule_dates(workout_days: &WorkoutDays, today: NaiveDate) -> Vec<NaiveDate> {
    let today_number = today.weekday().num_days_from_sunday();
    let mut dates = workout_days
        .iter()
        .flat_map(|day| {
            let offset = (day + 7 - today_number) % 7;
            let first = today + Days::new(u64::from(offset));
            let end = first + Days::new(SCHEDULE_HORIZON_DAYS);
            std::iter::successors(Some(first), |date| date.checked_add_days(Days::new(7)))
                .take_while(move |date| *date < end)
        })
        .collect::<Vec<_>>();
    dates.sort();
    dates
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    // Monday
    const TODAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    #[rstest]
    #[case("1,3,5", Ok(vec![1, 3, 5]))]
    #[case(" 0, 6 ", Ok(vec![0, 6]))]
    #[case("", Ok(vec![]))]
    #[case("7", Err(WorkoutDaysError::Invalid("7".to_string())))]
    #[case("mon", Err(WorkoutDaysError::Invalid("mon".to_string())))]
    #[case("1,1,3", Err(WorkoutDaysError::Duplicate(1)))]
    fn test_workout_days_from_str(
        #[case] value: &str,
        #[case] expected: Result<Vec<u32>, WorkoutDaysError>,
    ) {
        assert_eq!(
            WorkoutDays::from_str(value).map(|days| days.iter().collect::<Vec<_>>()),
            expected
        );
    }

    #[test]
    fn test_workout_days_display() {
        assert_eq!(
            WorkoutDays::from_str("5,1,3").unwrap().to_string(),
            "1,3,5"
        );
    }

    #[test]
    fn test_schedule_dates_three_days_a_week() {
        let dates = schedule_dates(&WorkoutDays::from_str("1,3,5").unwrap(), TODAY);
        assert_eq!(dates.len(), 39);
        for weekday in [Weekday::Mon, Weekday::Wed, Weekday::Fri] {
            assert_eq!(dates.iter().filter(|d| d.weekday() == weekday).count(), 13);
        }
        assert_eq!(dates.first(), Some(&TODAY));
        assert_eq!(
            dates.last(),
            Some(&NaiveDate::from_ymd_opt(2024, 3, 29).unwrap())
        );
    }

    #[rstest]
    #[case(0, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap())]
    #[case(1, TODAY)]
    #[case(2, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())]
    #[case(6, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap())]
    fn test_schedule_dates_first_date(#[case] day: u32, #[case] expected: NaiveDate) {
        let dates = schedule_dates(&WorkoutDays::from_str(&day.to_string()).unwrap(), TODAY);
        assert_eq!(dates.first(), Some(&expected));
        assert_eq!(dates.len(), 13);
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap())]
    #[case(NaiveDate::from_ymd_opt(2024, 12, 30).unwrap())]
    #[case(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())]
    fn test_schedule_dates_weekly_and_not_in_past(#[case] today: NaiveDate) {
        let days = WorkoutDays::from_str("0,2,4,6").unwrap();
        let dates = schedule_dates(&days, today);
        assert_eq!(dates.len(), 52);
        assert!(dates.iter().all(|d| *d >= today));
        assert!(
            dates
                .iter()
                .all(|d| days.iter().any(|day| d.weekday().num_days_from_sunday() == day))
        );
        assert!(
            dates
                .iter()
                .all(|d| *d < today + Days::new(SCHEDULE_HORIZON_DAYS + 7))
        );
    }

    #[test]
    fn test_schedule_dates_without_days() {
        assert!(schedule_dates(&WorkoutDays::default(), TODAY).is_empty());
    }
}
