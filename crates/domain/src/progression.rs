use crate::{
    CreateError, ExerciseID, GenerateError, ReadError, Reps, SectionTypeID, SetParameters, Sets,
    Time, Title, UpdateError, UserID, Weight, WeightOption,
};

#[allow(async_fn_in_trait)]
pub trait SetParameterService {
    /// Computes the prescription for one exercise slot from the member's session
    /// count for the progression, creating the count on first use.
    async fn resolve_set_parameters(
        &self,
        request: &SetParameterRequest,
    ) -> Result<SetParameters, GenerateError>;
}

#[allow(async_fn_in_trait)]
pub trait ProgressionRepository {
    async fn read_progression_plan(
        &self,
        id: ProgressionPlanID,
    ) -> Result<ProgressionPlan, ReadError>;
    async fn read_plan_day_progression(
        &self,
        plan_id: ProgressionPlanID,
        day: u32,
    ) -> Result<Option<Progression>, ReadError>;
    async fn read_progression(&self, id: ProgressionID) -> Result<Option<Progression>, ReadError>;
    async fn read_progression_sessions(
        &self,
        id: ProgressionID,
    ) -> Result<Vec<ProgressionSession>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait UserProgressionRepository {
    async fn read_user_progression(
        &self,
        user_id: UserID,
        progression_id: ProgressionID,
    ) -> Result<Option<UserProgression>, ReadError>;
    async fn create_user_progression(
        &self,
        user_id: UserID,
        progression_id: ProgressionID,
    ) -> Result<UserProgression, CreateError>;
    async fn increment_session_count(
        &self,
        user_id: UserID,
        progression_id: ProgressionID,
    ) -> Result<UserProgression, UpdateError>;
}

crate::id_type!(ProgressionPlanID);
crate::id_type!(ProgressionID);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionPlan {
    pub id: ProgressionPlanID,
    pub title: Title,
    pub days_per_week: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDay {
    pub plan_id: ProgressionPlanID,
    pub day: u32,
    pub progression_id: ProgressionID,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    pub id: ProgressionID,
    pub title: Title,
    pub default_sets: Sets,
    pub default_reps: Reps,
    pub default_time: Time,
    pub default_rest: Time,
}

/// Override of the progression defaults, effective from the given session on.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionSession {
    pub progression_id: ProgressionID,
    pub day: u32,
    pub section_type: Option<SectionTypeID>,
    pub sets: Option<Sets>,
    pub reps: Option<Reps>,
    pub time: Option<Time>,
    pub rest: Option<Time>,
    pub weight: Option<Weight>,
}

impl ProgressionSession {
    fn applies_to(&self, session_count: u32, section_type: SectionTypeID) -> bool {
        self.day <= session_count && self.section_type.is_none_or(|t| t == section_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserProgression {
    pub user_id: UserID,
    pub progression_id: ProgressionID,
    pub session_count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetParameterRequest {
    pub user_id: UserID,
    pub progression_id: ProgressionID,
    pub exercise_id: Option<ExerciseID>,
    pub weight_option: Option<WeightOption>,
    pub section_type: SectionTypeID,
}

impl SetParameters {
    /// Lays the latest applicable session over the progression defaults.
    ///
    /// A session applies if its day does not exceed the session count and it is
    /// either generic or specific to the section type. On equal days the
    /// section specific session wins.
    #[must_use]
    pub fn resolve(
        progression: &Progression,
        sessions: &[ProgressionSession],
        session_count: u32,
        section_type: SectionTypeID,
        weight_option: Option<WeightOption>,
    ) -> Self {
        let session = sessions
            .iter()
            .filter(|s| s.progression_id == progression.id)
            .filter(|s| s.applies_to(session_count, section_type))
            .max_by_key(|s| (s.day, s.section_type.is_some()));
        let weight_option = weight_option.unwrap_or_default();

        Self {
            sets: session
                .and_then(|s| s.sets)
                .unwrap_or(progression.default_sets),
            reps: session
                .and_then(|s| s.reps)
                .unwrap_or(progression.default_reps),
            time: session
                .and_then(|s| s.time)
                .unwrap_or(progression.default_time),
            rest: session
                .and_then(|s| s.rest)
                .unwrap_or(progression.default_rest),
            weight: match weight_option {
                WeightOption::Weighted => session.and_then(|s| s.weight),
                WeightOption::Bodyweight => None,
            },
            weight_option,
        }
    }
}
