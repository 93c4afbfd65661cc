use crate::{
    Exercise, PlanDay, Progression, ProgressionID, ProgressionPlan, ProgressionPlanID,
    ProgressionSession, SkeletonWorkout, skeleton_for_progression,
};

/// Snapshot of the read-only training catalog.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Catalog {
    pub exercises: Vec<Exercise>,
    pub plans: Vec<ProgressionPlan>,
    pub plan_days: Vec<PlanDay>,
    pub progressions: Vec<Progression>,
    pub sessions: Vec<ProgressionSession>,
    pub skeletons: Vec<SkeletonWorkout>,
}

impl Catalog {
    #[must_use]
    pub fn plan(&self, id: ProgressionPlanID) -> Option<&ProgressionPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn progression(&self, id: ProgressionID) -> Option<&Progression> {
        self.progressions.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn plan_day_progression(&self, plan_id: ProgressionPlanID, day: u32) -> Option<&Progression> {
        self.plan_days
            .iter()
            .find(|d| d.plan_id == plan_id && d.day == day)
            .and_then(|d| self.progression(d.progression_id))
    }

    #[must_use]
    pub fn sessions_of(&self, id: ProgressionID) -> Vec<ProgressionSession> {
        self.sessions
            .iter()
            .filter(|s| s.progression_id == id)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn skeleton_for(&self, id: ProgressionID) -> Option<&SkeletonWorkout> {
        skeleton_for_progression(&self.skeletons, id)
    }
}
