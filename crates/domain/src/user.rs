use std::{collections::BTreeSet, fmt, str::FromStr};

use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{CreateError, EquipmentID, ProgressionPlanID, ReadError, UpdateError, WorkoutDays};

#[allow(async_fn_in_trait)]
pub trait UserRepository {
    async fn read_user_profile(&self, id: UserID) -> Result<UserProfile, ReadError>;
    async fn create_user_profile(&self, profile: UserProfile) -> Result<UserProfile, CreateError>;
    async fn replace_user_profile(&self, profile: UserProfile) -> Result<UserProfile, UpdateError>;
}

crate::id_type!(UserID);

/// Training related part of a member's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: UserID,
    pub progression_plan_id: Option<ProgressionPlanID>,
    pub progression_plan_day: u32,
    pub experience_level: ExperienceLevel,
    pub available_equipment: AvailableEquipment,
    pub workout_days: WorkoutDays,
}

impl UserProfile {
    #[must_use]
    pub fn new(user_id: UserID) -> Self {
        Self {
            user_id,
            progression_plan_id: None,
            progression_plan_day: 1,
            experience_level: ExperienceLevel::default(),
            available_equipment: AvailableEquipment::Unrestricted,
            workout_days: WorkoutDays::default(),
        }
    }
}

#[derive(Deref, Debug, Display, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExperienceLevel(u32);

impl From<u32> for ExperienceLevel {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Equipment a member has access to.
///
/// The profile stores it as text: an empty string places no restriction on
/// exercise selection, `none` admits only exercises without equipment, and a
/// comma separated list of equipment ids admits exercises that need none or
/// at least one of the listed items.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AvailableEquipment {
    #[default]
    Unrestricted,
    None,
    Some(BTreeSet<EquipmentID>),
}

impl AvailableEquipment {
    #[must_use]
    pub fn permits(&self, required: &BTreeSet<EquipmentID>) -> bool {
        if required.is_empty() {
            return true;
        }
        match self {
            AvailableEquipment::Unrestricted => true,
            AvailableEquipment::None => false,
            AvailableEquipment::Some(available) => required.iter().any(|e| available.contains(e)),
        }
    }
}

impl FromStr for AvailableEquipment {
    type Err = AvailableEquipmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(AvailableEquipment::Unrestricted);
        }
        if value.eq_ignore_ascii_case("none") {
            return Ok(AvailableEquipment::None);
        }
        value
            .split(',')
            .map(|id| {
                Uuid::parse_str(id.trim())
                    .map(EquipmentID::from)
                    .map_err(|_| AvailableEquipmentError::InvalidID(id.trim().to_string()))
            })
            .collect::<Result<BTreeSet<_>, _>>()
            .map(AvailableEquipment::Some)
    }
}

impl fmt::Display for AvailableEquipment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AvailableEquipment::Unrestricted => Ok(()),
            AvailableEquipment::None => write!(f, "none"),
            AvailableEquipment::Some(ids) => write!(
                f,
                "{}",
                ids.iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum AvailableEquipmentError {
    #[error("invalid equipment id: {0}")]
    InvalidID(String),
}
