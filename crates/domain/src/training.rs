use derive_more::{Display, Into};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sets(u32);

impl Sets {
    pub fn new(value: u32) -> Result<Self, SetsError> {
        if !(1..100).contains(&value) {
            return Err(SetsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl Default for Sets {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<&str> for Sets {
    type Error = SetsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Sets::new(parsed_value),
            Err(_) => Err(SetsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SetsError {
    #[error("Sets must be in the range 1 to 99")]
    OutOfRange,
    #[error("Sets must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Duration in seconds, used for timed sets and rest periods.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(u32);

impl Time {
    pub fn new(value: u32) -> Result<Self, TimeError> {
        if !(0..1000).contains(&value) {
            return Err(TimeError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Time {
    type Error = TimeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Time::new(parsed_value),
            Err(_) => Err(TimeError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("Time must be in the range 0 to 999 s")]
    OutOfRange,
    #[error("Time must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        if (value * 10.0 % 1.0).abs() > f32::EPSILON {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 kg")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(AsRefStr, EnumString, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum WeightOption {
    #[default]
    Weighted,
    Bodyweight,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Difficulty {
    Easy = 1,
    #[default]
    Moderate = 2,
    Hard = 3,
}

impl TryFrom<u8> for Difficulty {
    type Error = DifficultyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Moderate),
            3 => Ok(Difficulty::Hard),
            _ => Err(DifficultyError::OutOfRange(value)),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DifficultyError {
    #[error("Difficulty must be in the range 1 to 3 ({0})")]
    OutOfRange(u8),
}

/// Prescription for one exercise slot of a workout.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SetParameters {
    pub sets: Sets,
    pub reps: Reps,
    pub time: Time,
    pub rest: Time,
    pub weight: Option<Weight>,
    pub weight_option: WeightOption,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("3", Ok(Sets(3)))]
    #[case("0", Err(SetsError::OutOfRange))]
    #[case("100", Err(SetsError::OutOfRange))]
    #[case("three", Err(SetsError::ParseError))]
    fn test_sets_try_from_str(#[case] value: &str, #[case] expected: Result<Sets, SetsError>) {
        assert_eq!(Sets::try_from(value), expected);
    }

    #[rstest]
    #[case("0", Ok(Reps(0)))]
    #[case("999", Ok(Reps(999)))]
    #[case("1000", Err(RepsError::OutOfRange))]
    #[case("-1", Err(RepsError::ParseError))]
    fn test_reps_try_from_str(#[case] value: &str, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::try_from(value), expected);
    }

    #[rstest]
    #[case("60", Ok(Time(60)))]
    #[case("1000", Err(TimeError::OutOfRange))]
    #[case("1.5", Err(TimeError::ParseError))]
    fn test_time_try_from_str(#[case] value: &str, #[case] expected: Result<Time, TimeError>) {
        assert_eq!(Time::try_from(value), expected);
    }

    #[rstest]
    #[case("42.5", Ok(Weight(42.5)))]
    #[case("1000", Err(WeightError::OutOfRange))]
    #[case("10.05", Err(WeightError::InvalidResolution))]
    #[case("heavy", Err(WeightError::ParseError))]
    fn test_weight_try_from_str(
        #[case] value: &str,
        #[case] expected: Result<Weight, WeightError>,
    ) {
        assert_eq!(Weight::try_from(value), expected);
    }

    #[rstest]
    #[case(WeightOption::Weighted, "weighted")]
    #[case(WeightOption::Bodyweight, "bodyweight")]
    fn test_weight_option_strings(#[case] option: WeightOption, #[case] string: &str) {
        assert_eq!(option.as_ref(), string);
        assert_eq!(WeightOption::from_str(string), Ok(option));
    }

    #[test]
    fn test_weight_option_default() {
        assert_eq!(WeightOption::default(), WeightOption::Weighted);
    }

    #[rstest]
    #[case(1, Ok(Difficulty::Easy))]
    #[case(2, Ok(Difficulty::Moderate))]
    #[case(3, Ok(Difficulty::Hard))]
    #[case(4, Err(DifficultyError::OutOfRange(4)))]
    fn test_difficulty_try_from_u8(
        #[case] value: u8,
        #[case] expected: Result<Difficulty, DifficultyError>,
    ) {
        assert_eq!(Difficulty::try_from(value), expected);
    }
}
