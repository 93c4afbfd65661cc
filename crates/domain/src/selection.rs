use std::sync::{Mutex, PoisonError};

use chrono::{Local, NaiveDate};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Chooses one element of a candidate list.
pub trait Pick {
    fn pick<T>(&self, candidates: Vec<T>) -> Option<T>;
}

/// Uniformly random choice.
pub struct RandomPick {
    rng: Mutex<StdRng>,
}

impl RandomPick {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPick {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Pick for RandomPick {
    fn pick<T>(&self, mut candidates: Vec<T>) -> Option<T> {
        if candidates.is_empty() {
            return None;
        }
        let index = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..candidates.len());
        Some(candidates.swap_remove(index))
    }
}

/// Always chooses the first candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstPick;

impl Pick for FirstPick {
    fn pick<T>(&self, candidates: Vec<T>) -> Option<T> {
        candidates.into_iter().next()
    }
}

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_random_pick_empty() {
        assert_eq!(RandomPick::seeded(1).pick(Vec::<u32>::new()), None);
    }

    #[test]
    fn test_random_pick_single() {
        assert_eq!(RandomPick::seeded(1).pick(vec![7]), Some(7));
    }

    #[test]
    fn test_random_pick_returns_candidate() {
        let picker = RandomPick::seeded(42);
        let picked = (0..100)
            .filter_map(|_| picker.pick(vec![1, 2, 3]))
            .collect::<BTreeSet<_>>();
        assert_eq!(picked, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn test_random_pick_seeded_is_reproducible() {
        let a = RandomPick::seeded(7);
        let b = RandomPick::seeded(7);
        for _ in 0..10 {
            assert_eq!(
                a.pick((0..20).collect::<Vec<_>>()),
                b.pick((0..20).collect::<Vec<_>>())
            );
        }
    }

    #[test]
    fn test_first_pick() {
        assert_eq!(FirstPick.pick(vec!["a", "b"]), Some("a"));
        assert_eq!(FirstPick.pick(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_fixed_clock() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(FixedClock(date).today(), date);
    }
}
