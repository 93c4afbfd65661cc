use std::collections::BTreeSet;

use crate::{ExerciseTypeID, ProgressionID, ReadError, Time, Title};

#[allow(async_fn_in_trait)]
pub trait SkeletonRepository {
    /// Returns the skeleton with the lowest id among those focused on the progression.
    async fn read_skeleton_for_progression(
        &self,
        progression_id: ProgressionID,
    ) -> Result<Option<SkeletonWorkout>, ReadError>;
}

crate::id_type!(SkeletonWorkoutID);
crate::id_type!(SkeletonSectionID);
crate::id_type!(SectionTypeID);

/// Template of a workout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonWorkout {
    pub id: SkeletonWorkoutID,
    pub title: Title,
    pub focus: BTreeSet<ProgressionID>,
    pub sections: Vec<SkeletonSection>,
}

impl SkeletonWorkout {
    #[must_use]
    pub fn ordered_sections(&self) -> Vec<&SkeletonSection> {
        let mut sections = self.sections.iter().collect::<Vec<_>>();
        sections.sort_by_key(|s| s.display_order);
        sections
    }

    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.sections.iter().map(|s| s.categories.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkeletonSection {
    pub id: SkeletonSectionID,
    pub display_order: u32,
    pub section_type: SectionTypeID,
    pub title: Title,
    pub rest: Time,
    pub categories: Vec<SkeletonCategory>,
}

impl SkeletonSection {
    #[must_use]
    pub fn ordered_categories(&self) -> Vec<&SkeletonCategory> {
        let mut categories = self.categories.iter().collect::<Vec<_>>();
        categories.sort_by_key(|c| c.display_order);
        categories
    }
}

/// Exercise type slot within a skeleton section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonCategory {
    pub display_order: u32,
    pub exercise_type: ExerciseTypeID,
}

/// Picks the skeleton a progression is materialized from.
#[must_use]
pub fn skeleton_for_progression(
    skeletons: &[SkeletonWorkout],
    progression_id: ProgressionID,
) -> Option<&SkeletonWorkout> {
    skeletons
        .iter()
        .filter(|s| s.focus.contains(&progression_id))
        .min_by_key(|s| s.id)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn skeleton(id: u128, focus: &[u128]) -> SkeletonWorkout {
        SkeletonWorkout {
            id: id.into(),
            title: Title::new(&format!("Skeleton {id}")).unwrap(),
            focus: focus.iter().map(|p| ProgressionID::from(*p)).collect(),
            sections: vec![
                SkeletonSection {
                    id: 2.into(),
                    display_order: 2,
                    section_type: 2.into(),
                    title: Title::new("Main").unwrap(),
                    rest: Time::new(90).unwrap(),
                    categories: vec![
                        SkeletonCategory {
                            display_order: 3,
                            exercise_type: 13.into(),
                        },
                        SkeletonCategory {
                            display_order: 1,
                            exercise_type: 11.into(),
                        },
                        SkeletonCategory {
                            display_order: 2,
                            exercise_type: 12.into(),
                        },
                    ],
                },
                SkeletonSection {
                    id: 1.into(),
                    display_order: 1,
                    section_type: 1.into(),
                    title: Title::new("Warmup").unwrap(),
                    rest: Time::new(30).unwrap(),
                    categories: vec![SkeletonCategory {
                        display_order: 1,
                        exercise_type: 10.into(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_skeleton_ordered_sections() {
        assert_eq!(
            skeleton(1, &[])
                .ordered_sections()
                .iter()
                .map(|s| s.title.to_string())
                .collect::<Vec<_>>(),
            vec!["Warmup", "Main"]
        );
    }

    #[test]
    fn test_skeleton_section_ordered_categories() {
        let skeleton = skeleton(1, &[]);
        assert_eq!(
            skeleton.sections[0]
                .ordered_categories()
                .iter()
                .map(|c| c.exercise_type)
                .collect::<Vec<_>>(),
            vec![
                ExerciseTypeID::from(11),
                ExerciseTypeID::from(12),
                ExerciseTypeID::from(13)
            ]
        );
    }

    #[test]
    fn test_skeleton_num_slots() {
        assert_eq!(skeleton(1, &[]).num_slots(), 4);
    }

    #[test]
    fn test_skeleton_for_progression_prefers_lowest_id() {
        let skeletons = vec![skeleton(3, &[1]), skeleton(2, &[1, 2]), skeleton(1, &[2])];
        assert_eq!(
            skeleton_for_progression(&skeletons, 1.into()).map(|s| s.id),
            Some(2.into())
        );
        assert_eq!(
            skeleton_for_progression(&skeletons, 2.into()).map(|s| s.id),
            Some(1.into())
        );
        assert_eq!(skeleton_for_progression(&skeletons, 3.into()), None);
    }
}
