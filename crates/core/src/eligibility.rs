//! Eligible-program derivation.
//!
//! A program is eligible when no enrollment of the patient references it, whatever that
//! enrollment's status. Both inputs may be absent while their fetches are still loading or
//! have failed; absent is treated as empty.

use crate::models::{Enrollment, Program};
use std::collections::HashSet;

/// Programs from `available` that no enrollment in `enrollments` refers to.
///
/// Catalog order is preserved.
pub fn eligible_programs(
    available: Option<&[Program]>,
    enrollments: Option<&[Enrollment]>,
) -> Vec<Program> {
    let enrolled: HashSet<&str> = enrollments
        .unwrap_or_default()
        .iter()
        .map(|e| e.program_uuid.as_str())
        .collect();

    available
        .unwrap_or_default()
        .iter()
        .filter(|program| !enrolled.contains(program.uuid.as_str()))
        .cloned()
        .collect()
}

/// True when the catalog offers programs but the patient is already in all of them.
pub fn is_fully_enrolled(available: Option<&[Program]>, eligible: &[Program]) -> bool {
    !available.unwrap_or_default().is_empty() && eligible.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrollmentStatus;
    use proptest::prelude::*;

    fn program(uuid: &str) -> Program {
        Program {
            uuid: uuid.into(),
            display: format!("Program {uuid}"),
        }
    }

    fn enrollment(program_uuid: &str, status: EnrollmentStatus) -> Enrollment {
        Enrollment {
            uuid: format!("enrollment-{program_uuid}"),
            display: program_uuid.into(),
            program_uuid: program_uuid.into(),
            status,
            enrollment_form_uuid: "enroll".into(),
            discontinuation_form_uuid: "discontinue".into(),
        }
    }

    #[test]
    fn removes_enrolled_programs_in_catalog_order() {
        let catalog = [program("hiv"), program("tb"), program("mch")];
        let enrollments = [enrollment("tb", EnrollmentStatus::Active)];

        let eligible = eligible_programs(Some(&catalog), Some(&enrollments));
        assert_eq!(eligible, vec![program("hiv"), program("mch")]);
    }

    #[test]
    fn completed_enrollments_still_exclude_their_program() {
        let catalog = [program("hiv"), program("tb")];
        let enrollments = [enrollment("hiv", EnrollmentStatus::Completed)];

        let eligible = eligible_programs(Some(&catalog), Some(&enrollments));
        assert_eq!(eligible, vec![program("tb")]);
    }

    #[test]
    fn absent_inputs_are_treated_as_empty() {
        let catalog = [program("hiv")];
        assert_eq!(eligible_programs(Some(&catalog), None), vec![program("hiv")]);
        assert!(eligible_programs(None, None).is_empty());
        assert!(
            eligible_programs(None, Some(&[enrollment("hiv", EnrollmentStatus::Active)]))
                .is_empty()
        );
    }

    #[test]
    fn fully_enrolled_requires_a_non_empty_catalog() {
        let catalog = [program("hiv"), program("tb")];
        let enrollments = [
            enrollment("hiv", EnrollmentStatus::Active),
            enrollment("tb", EnrollmentStatus::Active),
        ];
        let eligible = eligible_programs(Some(&catalog), Some(&enrollments));
        assert!(eligible.is_empty());
        assert!(is_fully_enrolled(Some(&catalog), &eligible));

        assert!(!is_fully_enrolled(Some(&[]), &[]));
        assert!(!is_fully_enrolled(None, &[]));
        assert!(!is_fully_enrolled(Some(&catalog), &catalog));
    }

    fn catalog_strategy() -> impl Strategy<Value = Vec<Program>> {
        prop::collection::vec("[a-e]{1,2}", 0..12)
            .prop_map(|ids| ids.iter().map(|id| program(id)).collect())
    }

    fn enrollments_strategy() -> impl Strategy<Value = Vec<Enrollment>> {
        prop::collection::vec(("[a-e]{1,2}", any::<bool>()), 0..12).prop_map(|pairs| {
            pairs
                .iter()
                .map(|(id, active)| {
                    let status = if *active {
                        EnrollmentStatus::Active
                    } else {
                        EnrollmentStatus::Completed
                    };
                    enrollment(id, status)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn eligible_is_a_subset_of_the_catalog(
            catalog in catalog_strategy(),
            enrollments in enrollments_strategy(),
        ) {
            let eligible = eligible_programs(Some(&catalog), Some(&enrollments));
            for p in &eligible {
                prop_assert!(catalog.contains(p));
            }
        }

        #[test]
        fn eligible_is_disjoint_from_enrolled_programs(
            catalog in catalog_strategy(),
            enrollments in enrollments_strategy(),
        ) {
            let eligible = eligible_programs(Some(&catalog), Some(&enrollments));
            for p in &eligible {
                prop_assert!(enrollments.iter().all(|e| e.program_uuid != p.uuid));
            }
        }

        #[test]
        fn no_enrollments_yields_whole_catalog(catalog in catalog_strategy()) {
            prop_assert_eq!(eligible_programs(Some(&catalog), Some(&[])), catalog);
        }

        #[test]
        fn empty_catalog_yields_nothing(enrollments in enrollments_strategy()) {
            prop_assert!(eligible_programs(Some(&[]), Some(&enrollments)).is_empty());
        }

        #[test]
        fn derivation_is_idempotent(
            catalog in catalog_strategy(),
            enrollments in enrollments_strategy(),
        ) {
            let first = eligible_programs(Some(&catalog), Some(&enrollments));
            let second = eligible_programs(Some(&catalog), Some(&enrollments));
            prop_assert_eq!(first, second);
        }
    }
}
