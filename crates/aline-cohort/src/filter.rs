//! Set-membership row filters
//!
//! A [`CohortFilter`] restricts rows by gender, age group and weight group.
//! Within one field the selected values are unioned; across fields the
//! constraints are intersected. A field left unset does not constrain, while
//! a field set to an empty selection matches no rows at all.

use std::collections::BTreeSet;

use crate::{
    bins::{AgeGroup, WeightGroup},
    profile::{Gender, PatientProfile},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortFilter {
    pub genders: Option<BTreeSet<Gender>>,
    pub age_groups: Option<BTreeSet<AgeGroup>>,
    pub weight_groups: Option<BTreeSet<WeightGroup>>,
}

impl CohortFilter {
    #[must_use]
    pub fn with_genders<I>(mut self, genders: I) -> Self
    where
        I: IntoIterator<Item = Gender>,
    {
        self.genders = Some(genders.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_age_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = AgeGroup>,
    {
        self.age_groups = Some(groups.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_weight_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = WeightGroup>,
    {
        self.weight_groups = Some(groups.into_iter().collect());
        self
    }

    /// Whether no field is constrained.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.genders.is_none() && self.age_groups.is_none() && self.weight_groups.is_none()
    }

    #[must_use]
    pub fn matches(&self, patient: &PatientProfile) -> bool {
        fn allows<T: Ord>(selection: Option<&BTreeSet<T>>, value: &T) -> bool {
            selection.is_none_or(|set| set.contains(value))
        }

        allows(self.genders.as_ref(), &patient.gender)
            && allows(self.age_groups.as_ref(), &patient.bins.age)
            && allows(self.weight_groups.as_ref(), &patient.bins.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bins::DerivedBins, profile::PatientOutcome};

    fn patient(gender: Gender, age: f64, weight: f64) -> PatientProfile {
        PatientProfile {
            gender,
            service_unit: "SICU".to_owned(),
            arterial_line: false,
            admission_weekday: None,
            outcome: PatientOutcome {
                hospital_expiry: 0.0,
                day_28_expiry: 0.0,
                censor_flag: 1.0,
                icu_los_days: 1.0,
                hospital_los_days: 1.0,
            },
            bins: DerivedBins::classify(age, weight, 24.0, 8.0, 1.0),
        }
    }

    #[test]
    fn test_unrestricted_matches_everything() {
        let filter = CohortFilter::default();
        assert!(filter.is_unrestricted());
        assert!(filter.matches(&patient(Gender::Male, 35.0, 70.0)));
        assert!(filter.matches(&patient(Gender::Female, 95.0, 120.0)));
    }

    #[test]
    fn test_union_within_field() {
        let filter =
            CohortFilter::default().with_age_groups([AgeGroup::Age20To29, AgeGroup::Age90AndOver]);
        assert!(filter.matches(&patient(Gender::Male, 25.0, 70.0)));
        assert!(filter.matches(&patient(Gender::Male, 91.0, 70.0)));
        assert!(!filter.matches(&patient(Gender::Male, 45.0, 70.0)));
    }

    #[test]
    fn test_intersection_across_fields() {
        let filter = CohortFilter::default()
            .with_genders([Gender::Female])
            .with_weight_groups([WeightGroup::Kg50To79]);
        assert!(filter.matches(&patient(Gender::Female, 40.0, 60.0)));
        assert!(!filter.matches(&patient(Gender::Male, 40.0, 60.0)));
        assert!(!filter.matches(&patient(Gender::Female, 40.0, 90.0)));
    }

    #[test]
    fn test_empty_selection_matches_nothing() {
        let filter = CohortFilter::default().with_weight_groups([]);
        assert!(!filter.is_unrestricted());
        assert!(!filter.matches(&patient(Gender::Female, 40.0, 60.0)));
    }
}
