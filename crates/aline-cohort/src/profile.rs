//! Typed per-patient view of the fields the aggregation views use

use chrono::Weekday;
use serde::Serialize;

use crate::bins::DerivedBins;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, derive_more::Display,
)]
pub enum Gender {
    #[display("M")]
    #[serde(rename = "M")]
    Male,
    #[display("F")]
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub const ALL: &'static [Self] = &[Self::Male, Self::Female];

    /// Decode the binary `gender_num` indicator (1 = male, 0 = female).
    ///
    /// Accepts integer or float spellings (`"1"`, `"1.0"`).
    ///
    /// ```
    /// use aline_cohort::profile::Gender;
    ///
    /// assert_eq!(Gender::from_indicator("1"), Some(Gender::Male));
    /// assert_eq!(Gender::from_indicator("0.0"), Some(Gender::Female));
    /// assert_eq!(Gender::from_indicator("2"), None);
    /// ```
    #[must_use]
    pub fn from_indicator(indicator: &str) -> Option<Self> {
        let value = indicator.trim().parse::<f64>().ok()?;
        if value == 1.0 {
            Some(Self::Male)
        } else if value == 0.0 {
            Some(Self::Female)
        } else {
            None
        }
    }

    /// Canonical spelling of the `gender_num` indicator.
    #[must_use]
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Male => "1",
            Self::Female => "0",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.label() == label)
    }
}

/// Outcome columns of one patient, after imputation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatientOutcome {
    /// `hosp_exp_flg`: 1 when the patient died in hospital
    pub hospital_expiry: f64,
    /// `day_28_flg`: 1 when the patient died within 28 days
    pub day_28_expiry: f64,
    /// `censor_flg`: 0 when death was observed
    pub censor_flag: f64,
    pub icu_los_days: f64,
    pub hospital_los_days: f64,
}

impl PatientOutcome {
    #[must_use]
    pub fn death_observed(&self) -> bool {
        self.censor_flag == 0.0
    }
}

/// Fields of one patient row materialized by the loader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientProfile {
    pub gender: Gender,
    pub service_unit: String,
    /// Whether the patient received an indwelling arterial catheter
    pub arterial_line: bool,
    /// `None` when `day_icu_intime` does not name a weekday
    pub admission_weekday: Option<Weekday>,
    pub outcome: PatientOutcome,
    pub bins: DerivedBins,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_indicator() {
        assert_eq!(Gender::from_indicator("1"), Some(Gender::Male));
        assert_eq!(Gender::from_indicator(" 0 "), Some(Gender::Female));
        assert_eq!(Gender::from_indicator("1.0"), Some(Gender::Male));
        assert_eq!(Gender::from_indicator("M"), None);
        assert_eq!(Gender::from_indicator("0.5"), None);
        for &gender in Gender::ALL {
            assert_eq!(Gender::from_indicator(gender.indicator()), Some(gender));
        }
    }

    #[test]
    fn test_gender_labels() {
        for &gender in Gender::ALL {
            assert_eq!(Gender::from_label(gender.label()), Some(gender));
            assert_eq!(gender.to_string(), gender.label());
        }
    }

    #[test]
    fn test_death_observed() {
        let mut outcome = PatientOutcome {
            hospital_expiry: 1.0,
            day_28_expiry: 1.0,
            censor_flag: 0.0,
            icu_los_days: 2.0,
            hospital_los_days: 4.0,
        };
        assert!(outcome.death_observed());
        outcome.censor_flag = 1.0;
        assert!(!outcome.death_observed());
    }
}
