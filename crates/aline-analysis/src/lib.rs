//! Derived tables over an arterial-line cohort
//!
//! Every function here is a pure function of a shared [`CohortTable`]
//! reference (plus its arguments); the table itself is never modified.
//!
//! | Question | Module |
//! |----------|--------|
//! | Demographics vs. catheter outcomes | [`demographics`] |
//! | Initial assessments vs. length of stay | [`selection`], [`correlation`] |
//! | Admission timing vs. mortality | [`admission`] |
//! | Data set at a glance | [`overview`] |
//!
//! [`CohortTable`]: aline_cohort::CohortTable

pub use self::{
    admission::{admission_time_mortality_grid, weekday_mortality},
    correlation::correlation_matrix,
    demographics::{bmi_mortality_by_unit, catheter_outcomes},
    overview::cohort_overview,
    selection::{FeatureSelector, InsufficientDataError, Selection, select_top_features},
};

pub mod admission;
pub mod correlation;
pub mod demographics;
pub mod overview;
pub mod selection;

#[cfg(test)]
mod testing;
