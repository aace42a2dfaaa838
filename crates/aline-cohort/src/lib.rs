//! Arterial-line cohort data: loading, imputation, binning and filtering
//!
//! This crate turns the cohort file into an immutable [`CohortTable`] that the
//! analysis layer reads from.
//!
//! - [`schema`]: declared columns and their kinds
//! - [`loader`]: CSV parsing, imputation and derivation ([`prepare_data`])
//! - [`impute`]: median and mode imputation with a per-column report
//! - [`bins`]: ordinal bins for age, weight, BMI, admission hour and length of stay
//! - [`profile`]: typed per-patient view used by the aggregation views
//! - [`table`]: the column store with row selection
//! - [`filter`]: gender, age group and weight group filters
//!
//! # Examples
//!
//! ```
//! use aline_cohort::{CohortSchema, bins::AgeGroup, loader::CohortLoader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let csv = "\
//! age,gender_num,weight_first,bmi,service_unit,day_icu_intime,hour_icu_intime,icu_los_day,hospital_los_day,aline_flg,hosp_exp_flg,day_28_flg,censor_flg
//! 34,1,80,26.1,MICU,Monday,3,2.5,6.0,1,0,0,1
//! ,0,61,22.0,SICU,Friday,14,7.1,12.0,0,1,1,0
//! 40,0,58,,SICU,Friday,20,3.0,4.0,0,0,0,1
//! ";
//! let table = CohortLoader::new(CohortSchema::core()).load_from_reader(csv.as_bytes())?;
//!
//! assert_eq!(table.patients()[1].bins.age, AgeGroup::Age30To39);
//! assert_eq!(table.imputation().total_filled(), 2);
//! # Ok(())
//! # }
//! ```

pub use self::{
    filter::CohortFilter,
    loader::{DataLoadError, prepare_data},
    schema::CohortSchema,
    table::{CohortTable, ColumnError},
};

pub mod bins;
pub mod filter;
pub mod impute;
pub mod loader;
pub mod profile;
pub mod schema;
pub mod table;
