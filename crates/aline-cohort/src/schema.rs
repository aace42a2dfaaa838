//! Declared column schema of the cohort file
//!
//! Every column is classified as numeric or categorical up front. The loader
//! never infers a column's kind from its values, so the same file always
//! produces the same table.
//!
//! # Fixed Schema
//!
//! [`CohortSchema::arterial_line`] describes the 46-column arterial-line
//! cohort extract. Custom schemas can be declared with [`CohortSchema::new`]
//! as long as they contain the [`REQUIRED_COLUMNS`] with the right kinds.

use std::collections::HashSet;

use serde::Serialize;

/// Column names used by the pipeline.
pub mod col {
    pub const ALINE_FLG: &str = "aline_flg";
    pub const ICU_LOS_DAY: &str = "icu_los_day";
    pub const HOSPITAL_LOS_DAY: &str = "hospital_los_day";
    pub const AGE: &str = "age";
    pub const GENDER_NUM: &str = "gender_num";
    pub const WEIGHT_FIRST: &str = "weight_first";
    pub const BMI: &str = "bmi";
    pub const SERVICE_UNIT: &str = "service_unit";
    pub const DAY_ICU_INTIME: &str = "day_icu_intime";
    pub const HOUR_ICU_INTIME: &str = "hour_icu_intime";
    pub const HOSP_EXP_FLG: &str = "hosp_exp_flg";
    pub const DAY_28_FLG: &str = "day_28_flg";
    pub const CENSOR_FLG: &str = "censor_flg";

    // Columns appended by the loader
    pub const GENDER: &str = "gender";
    pub const AGE_GROUP: &str = "age_group";
    pub const WEIGHT_GROUP: &str = "weight_group";
    pub const BMI_GROUP: &str = "bmi_group";
    pub const ADMISSION_HOUR_GROUP: &str = "admission_hour_group";
    pub const ICU_LOS_GROUP: &str = "icu_los_group";
}

/// How a column's values are parsed and imputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Parsed as `f64`, missing values filled with the column median
    #[display("numeric")]
    Numeric,
    /// Kept as text, missing values filled with the column mode
    #[display("categorical")]
    Categorical,
}

/// A single declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    #[must_use]
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
        }
    }

    #[must_use]
    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical,
        }
    }
}

/// Columns the loader needs to derive bins and patient profiles.
pub const REQUIRED_COLUMNS: &[(&str, ColumnKind)] = &[
    (col::AGE, ColumnKind::Numeric),
    (col::GENDER_NUM, ColumnKind::Categorical),
    (col::WEIGHT_FIRST, ColumnKind::Numeric),
    (col::BMI, ColumnKind::Numeric),
    (col::SERVICE_UNIT, ColumnKind::Categorical),
    (col::DAY_ICU_INTIME, ColumnKind::Categorical),
    (col::HOUR_ICU_INTIME, ColumnKind::Numeric),
    (col::ICU_LOS_DAY, ColumnKind::Numeric),
    (col::HOSPITAL_LOS_DAY, ColumnKind::Numeric),
    (col::ALINE_FLG, ColumnKind::Numeric),
    (col::HOSP_EXP_FLG, ColumnKind::Numeric),
    (col::DAY_28_FLG, ColumnKind::Numeric),
    (col::CENSOR_FLG, ColumnKind::Numeric),
];

/// First-observation vitals, labs and severity scores.
///
/// These are the default candidates when ranking predictors of length of stay.
pub const OBSERVATION_COLUMNS: &[&str] = &[
    "sapsi_first",
    "sofa_first",
    "map_1st",
    "hr_1st",
    "temp_1st",
    "spo2_1st",
    "abg_count",
    "wbc_first",
    "hgb_first",
    "platelet_first",
    "sodium_first",
    "potassium_first",
    "tco2_first",
    "chloride_first",
    "bun_first",
    "creatinine_first",
    "po2_first",
    "pco2_first",
    "iv_day_1",
];

/// Length-of-stay outcome columns.
pub const LENGTH_OF_STAY_COLUMNS: &[&str] = &[col::ICU_LOS_DAY, col::HOSPITAL_LOS_DAY];

const ARTERIAL_LINE_COLUMNS: &[(&str, ColumnKind)] = &[
    (col::ALINE_FLG, ColumnKind::Numeric),
    (col::ICU_LOS_DAY, ColumnKind::Numeric),
    (col::HOSPITAL_LOS_DAY, ColumnKind::Numeric),
    (col::AGE, ColumnKind::Numeric),
    (col::GENDER_NUM, ColumnKind::Categorical),
    (col::WEIGHT_FIRST, ColumnKind::Numeric),
    (col::BMI, ColumnKind::Numeric),
    ("sapsi_first", ColumnKind::Numeric),
    ("sofa_first", ColumnKind::Numeric),
    (col::SERVICE_UNIT, ColumnKind::Categorical),
    ("service_num", ColumnKind::Numeric),
    (col::DAY_ICU_INTIME, ColumnKind::Categorical),
    ("day_icu_intime_num", ColumnKind::Numeric),
    (col::HOUR_ICU_INTIME, ColumnKind::Numeric),
    (col::HOSP_EXP_FLG, ColumnKind::Numeric),
    ("icu_exp_flg", ColumnKind::Numeric),
    (col::DAY_28_FLG, ColumnKind::Numeric),
    ("mort_day_censored", ColumnKind::Numeric),
    (col::CENSOR_FLG, ColumnKind::Numeric),
    ("sepsis_flg", ColumnKind::Numeric),
    ("chf_flg", ColumnKind::Numeric),
    ("afib_flg", ColumnKind::Numeric),
    ("renal_flg", ColumnKind::Numeric),
    ("liver_flg", ColumnKind::Numeric),
    ("copd_flg", ColumnKind::Numeric),
    ("cad_flg", ColumnKind::Numeric),
    ("stroke_flg", ColumnKind::Numeric),
    ("mal_flg", ColumnKind::Numeric),
    ("resp_flg", ColumnKind::Numeric),
    ("map_1st", ColumnKind::Numeric),
    ("hr_1st", ColumnKind::Numeric),
    ("temp_1st", ColumnKind::Numeric),
    ("spo2_1st", ColumnKind::Numeric),
    ("abg_count", ColumnKind::Numeric),
    ("wbc_first", ColumnKind::Numeric),
    ("hgb_first", ColumnKind::Numeric),
    ("platelet_first", ColumnKind::Numeric),
    ("sodium_first", ColumnKind::Numeric),
    ("potassium_first", ColumnKind::Numeric),
    ("tco2_first", ColumnKind::Numeric),
    ("chloride_first", ColumnKind::Numeric),
    ("bun_first", ColumnKind::Numeric),
    ("creatinine_first", ColumnKind::Numeric),
    ("po2_first", ColumnKind::Numeric),
    ("pco2_first", ColumnKind::Numeric),
    ("iv_day_1", ColumnKind::Numeric),
];

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SchemaError {
    #[display("schema is missing required column '{column}'")]
    MissingRequiredColumn { column: String },
    #[display("column '{column}' must be declared {expected}, found {actual}")]
    KindMismatch {
        column: String,
        expected: ColumnKind,
        actual: ColumnKind,
    },
    #[display("column '{column}' is declared more than once")]
    DuplicateColumn { column: String },
}

/// Ordered list of declared columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CohortSchema {
    columns: Vec<ColumnSpec>,
}

impl CohortSchema {
    /// Declare a schema, checking that the required columns are present.
    ///
    /// # Examples
    ///
    /// ```
    /// use aline_cohort::schema::{CohortSchema, ColumnSpec, SchemaError};
    ///
    /// let err = CohortSchema::new(vec![ColumnSpec::numeric("age")]).unwrap_err();
    /// assert!(matches!(err, SchemaError::MissingRequiredColumn { .. }));
    /// ```
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for spec in &columns {
            if !seen.insert(spec.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    column: spec.name.clone(),
                });
            }
        }

        for &(name, expected) in REQUIRED_COLUMNS {
            let spec = columns
                .iter()
                .find(|spec| spec.name == name)
                .ok_or_else(|| SchemaError::MissingRequiredColumn {
                    column: name.to_owned(),
                })?;
            if spec.kind != expected {
                return Err(SchemaError::KindMismatch {
                    column: name.to_owned(),
                    expected,
                    actual: spec.kind,
                });
            }
        }

        Ok(Self { columns })
    }

    /// Only the [`REQUIRED_COLUMNS`], in declaration order.
    #[must_use]
    pub fn core() -> Self {
        let columns = REQUIRED_COLUMNS
            .iter()
            .map(|&(name, kind)| ColumnSpec {
                name: name.to_owned(),
                kind,
            })
            .collect();
        Self { columns }
    }

    /// The fixed arterial-line cohort schema.
    #[must_use]
    pub fn arterial_line() -> Self {
        let columns = ARTERIAL_LINE_COLUMNS
            .iter()
            .map(|&(name, kind)| ColumnSpec {
                name: name.to_owned(),
                kind,
            })
            .collect();
        Self { columns }
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.kind)
    }
}

impl Default for CohortSchema {
    fn default() -> Self {
        Self::arterial_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arterial_line_schema_is_valid() {
        let schema = CohortSchema::arterial_line();
        assert_eq!(schema.columns().len(), 46);
        let revalidated = CohortSchema::new(schema.columns().to_vec()).unwrap();
        assert_eq!(revalidated, schema);
    }

    #[test]
    fn test_core_schema_is_valid() {
        let schema = CohortSchema::core();
        assert_eq!(schema.columns().len(), REQUIRED_COLUMNS.len());
        assert!(CohortSchema::new(schema.columns().to_vec()).is_ok());
    }

    #[test]
    fn test_observation_columns_are_numeric() {
        let schema = CohortSchema::arterial_line();
        for name in OBSERVATION_COLUMNS.iter().chain(LENGTH_OF_STAY_COLUMNS) {
            assert_eq!(schema.kind_of(name), Some(ColumnKind::Numeric), "{name}");
        }
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let mut columns = CohortSchema::arterial_line().columns().to_vec();
        for spec in &mut columns {
            if spec.name == col::GENDER_NUM {
                spec.kind = ColumnKind::Numeric;
            }
        }
        let err = CohortSchema::new(columns).unwrap_err();
        assert_eq!(
            err,
            SchemaError::KindMismatch {
                column: col::GENDER_NUM.to_owned(),
                expected: ColumnKind::Categorical,
                actual: ColumnKind::Numeric,
            }
        );
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut columns = CohortSchema::arterial_line().columns().to_vec();
        columns.push(ColumnSpec::numeric(col::BMI));
        let err = CohortSchema::new(columns).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
    }
}
