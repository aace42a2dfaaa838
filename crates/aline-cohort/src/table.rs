//! The immutable in-memory cohort table
//!
//! A [`CohortTable`] is produced once by the loader and then only read.
//! Every derivation (filtering, row selection) returns a new table, so the
//! reference table can be shared freely between computations.

use std::collections::HashMap;

use serde::Serialize;

use crate::{filter::CohortFilter, impute::ImputationReport, profile::PatientProfile};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValues {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnValues {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Categorical(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(values) => Self::Numeric(rows.iter().map(|&i| values[i]).collect()),
            Self::Categorical(values) => {
                Self::Categorical(rows.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }
}

/// A named column of a [`CohortTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ColumnError {
    #[display("unknown column '{name}'")]
    Unknown { name: String },
    #[display("column '{name}' is not numeric")]
    NotNumeric { name: String },
    #[display("column '{name}' is not categorical")]
    NotCategorical { name: String },
}

pub(crate) fn find_numeric<'a>(columns: &'a [Column], name: &str) -> Result<&'a [f64], ColumnError> {
    let column = columns
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| ColumnError::Unknown {
            name: name.to_owned(),
        })?;
    match &column.values {
        ColumnValues::Numeric(values) => Ok(values),
        ColumnValues::Categorical(_) => Err(ColumnError::NotNumeric {
            name: name.to_owned(),
        }),
    }
}

pub(crate) fn find_categorical<'a>(
    columns: &'a [Column],
    name: &str,
) -> Result<&'a [String], ColumnError> {
    let column = columns
        .iter()
        .find(|c| c.name == name)
        .ok_or_else(|| ColumnError::Unknown {
            name: name.to_owned(),
        })?;
    match &column.values {
        ColumnValues::Categorical(values) => Ok(values),
        ColumnValues::Numeric(_) => Err(ColumnError::NotCategorical {
            name: name.to_owned(),
        }),
    }
}

/// Imputed cohort data: named columns plus one typed profile per row.
///
/// # Examples
///
/// ```
/// use aline_cohort::{CohortFilter, CohortSchema, loader::CohortLoader, profile::Gender};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let csv = "\
/// age,gender_num,weight_first,bmi,service_unit,day_icu_intime,hour_icu_intime,icu_los_day,hospital_los_day,aline_flg,hosp_exp_flg,day_28_flg,censor_flg
/// 54,1,80,26.1,MICU,Monday,3,2.5,6.0,1,0,0,1
/// 71,0,,22.0,SICU,Friday,14,7.1,12.0,0,1,1,0
/// ";
/// let table = CohortLoader::new(CohortSchema::core()).load_from_reader(csv.as_bytes())?;
/// assert_eq!(table.row_count(), 2);
///
/// let women = table.filter(&CohortFilter::default().with_genders([Gender::Female]));
/// assert_eq!(women.row_count(), 1);
/// assert_eq!(table.row_count(), 2); // the reference table is untouched
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CohortTable {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    patients: Vec<PatientProfile>,
    imputation: ImputationReport,
}

impl CohortTable {
    pub(crate) fn new(
        columns: Vec<Column>,
        patients: Vec<PatientProfile>,
        imputation: ImputationReport,
    ) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == patients.len()));
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self {
            columns,
            index,
            patients,
            imputation,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.patients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i])
    }

    pub fn numeric(&self, name: &str) -> Result<&[f64], ColumnError> {
        match self.column(name).map(|c| &c.values) {
            Some(ColumnValues::Numeric(values)) => Ok(values),
            Some(ColumnValues::Categorical(_)) => Err(ColumnError::NotNumeric {
                name: name.to_owned(),
            }),
            None => Err(ColumnError::Unknown {
                name: name.to_owned(),
            }),
        }
    }

    pub fn categorical(&self, name: &str) -> Result<&[String], ColumnError> {
        match self.column(name).map(|c| &c.values) {
            Some(ColumnValues::Categorical(values)) => Ok(values),
            Some(ColumnValues::Numeric(_)) => Err(ColumnError::NotCategorical {
                name: name.to_owned(),
            }),
            None => Err(ColumnError::Unknown {
                name: name.to_owned(),
            }),
        }
    }

    #[must_use]
    pub fn patients(&self) -> &[PatientProfile] {
        &self.patients
    }

    /// What the loader filled in. Carried unchanged into derived tables.
    #[must_use]
    pub fn imputation(&self) -> &ImputationReport {
        &self.imputation
    }

    /// New table containing the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if a row index is out of bounds.
    #[must_use]
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c.values.select(rows),
            })
            .collect();
        let patients = rows.iter().map(|&i| self.patients[i].clone()).collect();
        Self::new(columns, patients, self.imputation.clone())
    }

    /// New table containing the rows matching `filter`.
    #[must_use]
    pub fn filter(&self, filter: &CohortFilter) -> Self {
        if filter.is_unrestricted() {
            return self.clone();
        }
        let rows = self
            .patients
            .iter()
            .enumerate()
            .filter(|(_, patient)| filter.matches(patient))
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        self.select_rows(&rows)
    }
}
