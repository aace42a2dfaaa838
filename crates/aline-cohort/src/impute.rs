//! Missing-value imputation
//!
//! Numeric columns are filled with the median of their observed values and
//! categorical columns with their mode (ties resolved toward the value seen
//! first). Both fill values are computed over the whole column before any
//! filtering, so the result depends only on the input file.

use aline_stats::{descriptive, frequency};
use serde::Serialize;

/// A column after imputation together with what was filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Imputed<T> {
    pub values: Vec<T>,
    pub fill_value: T,
    /// Number of cells that were missing
    pub filled: usize,
}

/// Fill missing numeric values with the column median.
///
/// Returns `None` when the column has no observed values.
///
/// # Examples
///
/// ```
/// use aline_cohort::impute::impute_numeric;
///
/// let imputed = impute_numeric(vec![Some(1.0), Some(2.0), None, Some(4.0)]).unwrap();
/// assert_eq!(imputed.values, vec![1.0, 2.0, 2.0, 4.0]);
/// assert_eq!(imputed.filled, 1);
/// ```
#[must_use]
pub fn impute_numeric(values: Vec<Option<f64>>) -> Option<Imputed<f64>> {
    let fill_value = descriptive::median(values.iter().flatten().copied())?;
    let filled = values.iter().filter(|v| v.is_none()).count();
    let values = values
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Some(Imputed {
        values,
        fill_value,
        filled,
    })
}

/// Fill missing categorical values with the column mode.
///
/// Returns `None` when the column has no observed values.
///
/// # Examples
///
/// ```
/// use aline_cohort::impute::impute_categorical;
///
/// let column = vec![Some("A".to_owned()), Some("A".to_owned()), None, Some("B".to_owned())];
/// let imputed = impute_categorical(column).unwrap();
/// assert_eq!(imputed.values, vec!["A", "A", "A", "B"]);
/// ```
#[must_use]
pub fn impute_categorical(values: Vec<Option<String>>) -> Option<Imputed<String>> {
    let fill_value = frequency::mode(values.iter().flatten())?.clone();
    let filled = values.iter().filter(|v| v.is_none()).count();
    let values = values
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.clone()))
        .collect();
    Some(Imputed {
        values,
        fill_value,
        filled,
    })
}

/// The value a column was filled with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FillValue {
    Numeric(f64),
    Categorical(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputedColumn {
    pub column: String,
    pub filled: usize,
    pub fill_value: FillValue,
}

/// Per-column record of the cells the loader filled in.
///
/// Only columns with at least one missing cell are listed, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImputationReport {
    pub columns: Vec<ImputedColumn>,
}

impl ImputationReport {
    #[must_use]
    pub fn total_filled(&self) -> usize {
        self.columns.iter().map(|c| c.filled).sum()
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&ImputedColumn> {
        self.columns.iter().find(|c| c.column == column)
    }

    pub(crate) fn record<T>(&mut self, column: &str, imputed: &Imputed<T>)
    where
        T: Clone + Into<FillValue>,
    {
        if imputed.filled == 0 {
            return;
        }
        self.columns.push(ImputedColumn {
            column: column.to_owned(),
            filled: imputed.filled,
            fill_value: imputed.fill_value.clone().into(),
        });
    }
}

impl From<f64> for FillValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<String> for FillValue {
    fn from(value: String) -> Self {
        Self::Categorical(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_median_fill() {
        let imputed = impute_numeric(vec![Some(1.0), Some(2.0), None, Some(4.0)]).unwrap();
        assert_eq!(imputed.values, vec![1.0, 2.0, 2.0, 4.0]);
        assert_eq!(imputed.fill_value, 2.0);
        assert_eq!(imputed.filled, 1);
    }

    #[test]
    fn test_numeric_even_count_median() {
        let imputed = impute_numeric(vec![None, Some(1.0), Some(4.0), None]).unwrap();
        assert_eq!(imputed.values, vec![2.5, 1.0, 4.0, 2.5]);
        assert_eq!(imputed.filled, 2);
    }

    #[test]
    fn test_numeric_without_missing() {
        let imputed = impute_numeric(vec![Some(3.0), Some(1.0)]).unwrap();
        assert_eq!(imputed.values, vec![3.0, 1.0]);
        assert_eq!(imputed.filled, 0);
    }

    #[test]
    fn test_numeric_all_missing() {
        assert!(impute_numeric(vec![None, None]).is_none());
    }

    #[test]
    fn test_categorical_mode_fill() {
        let column = ["A", "A", "", "B"]
            .into_iter()
            .map(|s| (!s.is_empty()).then(|| s.to_owned()))
            .collect();
        let imputed = impute_categorical(column).unwrap();
        assert_eq!(imputed.values, vec!["A", "A", "A", "B"]);
        assert_eq!(imputed.fill_value, "A");
    }

    #[test]
    fn test_categorical_tie_uses_first_seen() {
        let column = vec![
            Some("MICU".to_owned()),
            Some("SICU".to_owned()),
            None,
            Some("SICU".to_owned()),
            Some("MICU".to_owned()),
        ];
        let imputed = impute_categorical(column).unwrap();
        assert_eq!(imputed.values[2], "MICU");
    }

    #[test]
    fn test_report_skips_complete_columns() {
        let mut report = ImputationReport::default();
        report.record("bmi", &impute_numeric(vec![Some(1.0), None, Some(3.0)]).unwrap());
        report.record("age", &impute_numeric(vec![Some(1.0)]).unwrap());
        assert_eq!(report.columns.len(), 1);
        assert_eq!(report.total_filled(), 1);
        assert_eq!(report.get("bmi").unwrap().fill_value, FillValue::Numeric(2.0));
        assert!(report.get("age").is_none());
    }
}
