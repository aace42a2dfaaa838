//! Pearson correlation matrix in long form

use std::collections::HashSet;

use aline_cohort::{CohortTable, ColumnError};
use aline_stats::correlation::pearson;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub row: String,
    pub column: String,
    /// `None` when either column is constant
    pub value: Option<f64>,
}

/// Square correlation matrix melted to `(row, column, value)` cells.
///
/// Cells are in row-major order over [`columns`](Self::columns).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub cells: Vec<CorrelationCell>,
}

impl CorrelationMatrix {
    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        self.cells[i * self.columns.len() + j].value
    }
}

/// Correlations between every pair of `selected` and `targets` columns.
///
/// The matrix covers the selected columns followed by the targets that are
/// not already selected, each column once.
///
/// # Examples
///
/// ```
/// use aline_analysis::correlation::correlation_matrix;
/// # use aline_cohort::{CohortSchema, loader::CohortLoader};
/// # let csv = "\
/// # age,gender_num,weight_first,bmi,service_unit,day_icu_intime,hour_icu_intime,icu_los_day,hospital_los_day,aline_flg,hosp_exp_flg,day_28_flg,censor_flg
/// # 50,1,80,26.1,MICU,Monday,3,2.0,6.0,1,0,0,1
/// # 60,1,80,26.1,MICU,Monday,3,3.0,8.0,1,0,0,1
/// # 70,1,80,26.1,MICU,Monday,3,4.0,10.0,1,0,0,1
/// # ";
/// # let table = CohortLoader::new(CohortSchema::core()).load_from_reader(csv.as_bytes()).unwrap();
///
/// let matrix = correlation_matrix(&table, &["age"], &["icu_los_day", "age"]).unwrap();
/// assert_eq!(matrix.columns, ["age", "icu_los_day"]);
/// assert_eq!(matrix.cells.len(), 4);
/// assert!((matrix.get("age", "icu_los_day").unwrap() - 1.0).abs() < 1e-12);
/// ```
pub fn correlation_matrix<S, T>(
    table: &CohortTable,
    selected: &[S],
    targets: &[T],
) -> Result<CorrelationMatrix, ColumnError>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let mut seen = HashSet::new();
    let columns = selected
        .iter()
        .map(|s| s.as_ref())
        .chain(targets.iter().map(|t| t.as_ref()))
        .filter(|name| seen.insert(*name))
        .collect::<Vec<_>>();
    let values = columns
        .iter()
        .map(|name| table.numeric(name))
        .collect::<Result<Vec<_>, _>>()?;

    let n = columns.len();
    let mut matrix = vec![None; n * n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(values[i], values[j]);
            matrix[i * n + j] = r;
            matrix[j * n + i] = r;
        }
    }

    let cells = matrix
        .into_iter()
        .enumerate()
        .map(|(index, value)| CorrelationCell {
            row: columns[index / n].to_owned(),
            column: columns[index % n].to_owned(),
            value,
        })
        .collect::<Vec<_>>();
    if cells.is_empty() {
        tracing::info!("no columns to correlate");
    }

    Ok(CorrelationMatrix {
        columns: columns.into_iter().map(str::to_owned).collect(),
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Row, table};

    fn sample() -> CohortTable {
        let rows = [(1.0, 9.0, 2.0), (2.0, 7.0, 4.0), (3.0, 8.0, 6.5), (4.0, 1.0, 8.0)]
            .into_iter()
            .map(|(a, b, los)| Row {
                icu_los: los,
                extra: vec![a, b, 5.0],
                ..Row::default()
            })
            .collect::<Vec<_>>();
        table(&["sofa_first", "map_1st", "iv_day_1"], &rows)
    }

    #[test]
    fn test_union_order_and_shape() {
        let matrix = correlation_matrix(
            &sample(),
            &["sofa_first", "map_1st"],
            &["icu_los_day", "hospital_los_day", "sofa_first"],
        )
        .unwrap();
        assert_eq!(
            matrix.columns,
            ["sofa_first", "map_1st", "icu_los_day", "hospital_los_day"]
        );
        assert_eq!(matrix.cells.len(), 16);
        assert_eq!(matrix.cells[1].row, "sofa_first");
        assert_eq!(matrix.cells[1].column, "map_1st");
    }

    #[test]
    fn test_diagonal_and_symmetry() {
        let matrix =
            correlation_matrix(&sample(), &["sofa_first", "map_1st"], &["icu_los_day"]).unwrap();
        for name in &matrix.columns {
            let r = matrix.get(name, name).unwrap();
            assert!((r - 1.0).abs() < 1e-12);
        }
        for a in &matrix.columns {
            for b in &matrix.columns {
                assert_eq!(matrix.get(a, b), matrix.get(b, a));
            }
        }
        assert!(matrix.get("sofa_first", "map_1st").unwrap() < 0.0);
        assert!(matrix.get("sofa_first", "icu_los_day").unwrap() > 0.9);
    }

    #[test]
    fn test_constant_column_has_no_coefficient() {
        let matrix = correlation_matrix(&sample(), &["iv_day_1"], &["icu_los_day"]).unwrap();
        assert_eq!(matrix.get("iv_day_1", "icu_los_day"), None);
        assert_eq!(matrix.get("iv_day_1", "iv_day_1"), None);
        assert!(matrix.get("icu_los_day", "icu_los_day").is_some());
    }

    #[test]
    fn test_unknown_or_categorical_column() {
        let table = sample();
        assert!(matches!(
            correlation_matrix(&table, &["lactate"], &["icu_los_day"]),
            Err(ColumnError::Unknown { .. })
        ));
        assert!(matches!(
            correlation_matrix(&table, &["service_unit"], &["icu_los_day"]),
            Err(ColumnError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_empty_selection() {
        let none: [&str; 0] = [];
        let matrix = correlation_matrix(&sample(), &none, &none).unwrap();
        assert!(matrix.columns.is_empty());
        assert!(matrix.cells.is_empty());
    }
}
