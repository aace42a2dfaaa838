//! Cohort overview: size, bin distributions, key column statistics and
//! what the loader imputed

use aline_cohort::{
    CohortTable, ColumnError,
    bins::Bin,
    impute::ImputationReport,
    profile::{Gender, PatientProfile},
    schema::col,
};
use aline_stats::descriptive::DescriptiveStats;
use serde::Serialize;

/// Columns summarized by [`cohort_overview`].
pub const SUMMARY_COLUMNS: &[&str] = &[
    col::AGE,
    col::WEIGHT_FIRST,
    col::BMI,
    col::ICU_LOS_DAY,
    col::HOSPITAL_LOS_DAY,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinCount {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Patient counts per label, in ordinal order, including empty labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distributions {
    pub gender: Vec<BinCount>,
    pub age_group: Vec<BinCount>,
    pub weight_group: Vec<BinCount>,
    pub bmi_group: Vec<BinCount>,
    pub admission_hour_group: Vec<BinCount>,
    pub icu_los_group: Vec<BinCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortOverview {
    pub row_count: usize,
    pub column_count: usize,
    pub arterial_line_count: usize,
    pub distributions: Distributions,
    pub statistics: Vec<ColumnSummary>,
    pub imputation: ImputationReport,
}

fn bin_counts<B, F>(patients: &[PatientProfile], bin_of: F) -> Vec<BinCount>
where
    B: Bin,
    F: Fn(&PatientProfile) -> B,
{
    B::ALL
        .iter()
        .map(|&bin| BinCount {
            label: bin.label(),
            count: patients.iter().filter(|p| bin_of(p) == bin).count(),
        })
        .collect()
}

pub fn cohort_overview(table: &CohortTable) -> Result<CohortOverview, ColumnError> {
    let patients = table.patients();

    let gender = Gender::ALL
        .iter()
        .map(|&gender| BinCount {
            label: gender.label(),
            count: patients.iter().filter(|p| p.gender == gender).count(),
        })
        .collect();
    let distributions = Distributions {
        gender,
        age_group: bin_counts(patients, |p| p.bins.age),
        weight_group: bin_counts(patients, |p| p.bins.weight),
        bmi_group: bin_counts(patients, |p| p.bins.bmi),
        admission_hour_group: bin_counts(patients, |p| p.bins.admission_hour),
        icu_los_group: bin_counts(patients, |p| p.bins.icu_los),
    };

    let mut statistics = Vec::with_capacity(SUMMARY_COLUMNS.len());
    for &column in SUMMARY_COLUMNS {
        let values = table.numeric(column)?;
        let Some(stats) = DescriptiveStats::new(values.iter().copied()) else {
            continue;
        };
        statistics.push(ColumnSummary {
            column: column.to_owned(),
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            median: stats.median,
            std_dev: stats.std_dev,
        });
    }

    Ok(CohortOverview {
        row_count: table.row_count(),
        column_count: table.columns().len(),
        arterial_line_count: patients.iter().filter(|p| p.arterial_line).count(),
        distributions,
        statistics,
        imputation: table.imputation().clone(),
    })
}
