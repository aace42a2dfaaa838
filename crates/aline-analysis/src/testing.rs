//! In-memory cohort fixtures for unit tests.

use std::fmt::Write as _;

use aline_cohort::{
    CohortSchema, CohortTable,
    loader::CohortLoader,
    schema::{ColumnSpec, REQUIRED_COLUMNS},
};

#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub age: f64,
    pub male: bool,
    pub weight: f64,
    pub bmi: f64,
    pub unit: &'static str,
    pub day: &'static str,
    pub hour: f64,
    pub icu_los: f64,
    pub hospital_los: f64,
    pub aline: bool,
    pub hosp_exp: bool,
    pub day_28: bool,
    pub censored: bool,
    /// Values of the extra numeric columns, in declaration order
    pub extra: Vec<f64>,
}

impl Default for Row {
    fn default() -> Self {
        Self {
            age: 55.0,
            male: true,
            weight: 75.0,
            bmi: 24.0,
            unit: "MICU",
            day: "Monday",
            hour: 10.0,
            icu_los: 3.0,
            hospital_los: 7.0,
            aline: true,
            hosp_exp: false,
            day_28: false,
            censored: true,
            extra: Vec::new(),
        }
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// Load `rows` through the real loader, declaring `extra_columns` as numeric.
pub(crate) fn table(extra_columns: &[&str], rows: &[Row]) -> CohortTable {
    let mut specs = CohortSchema::core().columns().to_vec();
    specs.extend(extra_columns.iter().map(|&name| ColumnSpec::numeric(name)));
    let schema = CohortSchema::new(specs).unwrap();

    let mut csv = REQUIRED_COLUMNS
        .iter()
        .map(|(name, _)| *name)
        .chain(extra_columns.iter().copied())
        .collect::<Vec<_>>()
        .join(",");
    csv.push('\n');
    for row in rows {
        // same order as REQUIRED_COLUMNS
        write!(
            csv,
            "{},{},{},{},{},{},{},{},{},{},{},{},{}",
            row.age,
            flag(row.male),
            row.weight,
            row.bmi,
            row.unit,
            row.day,
            row.hour,
            row.icu_los,
            row.hospital_los,
            flag(row.aline),
            flag(row.hosp_exp),
            flag(row.day_28),
            flag(row.censored),
        )
        .unwrap();
        for value in &row.extra {
            write!(csv, ",{value}").unwrap();
        }
        csv.push('\n');
    }

    CohortLoader::new(schema)
        .load_from_reader(csv.as_bytes())
        .unwrap()
}
