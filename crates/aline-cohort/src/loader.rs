//! Cohort file loading
//!
//! The loader turns the delimited cohort file into a [`CohortTable`]:
//!
//! 1. **Parse** every declared column with its declared [`ColumnKind`]
//! 2. **Impute** missing numeric cells with the column median and missing
//!    categorical cells with the column mode (see [`impute`](crate::impute))
//! 3. **Derive** gender from `gender_num` and the ordinal bins from age,
//!    weight, BMI, admission hour and ICU length of stay
//! 4. **Append** the derived labels as categorical columns
//!
//! Columns in the file that the schema does not declare are ignored.
//! Numeric cells must be finite; `inf` or a NaN spelling that is not a
//! missing token is rejected. `gender_num` cells are normalized to `0`/`1`
//! while parsing, so `1` and `1.0` count as the same value when imputing.
//!
//! # Examples
//!
//! ```no_run
//! use aline_cohort::loader::prepare_data;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = prepare_data("data/full_cohort_data.csv")?;
//! println!("Loaded {} patients", table.row_count());
//! # Ok(())
//! # }
//! ```

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use chrono::Weekday;

use crate::{
    bins::{Bin, DerivedBins},
    impute::{self, ImputationReport},
    profile::{Gender, PatientOutcome, PatientProfile},
    schema::{CohortSchema, ColumnKind, col},
    table::{self, CohortTable, Column, ColumnError, ColumnValues},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum DataLoadError {
    #[display("failed to open cohort file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("failed to read cohort data: {source}")]
    Csv { source: csv::Error },
    #[display("cohort file is missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    #[display("invalid numeric value '{value}' in column '{column}' at data row {row}")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },
    #[display("invalid gender indicator '{value}' at data row {row} (expected 0 or 1)")]
    InvalidGender { row: usize, value: String },
    #[display("column '{column}' has no observed values to impute from")]
    NoObservedValues { column: String },
    #[display("cohort file contains no patient rows")]
    Empty,
    #[display("cohort column unavailable: {source}")]
    Column { source: ColumnError },
}

impl From<ColumnError> for DataLoadError {
    fn from(source: ColumnError) -> Self {
        Self::Column { source }
    }
}

/// Parsing options for the cohort file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Field values treated as missing (compared after trimming)
    pub missing_tokens: Vec<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            missing_tokens: ["", "NA", "N/A", "NaN", "nan", "null"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

enum RawValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

/// Loads cohort files according to a declared schema.
#[derive(Debug, Clone, Default)]
pub struct CohortLoader {
    schema: CohortSchema,
    options: LoaderOptions,
}

/// Load the cohort file at `path` with the fixed arterial-line schema.
pub fn prepare_data<P>(path: P) -> Result<CohortTable, DataLoadError>
where
    P: AsRef<Path>,
{
    CohortLoader::default().load(path)
}

impl CohortLoader {
    #[must_use]
    pub fn new(schema: CohortSchema) -> Self {
        Self {
            schema,
            options: LoaderOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn load<P>(&self, path: P) -> Result<CohortTable, DataLoadError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataLoadError::Open {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading cohort file");
        self.load_from_reader(io::BufReader::new(file))
    }

    pub fn load_from_reader<R>(&self, reader: R) -> Result<CohortTable, DataLoadError>
    where
        R: io::Read,
    {
        let raw = self.parse(reader)?;
        let row_count = raw.first().map_or(0, |values| match values {
            RawValues::Numeric(v) => v.len(),
            RawValues::Categorical(v) => v.len(),
        });
        if row_count == 0 {
            return Err(DataLoadError::Empty);
        }

        let (mut columns, imputation) = self.impute(raw)?;
        let patients = derive_profiles(&columns, row_count)?;
        append_derived_columns(&mut columns, &patients);

        tracing::debug!(
            rows = row_count,
            columns = columns.len(),
            imputed_cells = imputation.total_filled(),
            "cohort loaded"
        );
        Ok(CohortTable::new(columns, patients, imputation))
    }

    fn is_missing(&self, field: &str) -> bool {
        self.options.missing_tokens.iter().any(|token| token == field)
    }

    fn parse<R>(&self, reader: R) -> Result<Vec<RawValues>, DataLoadError>
    where
        R: io::Read,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|source| DataLoadError::Csv { source })?
            .clone();

        let mut positions = Vec::with_capacity(self.schema.columns().len());
        let mut missing = Vec::new();
        for spec in self.schema.columns() {
            match headers.iter().position(|h| h == spec.name) {
                Some(pos) => positions.push(pos),
                None => missing.push(spec.name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns { columns: missing });
        }

        let ignored = headers
            .iter()
            .filter(|h| self.schema.kind_of(h).is_none())
            .collect::<Vec<_>>();
        if !ignored.is_empty() {
            tracing::debug!(?ignored, "ignoring undeclared columns");
        }

        let mut raw = self
            .schema
            .columns()
            .iter()
            .map(|spec| match spec.kind {
                ColumnKind::Numeric => RawValues::Numeric(Vec::new()),
                ColumnKind::Categorical => RawValues::Categorical(Vec::new()),
            })
            .collect::<Vec<_>>();

        for (record_index, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|source| DataLoadError::Csv { source })?;
            let row = record_index + 1;
            for ((spec, &pos), values) in self.schema.columns().iter().zip(&positions).zip(&mut raw)
            {
                let field = record.get(pos).unwrap_or("");
                let field = (!self.is_missing(field)).then_some(field);
                match values {
                    RawValues::Numeric(values) => {
                        let value = field
                            .map(|f| {
                                f.parse::<f64>()
                                    .ok()
                                    .filter(|v| v.is_finite())
                                    .ok_or_else(|| DataLoadError::InvalidNumber {
                                        column: spec.name.clone(),
                                        row,
                                        value: f.to_owned(),
                                    })
                            })
                            .transpose()?;
                        values.push(value);
                    }
                    RawValues::Categorical(values) if spec.name == col::GENDER_NUM => {
                        let value = field
                            .map(|f| {
                                Gender::from_indicator(f)
                                    .map(|g| g.indicator().to_owned())
                                    .ok_or_else(|| DataLoadError::InvalidGender {
                                        row,
                                        value: f.to_owned(),
                                    })
                            })
                            .transpose()?;
                        values.push(value);
                    }
                    RawValues::Categorical(values) => values.push(field.map(str::to_owned)),
                }
            }
        }

        Ok(raw)
    }

    fn impute(&self, raw: Vec<RawValues>) -> Result<(Vec<Column>, ImputationReport), DataLoadError> {
        let mut report = ImputationReport::default();
        let mut columns = Vec::with_capacity(raw.len() + DERIVED_COLUMNS.len());

        for (spec, values) in self.schema.columns().iter().zip(raw) {
            let no_values = || DataLoadError::NoObservedValues {
                column: spec.name.clone(),
            };
            let values = match values {
                RawValues::Numeric(values) => {
                    let imputed = impute::impute_numeric(values).ok_or_else(no_values)?;
                    report.record(&spec.name, &imputed);
                    ColumnValues::Numeric(imputed.values)
                }
                RawValues::Categorical(values) => {
                    let imputed = impute::impute_categorical(values).ok_or_else(no_values)?;
                    report.record(&spec.name, &imputed);
                    ColumnValues::Categorical(imputed.values)
                }
            };
            columns.push(Column {
                name: spec.name.clone(),
                values,
            });
        }

        for imputed in &report.columns {
            tracing::debug!(
                column = %imputed.column,
                filled = imputed.filled,
                "imputed missing values"
            );
        }

        Ok((columns, report))
    }
}

const DERIVED_COLUMNS: &[&str] = &[
    col::GENDER,
    col::AGE_GROUP,
    col::WEIGHT_GROUP,
    col::BMI_GROUP,
    col::ADMISSION_HOUR_GROUP,
    col::ICU_LOS_GROUP,
];

fn derive_profiles(columns: &[Column], row_count: usize) -> Result<Vec<PatientProfile>, DataLoadError> {
    let numeric = |name: &str| table::find_numeric(columns, name);
    let categorical = |name: &str| table::find_categorical(columns, name);

    let age = numeric(col::AGE)?;
    let weight = numeric(col::WEIGHT_FIRST)?;
    let bmi = numeric(col::BMI)?;
    let hour = numeric(col::HOUR_ICU_INTIME)?;
    let icu_los = numeric(col::ICU_LOS_DAY)?;
    let hospital_los = numeric(col::HOSPITAL_LOS_DAY)?;
    let aline = numeric(col::ALINE_FLG)?;
    let hosp_exp = numeric(col::HOSP_EXP_FLG)?;
    let day_28 = numeric(col::DAY_28_FLG)?;
    let censor = numeric(col::CENSOR_FLG)?;
    let gender_num = categorical(col::GENDER_NUM)?;
    let service_unit = categorical(col::SERVICE_UNIT)?;
    let weekday = categorical(col::DAY_ICU_INTIME)?;

    let mut unknown_weekdays = 0;
    let patients = (0..row_count)
        .map(|i| {
            let gender =
                Gender::from_indicator(&gender_num[i]).ok_or_else(|| DataLoadError::InvalidGender {
                    row: i + 1,
                    value: gender_num[i].clone(),
                })?;
            let admission_weekday = weekday[i].parse::<Weekday>().ok();
            if admission_weekday.is_none() {
                unknown_weekdays += 1;
            }
            Ok(PatientProfile {
                gender,
                service_unit: service_unit[i].clone(),
                arterial_line: aline[i] != 0.0,
                admission_weekday,
                outcome: PatientOutcome {
                    hospital_expiry: hosp_exp[i],
                    day_28_expiry: day_28[i],
                    censor_flag: censor[i],
                    icu_los_days: icu_los[i],
                    hospital_los_days: hospital_los[i],
                },
                bins: DerivedBins::classify(age[i], weight[i], bmi[i], hour[i], icu_los[i]),
            })
        })
        .collect::<Result<Vec<_>, DataLoadError>>()?;

    if unknown_weekdays > 0 {
        tracing::debug!(rows = unknown_weekdays, "admission day is not a weekday name");
    }
    Ok(patients)
}

fn append_derived_columns(columns: &mut Vec<Column>, patients: &[PatientProfile]) {
    fn labels<F>(patients: &[PatientProfile], f: F) -> ColumnValues
    where
        F: Fn(&PatientProfile) -> &'static str,
    {
        ColumnValues::Categorical(patients.iter().map(|p| f(p).to_owned()).collect())
    }

    let derived = [
        labels(patients, |p| p.gender.label()),
        labels(patients, |p| p.bins.age.label()),
        labels(patients, |p| p.bins.weight.label()),
        labels(patients, |p| p.bins.bmi.label()),
        labels(patients, |p| p.bins.admission_hour.label()),
        labels(patients, |p| p.bins.icu_los.label()),
    ];
    for (&name, values) in DERIVED_COLUMNS.iter().zip(derived) {
        // a declared column of the same name is replaced by the derived one
        columns.retain(|c| c.name != name);
        columns.push(Column {
            name: name.to_owned(),
            values,
        });
    }
}
