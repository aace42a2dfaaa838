//! Admission timing versus mortality
//!
//! Deaths here are observed deaths of the survival data (`censor_flg == 0`),
//! not the hospital expiry flag.

use std::collections::BTreeMap;

use aline_cohort::{
    CohortTable,
    bins::{AdmissionHourGroup, LosDayGroup},
    profile::PatientProfile,
};
use chrono::Weekday;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdmissionMortalityCell {
    pub los_group: LosDayGroup,
    pub admission_hour_group: AdmissionHourGroup,
    pub death_count: usize,
    pub patient_count: usize,
    /// `death_count / patient_count`, in `[0, 1]`
    pub mortality_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekdayMortalityRow {
    pub weekday: Weekday,
    pub death_count: usize,
    pub patient_count: usize,
    pub mortality_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    deaths: usize,
    patients: usize,
}

impl Tally {
    fn add(&mut self, patient: &PatientProfile) {
        self.patients += 1;
        if patient.outcome.death_observed() {
            self.deaths += 1;
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn rate(self) -> f64 {
        self.deaths as f64 / self.patients as f64
    }
}

/// Mortality per (ICU length-of-stay group, admission hour group) cell.
///
/// Cells are ordered by length-of-stay group, then admission hour group, and
/// only cells with at least one patient are emitted.
///
/// # Examples
///
/// ```
/// use aline_analysis::admission::admission_time_mortality_grid;
/// # use aline_cohort::{CohortSchema, loader::CohortLoader};
/// # let csv = "\
/// # age,gender_num,weight_first,bmi,service_unit,day_icu_intime,hour_icu_intime,icu_los_day,hospital_los_day,aline_flg,hosp_exp_flg,day_28_flg,censor_flg
/// # 50,1,80,26.1,MICU,Monday,2,1.0,6.0,1,0,0,0
/// # 60,1,80,26.1,MICU,Monday,6,4.0,8.0,1,0,0,1
/// # ";
/// # let table = CohortLoader::new(CohortSchema::core()).load_from_reader(csv.as_bytes()).unwrap();
///
/// let grid = admission_time_mortality_grid(&table);
/// assert_eq!(grid.len(), 1);
/// assert_eq!((grid[0].death_count, grid[0].patient_count), (1, 2));
/// assert_eq!(grid[0].mortality_rate, 0.5);
/// ```
#[must_use]
pub fn admission_time_mortality_grid(table: &CohortTable) -> Vec<AdmissionMortalityCell> {
    let mut cells = BTreeMap::<(LosDayGroup, AdmissionHourGroup), Tally>::new();
    for patient in table.patients() {
        cells
            .entry((patient.bins.icu_los, patient.bins.admission_hour))
            .or_default()
            .add(patient);
    }

    let grid = cells
        .into_iter()
        .map(|((los_group, admission_hour_group), tally)| AdmissionMortalityCell {
            los_group,
            admission_hour_group,
            death_count: tally.deaths,
            patient_count: tally.patients,
            mortality_rate: tally.rate(),
        })
        .collect::<Vec<_>>();
    if grid.is_empty() {
        tracing::info!("no patients for the admission-time grid");
    }
    grid
}

/// Mortality per admission weekday, Monday first.
///
/// Patients whose admission day is not a weekday name are left out.
#[must_use]
pub fn weekday_mortality(table: &CohortTable) -> Vec<WeekdayMortalityRow> {
    let mut days = BTreeMap::<u32, (Weekday, Tally)>::new();
    let mut skipped = 0;
    for patient in table.patients() {
        let Some(weekday) = patient.admission_weekday else {
            skipped += 1;
            continue;
        };
        days.entry(weekday.num_days_from_monday())
            .or_insert((weekday, Tally::default()))
            .1
            .add(patient);
    }
    if skipped > 0 {
        tracing::debug!(rows = skipped, "skipped patients without an admission weekday");
    }

    let rows = days
        .into_values()
        .map(|(weekday, tally)| WeekdayMortalityRow {
            weekday,
            death_count: tally.deaths,
            patient_count: tally.patients,
            mortality_rate: tally.rate(),
        })
        .collect::<Vec<_>>();
    if rows.is_empty() {
        tracing::info!("no patients with a known admission weekday");
    }
    rows
}
