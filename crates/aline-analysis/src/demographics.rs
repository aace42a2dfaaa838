//! Demographics versus catheter outcomes
//!
//! Both views apply a [`CohortFilter`] first and aggregate the remaining
//! patients. An empty selection is not an error; it yields no rows.

use std::collections::BTreeMap;

use aline_cohort::{CohortFilter, CohortTable, bins::BmiGroup, profile::PatientProfile};
use aline_stats::descriptive;
use serde::Serialize;

/// Hospital mortality of one (BMI group, service unit) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmiMortalityRow {
    pub bmi_group: BmiGroup,
    pub service_unit: String,
    pub patient_count: usize,
    /// Mean of `hosp_exp_flg`, in percent
    pub mortality_rate_pct: f64,
}

/// Outcomes of the patients with or without an arterial catheter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatheterOutcomeRow {
    pub arterial_line: bool,
    pub patient_count: usize,
    pub hospital_mortality_pct: f64,
    pub day_28_mortality_pct: f64,
    pub mean_icu_los_days: f64,
    pub mean_hospital_los_days: f64,
}

fn filtered<'a>(
    table: &'a CohortTable,
    filter: &'a CohortFilter,
) -> impl Iterator<Item = &'a PatientProfile> {
    table.patients().iter().filter(|p| filter.matches(p))
}

fn percent<'a, I>(patients: I, flag: impl Fn(&PatientProfile) -> f64) -> f64
where
    I: IntoIterator<Item = &'a PatientProfile>,
{
    descriptive::mean(patients.into_iter().map(flag)).unwrap_or(0.0) * 100.0
}

/// Hospital mortality grouped by BMI group and service unit.
///
/// Rows are ordered by BMI group, then service unit name. Only cells with at
/// least one patient are emitted.
///
/// # Examples
///
/// ```
/// use aline_analysis::demographics::bmi_mortality_by_unit;
/// use aline_cohort::{CohortFilter, CohortSchema, loader::CohortLoader, profile::Gender};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let csv = "\
/// age,gender_num,weight_first,bmi,service_unit,day_icu_intime,hour_icu_intime,icu_los_day,hospital_los_day,aline_flg,hosp_exp_flg,day_28_flg,censor_flg
/// 54,1,80,26.1,MICU,Monday,3,2.5,6.0,1,1,1,0
/// 61,1,90,27.3,MICU,Friday,14,7.1,12.0,0,0,0,1
/// 71,0,60,22.0,SICU,Friday,14,7.1,12.0,0,0,0,1
/// ";
/// let table = CohortLoader::new(CohortSchema::core()).load_from_reader(csv.as_bytes())?;
///
/// let men = CohortFilter::default().with_genders([Gender::Male]);
/// let rows = bmi_mortality_by_unit(&table, &men);
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].service_unit, "MICU");
/// assert_eq!(rows[0].mortality_rate_pct, 50.0);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn bmi_mortality_by_unit(table: &CohortTable, filter: &CohortFilter) -> Vec<BmiMortalityRow> {
    let mut groups = BTreeMap::<(BmiGroup, &str), Vec<&PatientProfile>>::new();
    for patient in filtered(table, filter) {
        groups
            .entry((patient.bins.bmi, patient.service_unit.as_str()))
            .or_default()
            .push(patient);
    }

    let rows = groups
        .into_iter()
        .map(|((bmi_group, service_unit), patients)| BmiMortalityRow {
            bmi_group,
            service_unit: service_unit.to_owned(),
            patient_count: patients.len(),
            mortality_rate_pct: percent(patients, |p| p.outcome.hospital_expiry),
        })
        .collect::<Vec<_>>();
    if rows.is_empty() {
        tracing::info!("no patients match the demographic filter");
    }
    rows
}

/// Outcomes split by arterial-line status, without catheter first.
#[must_use]
pub fn catheter_outcomes(table: &CohortTable, filter: &CohortFilter) -> Vec<CatheterOutcomeRow> {
    let mut groups = BTreeMap::<bool, Vec<&PatientProfile>>::new();
    for patient in filtered(table, filter) {
        groups.entry(patient.arterial_line).or_default().push(patient);
    }

    let rows = groups
        .into_iter()
        .map(|(arterial_line, patients)| {
            let mean_of = |f: fn(&PatientProfile) -> f64| {
                descriptive::mean(patients.iter().copied().map(f)).unwrap_or(0.0)
            };
            CatheterOutcomeRow {
                arterial_line,
                patient_count: patients.len(),
                hospital_mortality_pct: percent(patients.iter().copied(), |p| {
                    p.outcome.hospital_expiry
                }),
                day_28_mortality_pct: percent(patients.iter().copied(), |p| {
                    p.outcome.day_28_expiry
                }),
                mean_icu_los_days: mean_of(|p| p.outcome.icu_los_days),
                mean_hospital_los_days: mean_of(|p| p.outcome.hospital_los_days),
            }
        })
        .collect::<Vec<_>>();
    if rows.is_empty() {
        tracing::info!("no patients match the demographic filter");
    }
    rows
}
