use aline_analysis::admission::{
    AdmissionMortalityCell, WeekdayMortalityRow, admission_time_mortality_grid, weekday_mortality,
};
use aline_cohort::CohortTable;
use clap::Args;
use serde::Serialize;

use crate::util::{self, DataArg, Output};

use super::table;

#[derive(Debug, Clone, Args)]
pub(crate) struct AdmissionArg {
    #[clap(flatten)]
    pub data: DataArg,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AdmissionReport {
    pub admission_time_mortality: Vec<AdmissionMortalityCell>,
    pub weekday_mortality: Vec<WeekdayMortalityRow>,
}

impl AdmissionReport {
    pub fn compute(table: &CohortTable) -> Self {
        Self {
            admission_time_mortality: admission_time_mortality_grid(table),
            weekday_mortality: weekday_mortality(table),
        }
    }
}

pub(crate) fn run(arg: &AdmissionArg) -> anyhow::Result<()> {
    let table = util::load_cohort(&arg.data)?;
    let report = AdmissionReport::compute(&table);

    if arg.data.output.is_some() {
        return Output::save_json(&report, arg.data.output.clone());
    }

    table::print_title("Admission Time and Mortality");
    println!();

    println!("Mortality by ICU stay and admission hour:");
    println!(
        "  {:<12} {:<12} {:>8} {:>8} {:>10}",
        "ICU stay", "Admitted", "Deaths", "Patients", "Mortality"
    );
    table::print_separator(54);
    if report.admission_time_mortality.is_empty() {
        table::print_empty("patients");
    }
    for cell in &report.admission_time_mortality {
        println!(
            "  {:<12} {:<12} {:>8} {:>8} {:>10.3}",
            cell.los_group.to_string(),
            cell.admission_hour_group.to_string(),
            cell.death_count,
            cell.patient_count,
            cell.mortality_rate
        );
    }
    println!();

    println!("Mortality by admission weekday:");
    println!(
        "  {:<12} {:>8} {:>8} {:>10}",
        "Weekday", "Deaths", "Patients", "Mortality"
    );
    table::print_separator(41);
    if report.weekday_mortality.is_empty() {
        table::print_empty("patients with a known weekday");
    }
    for row in &report.weekday_mortality {
        println!(
            "  {:<12} {:>8} {:>8} {:>10.3}",
            row.weekday.to_string(),
            row.death_count,
            row.patient_count,
            row.mortality_rate
        );
    }

    Ok(())
}
