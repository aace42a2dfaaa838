use std::{collections::BTreeSet, fmt};

use aline_analysis::demographics::{
    BmiMortalityRow, CatheterOutcomeRow, bmi_mortality_by_unit, catheter_outcomes,
};
use aline_cohort::{
    CohortFilter, CohortTable,
    bins::{AgeGroup, WeightGroup},
    profile::Gender,
};
use clap::Args;
use serde::Serialize;

use crate::util::{self, DataArg, Output};

use super::table;

#[derive(Debug, Clone, Args)]
pub(crate) struct DemographicsArg {
    #[clap(flatten)]
    pub data: DataArg,

    #[clap(flatten)]
    pub filter: FilterArg,
}

/// Demographic filters. An omitted flag does not filter; a flag given
/// without values matches nobody.
#[derive(Debug, Clone, Args)]
pub(crate) struct FilterArg {
    /// Genders to keep (M, F; comma-separated)
    #[arg(long, value_delimiter = ',', num_args = 0.., value_parser = util::parse_gender)]
    pub gender: Option<Vec<Gender>>,

    /// Age groups to keep (e.g. "<20,20-29,>=90")
    #[arg(long, value_delimiter = ',', num_args = 0.., value_parser = util::parse_bin::<AgeGroup>)]
    pub age_groups: Option<Vec<AgeGroup>>,

    /// Weight groups to keep (e.g. "<50,50-79,80-109,>=110")
    #[arg(long, value_delimiter = ',', num_args = 0.., value_parser = util::parse_bin::<WeightGroup>)]
    pub weight_groups: Option<Vec<WeightGroup>>,
}

impl FilterArg {
    pub fn to_filter(&self) -> CohortFilter {
        let mut filter = CohortFilter::default();
        if let Some(genders) = &self.gender {
            filter = filter.with_genders(genders.iter().copied());
        }
        if let Some(groups) = &self.age_groups {
            filter = filter.with_age_groups(groups.iter().copied());
        }
        if let Some(groups) = &self.weight_groups {
            filter = filter.with_weight_groups(groups.iter().copied());
        }
        filter
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DemographicsReport {
    pub bmi_mortality_by_unit: Vec<BmiMortalityRow>,
    pub catheter_outcomes: Vec<CatheterOutcomeRow>,
}

impl DemographicsReport {
    pub fn compute(table: &CohortTable, filter: &CohortFilter) -> Self {
        Self {
            bmi_mortality_by_unit: bmi_mortality_by_unit(table, filter),
            catheter_outcomes: catheter_outcomes(table, filter),
        }
    }
}

fn describe(filter: &CohortFilter) -> String {
    fn field<T>(name: &str, values: Option<&BTreeSet<T>>) -> Option<String>
    where
        T: fmt::Display,
    {
        let values = values?.iter().map(ToString::to_string).collect::<Vec<_>>();
        Some(format!("{name}=[{}]", values.join(",")))
    }

    if filter.is_unrestricted() {
        return "none".to_owned();
    }
    [
        field("gender", filter.genders.as_ref()),
        field("age", filter.age_groups.as_ref()),
        field("weight", filter.weight_groups.as_ref()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

pub(crate) fn run(arg: &DemographicsArg) -> anyhow::Result<()> {
    let table = util::load_cohort(&arg.data)?;
    let filter = arg.filter.to_filter();
    let report = DemographicsReport::compute(&table, &filter);

    if arg.data.output.is_some() {
        return Output::save_json(&report, arg.data.output.clone());
    }

    table::print_title("Demographics and Catheter Outcomes");
    println!("Filter: {}", describe(&filter));
    println!();

    println!("Hospital mortality by BMI group and service unit:");
    println!(
        "  {:<12} {:<10} {:>8} {:>12}",
        "BMI", "Unit", "Patients", "Mortality%"
    );
    table::print_separator(45);
    if report.bmi_mortality_by_unit.is_empty() {
        table::print_empty("patients match the filter");
    }
    for row in &report.bmi_mortality_by_unit {
        println!(
            "  {:<12} {:<10} {:>8} {:>11.1}%",
            row.bmi_group.to_string(),
            row.service_unit,
            row.patient_count,
            row.mortality_rate_pct
        );
    }
    println!();

    println!("Outcomes by arterial line:");
    println!(
        "  {:<16} {:>8} {:>12} {:>12} {:>10} {:>10}",
        "Arterial line", "Patients", "Hospital%", "28-day%", "ICU LOS", "Hosp LOS"
    );
    table::print_separator(73);
    if report.catheter_outcomes.is_empty() {
        table::print_empty("patients match the filter");
    }
    for row in &report.catheter_outcomes {
        println!(
            "  {:<16} {:>8} {:>11.1}% {:>11.1}% {:>10.2} {:>10.2}",
            if row.arterial_line { "with" } else { "without" },
            row.patient_count,
            row.hospital_mortality_pct,
            row.day_28_mortality_pct,
            row.mean_icu_los_days,
            row.mean_hospital_los_days
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_filter() {
        assert_eq!(describe(&CohortFilter::default()), "none");
        let filter = CohortFilter::default()
            .with_genders([Gender::Female])
            .with_weight_groups([]);
        assert_eq!(describe(&filter), "gender=[F] weight=[]");
    }
}
