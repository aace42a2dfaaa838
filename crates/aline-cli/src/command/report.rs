use aline_analysis::overview::{CohortOverview, cohort_overview};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::util::{self, DataArg, Output};

use super::{
    admission::AdmissionReport,
    clinical::{ClinicalReport, SelectionArg},
    demographics::{DemographicsReport, FilterArg},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ReportArg {
    #[clap(flatten)]
    pub data: DataArg,

    #[clap(flatten)]
    pub filter: FilterArg,

    #[clap(flatten)]
    pub selection: SelectionArg,
}

#[derive(Debug, Clone, Serialize)]
struct Report {
    generated_at: DateTime<Utc>,
    source: String,
    overview: CohortOverview,
    demographics: DemographicsReport,
    clinical: ClinicalReport,
    admission: AdmissionReport,
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let table = util::load_cohort(&arg.data)?;

    eprintln!("Computing views...");
    let report = Report {
        generated_at: Utc::now(),
        source: arg.data.data.display().to_string(),
        overview: cohort_overview(&table)?,
        demographics: DemographicsReport::compute(&table, &arg.filter.to_filter()),
        clinical: ClinicalReport::compute(&table, &arg.selection)?,
        admission: AdmissionReport::compute(&table),
    };

    Output::save_json(&report, arg.data.output.clone())
}
