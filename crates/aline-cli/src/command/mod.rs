use clap::{Parser, Subcommand};

use self::{
    admission::AdmissionArg, clinical::ClinicalArg, demographics::DemographicsArg,
    report::ReportArg, summary::SummaryArg,
};

mod admission;
mod clinical;
mod demographics;
mod report;
mod summary;
mod table;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Cohort size, imputed values, bin distributions and key statistics
    Summary(#[clap(flatten)] SummaryArg),
    /// Demographics versus catheter outcomes
    Demographics(#[clap(flatten)] DemographicsArg),
    /// Initial assessments versus length of stay
    Clinical(#[clap(flatten)] ClinicalArg),
    /// Admission time and weekday versus mortality
    Admission(#[clap(flatten)] AdmissionArg),
    /// Every view as one JSON document
    Report(#[clap(flatten)] ReportArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Summary(arg) => summary::run(&arg)?,
        Mode::Demographics(arg) => demographics::run(&arg)?,
        Mode::Clinical(arg) => clinical::run(&arg)?,
        Mode::Admission(arg) => admission::run(&arg)?,
        Mode::Report(arg) => report::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use aline_cohort::{bins::AgeGroup, profile::Gender};

    use super::*;

    fn parse(args: &[&str]) -> Mode {
        CommandArgs::try_parse_from(args).unwrap().mode
    }

    #[test]
    fn test_demographics_filters() {
        let Mode::Demographics(arg) = parse(&[
            "aline",
            "demographics",
            "cohort.csv",
            "--gender",
            "F",
            "--age-groups",
            "20-29,>=90",
        ]) else {
            panic!("expected demographics");
        };
        let filter = arg.filter.to_filter();
        assert_eq!(
            filter.genders.unwrap().into_iter().collect::<Vec<_>>(),
            [Gender::Female]
        );
        assert_eq!(
            filter.age_groups.unwrap().into_iter().collect::<Vec<_>>(),
            [AgeGroup::Age20To29, AgeGroup::Age90AndOver]
        );
        assert!(filter.weight_groups.is_none());
    }

    #[test]
    fn test_flag_without_values_selects_nobody() {
        let Mode::Demographics(arg) = parse(&["aline", "demographics", "cohort.csv", "--gender"])
        else {
            panic!("expected demographics");
        };
        assert_eq!(arg.filter.to_filter().genders.map(|g| g.len()), Some(0));
    }

    #[test]
    fn test_clinical_defaults() {
        let Mode::Clinical(arg) = parse(&["aline", "clinical", "cohort.csv"]) else {
            panic!("expected clinical");
        };
        let selection = arg.selection;
        assert_eq!(selection.candidates.len(), 19);
        assert_eq!(selection.target, "icu_los_day");
        assert_eq!(selection.targets, ["icu_los_day", "hospital_los_day"]);
        assert_eq!((selection.k, selection.seed, selection.trees), (3, 42, 100));
        assert_eq!(arg.data.delimiter, ',');
        assert!(arg.data.output.is_none());
    }

    #[test]
    fn test_unknown_group_rejected() {
        let result =
            CommandArgs::try_parse_from(["aline", "demographics", "x.csv", "--weight-groups", "heavy"]);
        assert!(result.is_err());
    }
}
