use aline_analysis::overview::{BinCount, CohortOverview, cohort_overview};
use aline_cohort::impute::FillValue;
use clap::Args;

use crate::util::{self, DataArg, Output};

use super::table;

#[derive(Debug, Clone, Args)]
pub(crate) struct SummaryArg {
    #[clap(flatten)]
    pub data: DataArg,
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let table = util::load_cohort(&arg.data)?;
    let overview = cohort_overview(&table)?;

    if arg.data.output.is_some() {
        return Output::save_json(&overview, arg.data.output.clone());
    }
    print_overview(&overview);
    Ok(())
}

fn print_overview(overview: &CohortOverview) {
    table::print_title("Cohort Summary");
    println!("  Patients           : {}", overview.row_count);
    println!("  Columns            : {}", overview.column_count);
    println!("  With arterial line : {}", overview.arterial_line_count);
    println!();

    println!("Imputed values:");
    println!("  {:<20} {:>8} {:>12}", "Column", "Filled", "Fill value");
    table::print_separator(42);
    if overview.imputation.columns.is_empty() {
        table::print_empty("missing values");
    }
    for column in &overview.imputation.columns {
        let fill = match &column.fill_value {
            FillValue::Numeric(v) => format!("{v:.2}"),
            FillValue::Categorical(s) => s.clone(),
        };
        println!("  {:<20} {:>8} {:>12}", column.column, column.filled, fill);
    }
    println!();

    println!("Key statistics:");
    println!(
        "  {:<20} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Column", "Count", "Min", "Median", "Mean", "Max", "Std"
    );
    table::print_separator(84);
    for s in &overview.statistics {
        println!(
            "  {:<20} {:>8} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            s.column, s.count, s.min, s.median, s.mean, s.max, s.std_dev
        );
    }
    println!();

    let d = &overview.distributions;
    print_distribution("Gender", &d.gender, overview.row_count);
    print_distribution("Age group", &d.age_group, overview.row_count);
    print_distribution("Weight group (kg)", &d.weight_group, overview.row_count);
    print_distribution("BMI group", &d.bmi_group, overview.row_count);
    print_distribution("Admission hour", &d.admission_hour_group, overview.row_count);
    print_distribution("ICU stay", &d.icu_los_group, overview.row_count);
}

#[expect(clippy::cast_precision_loss)]
fn print_distribution(title: &str, bins: &[BinCount], total: usize) {
    println!("{title}:");
    println!("  {:<20} {:>8} {:>8}", "Bin", "Patients", "Share");
    table::print_separator(38);
    for bin in bins {
        let share = if total == 0 {
            0.0
        } else {
            bin.count as f64 / total as f64 * 100.0
        };
        println!("  {:<20} {:>8} {:>7.1}%", bin.label, bin.count, share);
    }
    println!();
}
