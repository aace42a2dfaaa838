use aline_analysis::{
    correlation::{CorrelationMatrix, correlation_matrix},
    selection::{FeatureSelector, Selection, SelectorConfig},
};
use aline_cohort::{
    CohortTable,
    schema::{LENGTH_OF_STAY_COLUMNS, OBSERVATION_COLUMNS, col},
};
use aline_forest::ForestConfig;
use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::util::{self, DataArg, Output};

use super::table;

#[derive(Debug, Clone, Args)]
pub(crate) struct ClinicalArg {
    #[clap(flatten)]
    pub data: DataArg,

    #[clap(flatten)]
    pub selection: SelectionArg,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct SelectionArg {
    /// Candidate observation columns (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = OBSERVATION_COLUMNS)]
    pub candidates: Vec<String>,

    /// Outcome column the candidates are ranked against
    #[arg(long, default_value = col::ICU_LOS_DAY)]
    pub target: String,

    /// Outcome columns added to the correlation matrix (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = LENGTH_OF_STAY_COLUMNS)]
    pub targets: Vec<String>,

    /// Number of candidates to keep
    #[arg(short, long, default_value_t = 3)]
    pub k: usize,

    /// Seed of the random forest
    #[arg(long, default_value_t = ForestConfig::default().seed)]
    pub seed: u64,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = ForestConfig::default().n_trees)]
    pub trees: usize,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ClinicalReport {
    pub target: String,
    pub k: usize,
    pub selector: SelectorConfig,
    pub selection: Selection,
    pub correlation: CorrelationMatrix,
}

impl ClinicalReport {
    pub fn compute(table: &CohortTable, arg: &SelectionArg) -> anyhow::Result<Self> {
        let selector = FeatureSelector::new(SelectorConfig {
            forest: ForestConfig {
                n_trees: arg.trees,
                seed: arg.seed,
                ..ForestConfig::default()
            },
            ..SelectorConfig::default()
        });
        if arg.candidates.len() > arg.k {
            eprintln!(
                "Ranking {} candidates against {} ({} trees)...",
                arg.candidates.len(),
                arg.target,
                arg.trees
            );
        }
        let selection = selector
            .selection(table, &arg.candidates, &arg.target, arg.k)
            .context("Failed to select features")?;
        let correlation = correlation_matrix(table, &selection.selected, &arg.targets)
            .context("Failed to compute correlation matrix")?;

        Ok(Self {
            target: arg.target.clone(),
            k: arg.k,
            selector: *selector.config(),
            selection,
            correlation,
        })
    }
}

pub(crate) fn run(arg: &ClinicalArg) -> anyhow::Result<()> {
    let table = util::load_cohort(&arg.data)?;
    let report = ClinicalReport::compute(&table, &arg.selection)?;

    if arg.data.output.is_some() {
        return Output::save_json(&report, arg.data.output.clone());
    }

    table::print_title("Initial Assessments and Length of Stay");
    println!();

    match &report.selection.ranking {
        Some(ranking) => {
            println!("Feature importance for {}:", ranking.target);
            println!("  {:>4} {:<20} {:>10}", "Rank", "Column", "Importance");
            table::print_separator(36);
            for (i, feature) in ranking.features.iter().enumerate() {
                let marker = if i < report.k { "*" } else { " " };
                println!(
                    "  {:>4} {:<20} {:>10.4}{marker}",
                    i + 1,
                    feature.name,
                    feature.importance
                );
            }
            println!("  (* selected)");
        }
        None => println!("Candidates used without ranking."),
    }
    println!();
    println!("Selected: {}", report.selection.selected.join(", "));
    println!();

    print_matrix(&report.correlation);
    Ok(())
}

fn print_matrix(matrix: &CorrelationMatrix) {
    println!("Pearson correlation:");
    if matrix.columns.is_empty() {
        table::print_empty("columns to correlate");
        return;
    }

    let n = matrix.columns.len();
    print!("  {:<20}", "");
    for column in &matrix.columns {
        print!(" {:>10}", abbreviate(column, 10));
    }
    println!();
    table::print_separator(20 + 11 * n);
    for (i, row) in matrix.columns.iter().enumerate() {
        print!("  {row:<20}");
        for cell in &matrix.cells[i * n..(i + 1) * n] {
            print!(" {:>10}", util::opt_fmt(cell.value, 3));
        }
        println!();
    }
}

fn abbreviate(name: &str, width: usize) -> &str {
    match name.char_indices().nth(width) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("icu_los_day", 10), "icu_los_da");
        assert_eq!(abbreviate("bmi", 10), "bmi");
    }
}
