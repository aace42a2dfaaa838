//! Feature ranking and top-k selection
//!
//! Candidates are ranked by the impurity-based importances of a seeded
//! random-forest regression of the target on the candidates. The ordering is
//! fixed: a stable ascending sort by importance, reversed. Equal importances
//! therefore resolve toward the candidate listed later.
//!
//! # Examples
//!
//! ```
//! use aline_analysis::selection::select_top_features;
//! # use aline_cohort::{CohortSchema, loader::CohortLoader};
//! # let csv = "\
//! # age,gender_num,weight_first,bmi,service_unit,day_icu_intime,hour_icu_intime,icu_los_day,hospital_los_day,aline_flg,hosp_exp_flg,day_28_flg,censor_flg
//! # 54,1,80,26.1,MICU,Monday,3,2.5,6.0,1,0,0,1
//! # ";
//! # let table = CohortLoader::new(CohortSchema::core()).load_from_reader(csv.as_bytes()).unwrap();
//!
//! // no ranking is needed when every candidate fits
//! let top = select_top_features(&table, &["age", "bmi"], "icu_los_day", 3).unwrap();
//! assert_eq!(top, ["age", "bmi"]);
//! ```

use std::collections::HashSet;

use aline_cohort::{CohortTable, ColumnError};
use aline_forest::{Dataset, ForestConfig, ForestError, RandomForest};
use serde::Serialize;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum InsufficientDataError {
    #[display("need at least {min_rows} rows to rank features, got {rows}")]
    TooFewRows { rows: usize, min_rows: usize },
    #[display("ranking column unavailable")]
    MissingColumn(ColumnError),
    #[display("ranking data rejected by the forest")]
    InvalidData(ForestError),
}

impl From<ColumnError> for InsufficientDataError {
    fn from(err: ColumnError) -> Self {
        Self::MissingColumn(err)
    }
}

impl From<ForestError> for InsufficientDataError {
    fn from(err: ForestError) -> Self {
        Self::InvalidData(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectorConfig {
    pub forest: ForestConfig,
    /// Fewer rows than this fail with [`InsufficientDataError::TooFewRows`]
    pub min_rows: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            min_rows: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFeature {
    pub name: String,
    pub importance: f64,
}

/// Candidates ordered from most to least important.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRanking {
    pub target: String,
    pub features: Vec<RankedFeature>,
}

impl FeatureRanking {
    /// Names of the first `k` ranked features.
    #[must_use]
    pub fn top(&self, k: usize) -> Vec<String> {
        self.features
            .iter()
            .take(k)
            .map(|f| f.name.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Outcome of [`FeatureSelector::selection`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub selected: Vec<String>,
    /// `None` when the candidates were returned without ranking
    pub ranking: Option<FeatureRanking>,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureSelector {
    config: SelectorConfig,
}

/// Select the `max_k` candidates that best predict `target` with the default
/// selector (100 trees, seed 42, at least 10 rows).
pub fn select_top_features<S>(
    table: &CohortTable,
    candidates: &[S],
    target: &str,
    max_k: usize,
) -> Result<Vec<String>, InsufficientDataError>
where
    S: AsRef<str>,
{
    FeatureSelector::default().select(table, candidates, target, max_k)
}

impl FeatureSelector {
    #[must_use]
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Rank every candidate by importance for predicting `target`.
    ///
    /// Repeated candidate names are ranked once, at their first position.
    pub fn rank<S>(
        &self,
        table: &CohortTable,
        candidates: &[S],
        target: &str,
    ) -> Result<FeatureRanking, InsufficientDataError>
    where
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let names = candidates
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| seen.insert(*name))
            .collect::<Vec<_>>();

        let target_values = table.numeric(target)?;
        let features = names
            .iter()
            .map(|name| table.numeric(name))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = table.row_count();
        if rows < self.config.min_rows {
            return Err(InsufficientDataError::TooFewRows {
                rows,
                min_rows: self.config.min_rows,
            });
        }

        let mut ranking = FeatureRanking {
            target: target.to_owned(),
            features: Vec::new(),
        };
        if names.is_empty() {
            return Ok(ranking);
        }

        let data = Dataset::new(&features, target_values).map_err(ForestError::from)?;
        let forest = RandomForest::fit(data, &self.config.forest)?;
        let importances = forest.feature_importances();

        let mut order = (0..names.len()).collect::<Vec<_>>();
        order.sort_by(|&a, &b| importances[a].total_cmp(&importances[b]));
        order.reverse();

        ranking.features = order
            .into_iter()
            .map(|i| RankedFeature {
                name: names[i].to_owned(),
                importance: importances[i],
            })
            .collect();
        tracing::debug!(
            outcome = target,
            top = ?ranking.top(3),
            "ranked {} candidate features",
            ranking.len()
        );
        Ok(ranking)
    }

    /// The `max_k` most important candidates, most important first.
    ///
    /// When there are no more than `max_k` candidates they are returned
    /// unchanged without looking at the table.
    pub fn select<S>(
        &self,
        table: &CohortTable,
        candidates: &[S],
        target: &str,
        max_k: usize,
    ) -> Result<Vec<String>, InsufficientDataError>
    where
        S: AsRef<str>,
    {
        if candidates.len() <= max_k {
            return Ok(owned(candidates));
        }
        Ok(self.rank(table, candidates, target)?.top(max_k))
    }

    /// Like [`select`](Self::select), but a table with too few rows yields
    /// the candidates unranked instead of an error.
    pub fn select_or_unranked<S>(
        &self,
        table: &CohortTable,
        candidates: &[S],
        target: &str,
        max_k: usize,
    ) -> Result<Vec<String>, InsufficientDataError>
    where
        S: AsRef<str>,
    {
        Ok(self.selection(table, candidates, target, max_k)?.selected)
    }

    /// The selected features together with the ranking they came from.
    ///
    /// Falls back to the unranked candidates on
    /// [`InsufficientDataError::TooFewRows`]; other errors propagate.
    pub fn selection<S>(
        &self,
        table: &CohortTable,
        candidates: &[S],
        target: &str,
        max_k: usize,
    ) -> Result<Selection, InsufficientDataError>
    where
        S: AsRef<str>,
    {
        if candidates.len() <= max_k {
            return Ok(Selection {
                selected: owned(candidates),
                ranking: None,
            });
        }
        match self.rank(table, candidates, target) {
            Ok(ranking) => Ok(Selection {
                selected: ranking.top(max_k),
                ranking: Some(ranking),
            }),
            Err(InsufficientDataError::TooFewRows { rows, min_rows }) => {
                tracing::warn!(
                    rows,
                    min_rows,
                    "too few rows to rank features; using candidates unranked"
                );
                Ok(Selection {
                    selected: owned(candidates),
                    ranking: None,
                })
            }
            Err(err) => Err(err),
        }
    }
}

fn owned<S>(names: &[S]) -> Vec<String>
where
    S: AsRef<str>,
{
    names.iter().map(|s| s.as_ref().to_owned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Row, table};

    const CANDIDATES: [&str; 4] = ["noise_a", "sofa_first", "noise_b", "noise_c"];

    #[expect(clippy::cast_precision_loss)]
    fn predictive_rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let sofa = (i % 12) as f64;
                let wobble = |salt: usize| ((i * 7919 + salt * 104_729) % 97) as f64;
                Row {
                    icu_los: 1.0 + 2.0 * sofa,
                    extra: vec![wobble(1), sofa, wobble(2), wobble(3)],
                    ..Row::default()
                }
            })
            .collect()
    }

    fn fast_selector() -> FeatureSelector {
        FeatureSelector::new(SelectorConfig {
            forest: ForestConfig {
                n_trees: 10,
                ..ForestConfig::default()
            },
            ..SelectorConfig::default()
        })
    }

    #[test]
    fn test_few_candidates_returned_unchanged() {
        let table = table(&[], &[Row::default()]);
        let candidates = ["unknown_b", "unknown_a"];
        let selected = select_top_features(&table, &candidates, "nope", 2).unwrap();
        assert_eq!(selected, candidates);
    }

    #[test]
    fn test_predictive_candidate_ranks_first() {
        let table = table(&CANDIDATES, &predictive_rows(48));
        let selector = fast_selector();

        let ranking = selector.rank(&table, &CANDIDATES, "icu_los_day").unwrap();
        assert_eq!(ranking.len(), 4);
        assert_eq!(ranking.features[0].name, "sofa_first");
        let total = ranking.features.iter().map(|f| f.importance).sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);

        let top = selector
            .select(&table, &CANDIDATES, "icu_los_day", 2)
            .unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0], "sofa_first");

        let selection = selector
            .selection(&table, &CANDIDATES, "icu_los_day", 2)
            .unwrap();
        assert_eq!(selection.selected, top);
        assert_eq!(selection.ranking, Some(ranking));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let table = table(&CANDIDATES, &predictive_rows(30));
        let selector = fast_selector();
        let first = selector
            .select(&table, &CANDIDATES, "icu_los_day", 2)
            .unwrap();
        let second = selector
            .select(&table, &CANDIDATES, "icu_los_day", 2)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ties_favor_later_candidates() {
        // constant target: every importance is zero
        let rows = (0..12)
            .map(|i| Row {
                extra: vec![f64::from(i), f64::from(i % 3), f64::from(i % 5)],
                ..Row::default()
            })
            .collect::<Vec<_>>();
        let names = ["a", "b", "c"];
        let table = table(&names, &rows);
        let top = fast_selector()
            .select(&table, &names, "icu_los_day", 2)
            .unwrap();
        assert_eq!(top, ["c", "b"]);
    }

    #[test]
    fn test_duplicate_candidates_ranked_once() {
        let table = table(&CANDIDATES, &predictive_rows(24));
        let candidates = ["sofa_first", "noise_a", "sofa_first"];
        let ranking = fast_selector()
            .rank(&table, &candidates, "icu_los_day")
            .unwrap();
        assert_eq!(ranking.len(), 2);
    }

    #[test]
    fn test_too_few_rows() {
        let table = table(&CANDIDATES, &predictive_rows(9));
        let err = fast_selector()
            .select(&table, &CANDIDATES, "icu_los_day", 2)
            .unwrap_err();
        assert!(matches!(
            err,
            InsufficientDataError::TooFewRows {
                rows: 9,
                min_rows: 10
            }
        ));

        let fallback = fast_selector()
            .select_or_unranked(&table, &CANDIDATES, "icu_los_day", 2)
            .unwrap();
        assert_eq!(fallback, CANDIDATES);

        let selection = fast_selector()
            .selection(&table, &CANDIDATES, "icu_los_day", 2)
            .unwrap();
        assert!(selection.ranking.is_none());
    }

    #[test]
    fn test_missing_column() {
        let table = table(&CANDIDATES, &predictive_rows(12));
        let candidates = ["sofa_first", "noise_a", "lactate_max"];
        let err = fast_selector()
            .select_or_unranked(&table, &candidates, "icu_los_day", 1)
            .unwrap_err();
        assert!(matches!(
            err,
            InsufficientDataError::MissingColumn(ColumnError::Unknown { .. })
        ));

        let err = fast_selector()
            .select(&table, &CANDIDATES, "service_unit", 1)
            .unwrap_err();
        assert!(matches!(
            err,
            InsufficientDataError::MissingColumn(ColumnError::NotNumeric { .. })
        ));
    }
}
