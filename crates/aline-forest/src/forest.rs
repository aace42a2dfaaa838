use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

use crate::{
    config::ForestConfig,
    dataset::{Dataset, DatasetError},
    tree::RegressionTree,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ForestError {
    #[display("invalid training data")]
    InvalidDataset(DatasetError),
    #[display("forest must contain at least one tree")]
    NoTrees,
}

impl From<DatasetError> for ForestError {
    fn from(err: DatasetError) -> Self {
        Self::InvalidDataset(err)
    }
}

/// Bagged ensemble of [`RegressionTree`]s.
///
/// Each tree is grown on a bootstrap sample of the rows (`n` draws with
/// replacement). Tree `i` uses its own generator seeded from the `i`-th draw
/// of a master [`Pcg64`] seeded with [`ForestConfig::seed`], so a forest is
/// fully determined by its data and configuration.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn fit(data: Dataset<'_>, config: &ForestConfig) -> Result<Self, ForestError> {
        if config.n_trees == 0 {
            return Err(ForestError::NoTrees);
        }

        let n_rows = data.n_rows();
        let mut master = Pcg64::seed_from_u64(config.seed);
        let trees = (0..config.n_trees)
            .map(|_| {
                let mut rng = Pcg64::seed_from_u64(master.random());
                let samples = (0..n_rows)
                    .map(|_| rng.random_range(0..n_rows))
                    .collect::<Vec<_>>();
                RegressionTree::fit(data, &samples, config, &mut rng)
            })
            .collect::<Vec<_>>();

        let feature_importances = mean_normalized_importances(&trees, data.n_features());
        tracing::debug!(
            trees = trees.len(),
            rows = n_rows,
            features = data.n_features(),
            "fitted random forest"
        );
        Ok(Self {
            trees,
            feature_importances,
        })
    }

    /// Impurity-based importance of each feature, summing to 1.
    ///
    /// All zeros when no tree found a useful split (e.g. a constant target).
    #[must_use]
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    #[cfg(test)]
    fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Mean prediction of all trees.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn predict(&self, row: &[f64]) -> f64 {
        let sum = self.trees.iter().map(|tree| tree.predict(row)).sum::<f64>();
        sum / self.trees.len() as f64
    }
}

fn normalize(values: &mut [f64]) {
    let total = values.iter().sum::<f64>();
    if total > 0.0 {
        for value in values {
            *value /= total;
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn mean_normalized_importances(trees: &[RegressionTree], n_features: usize) -> Vec<f64> {
    let mut importances = vec![0.0; n_features];
    for tree in trees {
        let mut per_tree = tree.impurity_decrease().to_vec();
        normalize(&mut per_tree);
        for (total, value) in importances.iter_mut().zip(per_tree) {
            *total += value;
        }
    }
    for value in &mut importances {
        *value /= trees.len() as f64;
    }
    normalize(&mut importances);
    importances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;

    /// Deterministic pseudo-noise in `[0, 1)`.
    fn noise(n: usize, salt: u64) -> Vec<f64> {
        let mut rng = Pcg64::seed_from_u64(salt);
        (0..n).map(|_| rng.random::<f64>()).collect()
    }

    #[expect(clippy::cast_precision_loss)]
    fn signal(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 20,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_predictive_feature_dominates() {
        let n = 60;
        let x_noise = noise(n, 1);
        let x_signal = signal(n);
        let target = x_signal.iter().map(|x| 2.0 * x + 1.0).collect::<Vec<_>>();
        let features = [&x_noise[..], &x_signal[..]];
        let data = Dataset::new(&features, &target).unwrap();

        let forest = RandomForest::fit(data, &small_config()).unwrap();
        let importances = forest.feature_importances();
        assert!(importances[1] > 0.9, "{importances:?}");
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic_for_same_seed() {
        let n = 40;
        let x0 = noise(n, 2);
        let x1 = noise(n, 3);
        let x2 = noise(n, 4);
        let target = noise(n, 5);
        let features = [&x0[..], &x1[..], &x2[..]];
        let data = Dataset::new(&features, &target).unwrap();
        let config = ForestConfig {
            max_features: MaxFeatures::Sqrt,
            ..small_config()
        };

        let first = RandomForest::fit(data, &config).unwrap();
        let second = RandomForest::fit(data, &config).unwrap();
        assert_eq!(first.feature_importances(), second.feature_importances());
        assert_eq!(first.trees(), second.trees());

        let other = RandomForest::fit(
            data,
            &ForestConfig {
                seed: 7,
                ..config
            },
        )
        .unwrap();
        assert_ne!(first.trees(), other.trees());
    }

    #[test]
    fn test_constant_target_has_zero_importances() {
        let x0 = signal(10);
        let features = [&x0[..]];
        let target = [3.0; 10];
        let data = Dataset::new(&features, &target).unwrap();
        let forest = RandomForest::fit(data, &small_config()).unwrap();
        assert_eq!(forest.feature_importances(), &[0.0]);
        assert_eq!(forest.predict(&[4.0]), 3.0);
    }

    #[test]
    fn test_inexact_constant_target_has_zero_importances() {
        let x0 = signal(30);
        let x1 = noise(30, 6);
        let features = [&x0[..], &x1[..]];
        let target = [0.1; 30];
        let data = Dataset::new(&features, &target).unwrap();
        let forest = RandomForest::fit(data, &small_config()).unwrap();
        assert_eq!(forest.feature_importances(), &[0.0, 0.0]);
    }

    #[test]
    fn test_prediction_tracks_target() {
        let x0 = signal(50);
        let features = [&x0[..]];
        let target = x0.iter().map(|&x| if x < 25.0 { 0.0 } else { 100.0 }).collect::<Vec<_>>();
        let data = Dataset::new(&features, &target).unwrap();
        let forest = RandomForest::fit(data, &small_config()).unwrap();
        assert!(forest.predict(&[2.0]) < 10.0);
        assert!(forest.predict(&[48.0]) > 90.0);
    }

    #[test]
    fn test_zero_trees_rejected() {
        let x0 = signal(3);
        let features = [&x0[..]];
        let target = [1.0, 2.0, 3.0];
        let data = Dataset::new(&features, &target).unwrap();
        let config = ForestConfig {
            n_trees: 0,
            ..ForestConfig::default()
        };
        assert!(matches!(
            RandomForest::fit(data, &config),
            Err(ForestError::NoTrees)
        ));
    }
}
