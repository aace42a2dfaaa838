use serde::Serialize;

/// Number of features considered at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// Every feature (plain bagged regression trees)
    #[default]
    All,
    /// `ceil(sqrt(n_features))`
    Sqrt,
    /// A fixed count, clamped to `1..=n_features`
    Count(usize),
}

impl MaxFeatures {
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn resolve(self, n_features: usize) -> usize {
        let count = match self {
            Self::All => n_features,
            Self::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            Self::Count(count) => count,
        };
        count.clamp(1, n_features.max(1))
    }
}

/// Hyperparameters of a [`RandomForest`](crate::RandomForest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Seed of the master generator that seeds every tree
    pub seed: u64,
    /// `None` grows trees until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::All,
        }
    }
}
