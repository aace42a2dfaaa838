//! Random-forest regression used to rank predictors by importance
//!
//! A hand-rolled bagged ensemble of CART regression trees. The only output the
//! rest of the workspace relies on is [`RandomForest::feature_importances`]:
//! the squared-error decrease attributed to each feature, normalized per tree,
//! averaged over the forest and renormalized to sum to 1.
//!
//! # Examples
//!
//! ```
//! use aline_forest::{Dataset, ForestConfig, RandomForest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let noise = [0.4, 0.1, 0.9, 0.3, 0.7, 0.2, 0.8, 0.5];
//! let dose = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
//! let stay = [1.0, 1.5, 2.0, 2.5, 6.0, 6.5, 7.0, 7.5];
//! let features = [&noise[..], &dose[..]];
//!
//! let data = Dataset::new(&features, &stay)?;
//! let forest = RandomForest::fit(data, &ForestConfig::default())?;
//! let importances = forest.feature_importances();
//! assert!(importances[1] > importances[0]);
//! # Ok(())
//! # }
//! ```

pub use self::{
    config::{ForestConfig, MaxFeatures},
    dataset::{Dataset, DatasetError},
    forest::{ForestError, RandomForest},
    tree::RegressionTree,
};

mod config;
mod dataset;
mod forest;
mod tree;
