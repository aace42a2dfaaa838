//! CART regression trees
//!
//! Splits minimize the summed squared error of the two children. Candidate
//! thresholds are midpoints between consecutive distinct feature values and
//! a sample goes left when its value is `<= threshold`. Features are scanned
//! in index order and a later split replaces the current best only when it is
//! strictly better, so the first best split wins ties.
//!
//! The samples are sorted by every feature once per tree; each split then
//! partitions those orderings stably instead of re-sorting at every node.
//! Nodes whose squared error is within rounding noise of zero are leaves.

use rand::{Rng, seq::index};

use crate::{config::ForestConfig, dataset::Dataset};

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

const RELATIVE_TOLERANCE: f64 = 1e-10;

/// Sufficient statistics of a set of targets.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    fn push(&mut self, y: f64) {
        self.count += 1;
        self.sum += y;
        self.sum_sq += y * y;
    }

    fn minus(self, other: Self) -> Self {
        Self {
            count: self.count - other.count,
            sum: self.sum - other.sum,
            sum_sq: self.sum_sq - other.sum_sq,
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn sse(self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum_sq - self.sum * self.sum / self.count as f64).max(0.0)
    }

    /// Squared error below this is rounding noise of `sse`.
    fn tolerance(self) -> f64 {
        RELATIVE_TOLERANCE * self.sum_sq
    }

    fn is_pure(self) -> bool {
        self.sse() <= self.tolerance()
    }

    #[expect(clippy::cast_precision_loss)]
    fn mean(self) -> f64 {
        self.sum / self.count as f64
    }
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    /// Unnormalized squared-error decrease per feature
    impurity_decrease: Vec<f64>,
}

struct Builder<'a, 'r, R: ?Sized> {
    data: Dataset<'a>,
    config: &'r ForestConfig,
    n_candidates: usize,
    rng: &'r mut R,
    nodes: Vec<Node>,
    impurity_decrease: Vec<f64>,
}

impl RegressionTree {
    /// Grow a tree on the given sample of row indices.
    ///
    /// `samples` may contain repeated rows (bootstrap draws) and must not be
    /// empty. `rng` is only consumed when `max_features` restricts the
    /// features considered at each split.
    pub fn fit<R>(data: Dataset<'_>, samples: &[usize], config: &ForestConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(!samples.is_empty(), "cannot grow a tree without samples");
        let mut builder = Builder {
            data,
            config,
            n_candidates: config.max_features.resolve(data.n_features()),
            rng,
            nodes: Vec::new(),
            impurity_decrease: vec![0.0; data.n_features()],
        };
        let sorted = builder.presort(samples);
        builder.grow(sorted, 0);
        Self {
            nodes: builder.nodes,
            impurity_decrease: builder.impurity_decrease,
        }
    }

    #[must_use]
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => index = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    /// Total squared-error decrease attributed to each feature.
    #[must_use]
    pub fn impurity_decrease(&self) -> &[f64] {
        &self.impurity_decrease
    }

    #[cfg(test)]
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        fn depth_of(nodes: &[Node], index: usize) -> usize {
            match nodes[index] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + usize::max(depth_of(nodes, left), depth_of(nodes, right))
                }
            }
        }
        depth_of(&self.nodes, 0)
    }
}

impl<R> Builder<'_, '_, R>
where
    R: Rng + ?Sized,
{
    /// Orders `samples` by every feature, stable among equal values.
    fn presort(&self, samples: &[usize]) -> Vec<Vec<usize>> {
        (0..self.data.n_features())
            .map(|feature| {
                let values = self.data.feature(feature);
                let mut sorted = samples.to_vec();
                sorted.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
                sorted
            })
            .collect()
    }

    fn moments(&self, samples: &[usize]) -> Moments {
        let target = self.data.target();
        let mut moments = Moments::default();
        for &i in samples {
            moments.push(target[i]);
        }
        moments
    }

    /// Appends the subtree for the node and returns its root index.
    ///
    /// `sorted[f]` holds the node's samples ordered by feature `f`.
    fn grow(&mut self, sorted: Vec<Vec<usize>>, depth: usize) -> usize {
        let index = self.nodes.len();
        let n_samples = sorted[0].len();
        let total = self.moments(&sorted[0]);
        self.nodes.push(Node::Leaf {
            value: total.mean(),
        });

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || n_samples < self.config.min_samples_split || total.is_pure() {
            return index;
        }

        let Some(best) = self.best_split(&sorted, total) else {
            return index;
        };
        let decrease = total.sse() - best.sse;
        if decrease <= total.tolerance() {
            return index;
        }
        self.impurity_decrease[best.feature] += decrease;

        let values = self.data.feature(best.feature);
        let (left_sorted, right_sorted) = sorted
            .into_iter()
            .map(|samples| {
                samples
                    .into_iter()
                    .partition::<Vec<_>, _>(|&i| values[i] <= best.threshold)
            })
            .unzip::<_, _, Vec<_>, Vec<_>>();
        let left = self.grow(left_sorted, depth + 1);
        let right = self.grow(right_sorted, depth + 1);
        self.nodes[index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        index
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let n_features = self.data.n_features();
        if self.n_candidates >= n_features {
            return (0..n_features).collect();
        }
        let mut features = index::sample(&mut *self.rng, n_features, self.n_candidates).into_vec();
        features.sort_unstable();
        features
    }

    fn best_split(&mut self, sorted: &[Vec<usize>], total: Moments) -> Option<BestSplit> {
        let min_leaf = self.config.min_samples_leaf.max(1);
        let target = self.data.target();
        let mut best: Option<BestSplit> = None;

        for feature in self.candidate_features() {
            let values = self.data.feature(feature);
            let samples = &sorted[feature];

            let mut left = Moments::default();
            for (position, pair) in samples.windows(2).enumerate() {
                left.push(target[pair[0]]);
                let n_left = position + 1;
                let (lo, hi) = (values[pair[0]], values[pair[1]]);
                if lo >= hi || n_left < min_leaf || samples.len() - n_left < min_leaf {
                    continue;
                }
                let sse = left.sse() + total.minus(left).sse();
                if best.is_none_or(|b| sse < b.sse) {
                    let mid = f64::midpoint(lo, hi);
                    // adjacent floats can round the midpoint up onto `hi`
                    let threshold = if mid < hi { mid } else { lo };
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        sse,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn fit(features: &[&[f64]], target: &[f64], config: &ForestConfig) -> RegressionTree {
        let data = Dataset::new(features, target).unwrap();
        let mut rng = Pcg64::seed_from_u64(0);
        let samples = (0..target.len()).collect::<Vec<_>>();
        RegressionTree::fit(data, &samples, config, &mut rng)
    }

    #[test]
    fn test_step_function_single_split() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 0.0, 10.0, 10.0];
        let tree = fit(&[&x], &y, &ForestConfig::default());

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[2.5]), 0.0);
        assert_eq!(tree.predict(&[2.6]), 10.0);
        assert_eq!(tree.predict(&[-100.0]), 0.0);
        // parent sse = 100, children are pure
        assert!((tree.impurity_decrease()[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = [1.0, 2.0, 3.0];
        let tree = fit(&[&x], &[5.0, 5.0, 5.0], &ForestConfig::default());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[9.0]), 5.0);
        assert_eq!(tree.impurity_decrease(), &[0.0]);
    }

    #[test]
    fn test_inexact_constant_target_is_single_leaf() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let y = [0.1; 7];
        let tree = fit(&[&x], &y, &ForestConfig::default());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.impurity_decrease(), &[0.0]);

        let tiny = [1e-3, 1e-3, 1e-3, 1e-3, 2e-3, 2e-3, 2e-3];
        let tree = fit(&[&x], &tiny, &ForestConfig::default());
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_constant_feature_cannot_split() {
        let x = [3.0, 3.0, 3.0, 3.0];
        let tree = fit(&[&x], &[1.0, 2.0, 3.0, 4.0], &ForestConfig::default());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[3.0]), 2.5);
    }

    #[test]
    fn test_informative_feature_gets_decrease() {
        let noise = [0.3, 0.1, 0.4, 0.1, 0.5, 0.9, 0.2, 0.6];
        let signal = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let target = [1.0, 1.0, 1.0, 1.0, 9.0, 9.0, 9.0, 9.0];
        let tree = fit(&[&noise, &signal], &target, &ForestConfig::default());
        let decrease = tree.impurity_decrease();
        assert!(decrease[1] > decrease[0]);
        assert_eq!(decrease[0], 0.0);
    }

    #[test]
    fn test_first_best_split_wins_ties() {
        let x0 = [1.0, 2.0, 3.0, 4.0];
        let x1 = [1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 0.0, 10.0, 10.0];
        let tree = fit(&[&x0, &x1], &y, &ForestConfig::default());
        assert!(tree.impurity_decrease()[0] > 0.0);
        assert_eq!(tree.impurity_decrease()[1], 0.0);
    }

    #[test]
    fn test_max_depth_and_min_leaf() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let shallow = fit(
            &[&x],
            &y,
            &ForestConfig {
                max_depth: Some(1),
                ..ForestConfig::default()
            },
        );
        assert_eq!(shallow.depth(), 1);

        let coarse = fit(
            &[&x],
            &y,
            &ForestConfig {
                min_samples_leaf: 3,
                ..ForestConfig::default()
            },
        );
        assert_eq!(coarse.node_count(), 3);
        assert_eq!(coarse.predict(&[1.0]), 2.0);
        assert_eq!(coarse.predict(&[6.0]), 5.0);
    }

    #[test]
    fn test_deeper_splits_keep_feature_order() {
        // needs a split on x1 inside the left child of an x0 split
        let x0 = [1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0];
        let x1 = [4.0, 3.0, 2.0, 1.0, 4.0, 3.0, 2.0, 1.0];
        let y = [5.0, 5.0, 0.0, 0.0, 20.0, 20.0, 20.0, 20.0];
        let tree = fit(&[&x0, &x1], &y, &ForestConfig::default());
        assert_eq!(tree.predict(&[1.0, 1.5]), 0.0);
        assert_eq!(tree.predict(&[1.0, 3.5]), 5.0);
        assert_eq!(tree.predict(&[2.0, 1.0]), 20.0);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_bootstrap_duplicates() {
        let x = [1.0, 2.0, 3.0];
        let y = [0.0, 6.0, 6.0];
        let features = [&x[..]];
        let data = Dataset::new(&features, &y).unwrap();
        let mut rng = Pcg64::seed_from_u64(0);
        let tree = RegressionTree::fit(data, &[0, 0, 0, 2], &ForestConfig::default(), &mut rng);
        assert_eq!(tree.predict(&[1.0]), 0.0);
        assert_eq!(tree.predict(&[3.0]), 6.0);
    }
}
