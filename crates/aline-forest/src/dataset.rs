/// Borrowed training data: one slice per feature plus the target.
///
/// Storage is feature-major so that columns of a column store can be passed
/// without copying.
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    features: &'a [&'a [f64]],
    target: &'a [f64],
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum DatasetError {
    #[display("dataset has no features")]
    NoFeatures,
    #[display("dataset has no rows")]
    NoRows,
    #[display("feature {feature} has {actual} values but the target has {expected}")]
    LengthMismatch {
        feature: usize,
        expected: usize,
        actual: usize,
    },
    #[display("non-finite value {value} in feature {feature} at row {row}")]
    NonFiniteFeature { feature: usize, row: usize, value: f64 },
    #[display("non-finite target value {value} at row {row}")]
    NonFiniteTarget { row: usize, value: f64 },
}

impl<'a> Dataset<'a> {
    pub fn new(features: &'a [&'a [f64]], target: &'a [f64]) -> Result<Self, DatasetError> {
        if features.is_empty() {
            return Err(DatasetError::NoFeatures);
        }
        if target.is_empty() {
            return Err(DatasetError::NoRows);
        }
        if let Some((row, &value)) = target.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DatasetError::NonFiniteTarget { row, value });
        }
        for (feature, values) in features.iter().enumerate() {
            if values.len() != target.len() {
                return Err(DatasetError::LengthMismatch {
                    feature,
                    expected: target.len(),
                    actual: values.len(),
                });
            }
            if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(DatasetError::NonFiniteFeature {
                    feature,
                    row,
                    value,
                });
            }
        }
        Ok(Self { features, target })
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.target.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn feature(&self, index: usize) -> &'a [f64] {
        self.features[index]
    }

    #[must_use]
    pub fn target(&self) -> &'a [f64] {
        self.target
    }

    /// Feature values of one row.
    #[must_use]
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.features.iter().map(|values| values[row]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dataset() {
        let x0 = [1.0, 2.0, 3.0];
        let x1 = [0.5, 0.5, 0.7];
        let features = [&x0[..], &x1[..]];
        let dataset = Dataset::new(&features, &[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(dataset.n_rows(), 3);
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.row(2), vec![3.0, 0.7]);
    }

    #[test]
    fn test_shape_errors() {
        let x0 = [1.0, 2.0];
        let features = [&x0[..]];
        assert_eq!(
            Dataset::new(&features, &[1.0, 2.0, 3.0]).unwrap_err(),
            DatasetError::LengthMismatch {
                feature: 0,
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(
            Dataset::new(&[], &[1.0]).unwrap_err(),
            DatasetError::NoFeatures
        );
        let empty: [&[f64]; 1] = [&[]];
        assert_eq!(Dataset::new(&empty, &[]).unwrap_err(), DatasetError::NoRows);
    }

    #[test]
    fn test_non_finite_rejected() {
        let x0 = [1.0, f64::NAN];
        let features = [&x0[..]];
        assert!(matches!(
            Dataset::new(&features, &[1.0, 2.0]),
            Err(DatasetError::NonFiniteFeature { feature: 0, row: 1, .. })
        ));
        let x0 = [1.0, 2.0];
        let features = [&x0[..]];
        assert!(matches!(
            Dataset::new(&features, &[f64::INFINITY, 2.0]),
            Err(DatasetError::NonFiniteTarget { row: 0, .. })
        ));
    }
}
