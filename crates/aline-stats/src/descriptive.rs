/// Descriptive statistics summarizing a numeric column.
///
/// This structure contains common measures of central tendency and
/// dispersion for a dataset of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The median value of the dataset.
    ///
    /// For an even number of values this is the mean of the two middle values.
    pub median: f64,
    /// The population variance of the dataset.
    pub variance: f64,
    /// The population standard deviation of the dataset.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use aline_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = median_of_sorted(sorted_values)?;
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;
        let std_dev = variance.sqrt();

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
        })
    }
}

/// Arithmetic mean of the values, or `None` when there are none.
///
/// ```
/// # use aline_stats::descriptive::mean;
/// assert_eq!(mean([1.0, 0.0, 0.0, 1.0]), Some(0.5));
/// assert_eq!(mean(Vec::new()), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Median of unsorted values.
///
/// Uses the conventional definition: the middle value for an odd count and
/// the mean of the two middle values for an even count.
#[must_use]
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut values = values.into_iter().collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);
    median_of_sorted(&values)
}

fn median_of_sorted(sorted_values: &[f64]) -> Option<f64> {
    let len = sorted_values.len();
    if len == 0 {
        return None;
    }
    let mid = len / 2;
    if len % 2 == 1 {
        Some(sorted_values[mid])
    } else {
        Some(f64::midpoint(sorted_values[mid - 1], sorted_values[mid]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median([1.0, 2.0, 4.0]), Some(2.0));
    }

    #[test]
    fn test_median_even_count() {
        assert_eq!(median([10.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_empty() {
        assert_eq!(median(std::iter::empty()), None);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean([2.0, 4.0]), Some(3.0));
        assert_eq!(mean(std::iter::empty()), None);
    }

    #[test]
    fn test_descriptive_stats() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.variance, 4.0);
        assert_eq!(stats.std_dev, 2.0);
    }

    #[test]
    fn test_descriptive_stats_empty() {
        assert!(DescriptiveStats::new(Vec::new()).is_none());
    }
}
