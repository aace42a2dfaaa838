//! Value counting for categorical data
//!
//! Counts preserve first-encounter order so that results do not depend on
//! hashing. This makes the [`mode`] deterministic: when several values share
//! the highest count, the one encountered first wins.

use std::collections::HashMap;
use std::hash::Hash;

/// Count occurrences of each distinct value.
///
/// Returns `(value, count)` pairs in the order each value was first seen.
///
/// # Examples
///
/// ```
/// use aline_stats::frequency::value_counts;
///
/// let counts = value_counts(["b", "a", "b"]);
/// assert_eq!(counts, vec![("b", 2), ("a", 1)]);
/// ```
#[must_use]
pub fn value_counts<I, T>(values: I) -> Vec<(T, usize)>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let mut positions: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        if let Some(&pos) = positions.get(&value) {
            counts[pos].1 += 1;
        } else {
            positions.insert(value.clone(), counts.len());
            counts.push((value, 1));
        }
    }
    counts
}

/// Most frequent value, ties broken by first encounter.
///
/// Returns `None` when `values` is empty.
#[must_use]
pub fn mode<I, T>(values: I) -> Option<T>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let mut best: Option<(T, usize)> = None;
    for (value, count) in value_counts(values) {
        // strict comparison keeps the earliest value on ties
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_majority() {
        assert_eq!(mode(["A", "A", "B"]), Some("A"));
    }

    #[test]
    fn test_mode_tie_keeps_first_encountered() {
        assert_eq!(mode(["B", "A", "A", "B"]), Some("B"));
        assert_eq!(mode(["A", "B", "B", "A"]), Some("A"));
    }

    #[test]
    fn test_mode_empty() {
        assert_eq!(mode(Vec::<String>::new()), None);
    }

    #[test]
    fn test_value_counts_order() {
        let counts = value_counts(["x", "y", "x", "z", "y", "x"]);
        assert_eq!(counts, vec![("x", 3), ("y", 2), ("z", 1)]);
    }
}
