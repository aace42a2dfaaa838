//! Column statistics for the arterial-line cohort workspace.
//!
//! This crate provides the small set of statistics the cohort pipeline needs:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Frequencies**: value counts and the mode of categorical data
//! - **Correlation**: Pearson product-moment correlation between two columns
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics and central tendency
//! - [`frequency`]: Value counting and mode computation
//! - [`correlation`]: Pearson correlation coefficients
//!
//! # Examples
//!
//! ## Computing the median
//!
//! ```
//! use aline_stats::descriptive::median;
//!
//! assert_eq!(median([4.0, 1.0, 2.0]), Some(2.0));
//! assert_eq!(median([4.0, 1.0, 2.0, 3.0]), Some(2.5));
//! ```
//!
//! ## Computing the mode
//!
//! ```
//! use aline_stats::frequency::mode;
//!
//! assert_eq!(mode(["A", "A", "B"]), Some("A"));
//! ```
//!
//! ## Computing a correlation coefficient
//!
//! ```
//! use aline_stats::correlation::pearson;
//!
//! let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
//! assert!((r - 1.0).abs() < 1e-12);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod frequency;
