//! Statistical utilities shared by the ranking-method comparison.
//!
//! This crate provides the numeric building blocks the model fitters and the
//! comparison reporter need:
//!
//! - **Descriptive statistics**: mean, variance, standard deviation, median
//! - **Ranks**: midrank assignment with tie averaging
//! - **Correlation**: Pearson, Spearman, and Kendall tau-b coefficients with
//!   a t-approximation p-value for the Pearson coefficient
//! - **Distribution**: log-gamma and the regularized incomplete beta
//!   function backing the Student's t tail probability
//!
//! # Examples
//!
//! ```
//! use rigour_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ```
//! use rigour_stats::correlation::pearson;
//!
//! let x = [1.0, 2.0, 3.0, 4.0];
//! let y = [2.0, 4.0, 6.0, 8.0];
//! assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod distribution;
pub mod ranks;
