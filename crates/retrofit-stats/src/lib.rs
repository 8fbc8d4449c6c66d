//! Statistical helpers for the retrofit recommender.
//!
//! This crate provides the small set of numeric tools the matching pipeline
//! relies on:
//!
//! - **Descriptive statistics**: minimum, maximum, mean and median of a dataset
//! - **Min-max scaling**: map values of a known range onto \[0.0, 1.0\] and back
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`scaling`]: Min-max scaling with explicit handling of degenerate ranges
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use retrofit_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Scaling values into the unit interval
//!
//! ```
//! use retrofit_stats::scaling::MinMaxScale;
//!
//! let scale = MinMaxScale::from_values([0.0, 5.0, 10.0]).unwrap();
//! assert_eq!(scale.normalize(5.0), Ok(0.5));
//! ```

pub mod descriptive;
pub mod scaling;
