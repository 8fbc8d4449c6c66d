//! Domain types of the retrofit recommender.
//!
//! - [`EraTable`] - Construction-era thresholds selecting a dataset partition
//! - [`WindowShareBucket`] - The discrete window-share levels simulated in the dataset
//! - [`SimulationRecord`] / [`RecordPool`] - One simulated (building variant, measure) pair
//!   and the immutable pool of all pairs of a partition
//! - [`MeasureGroup`] - Semantic grouping of renovation measures
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use retrofit_core::{EraTable, MeasureGroup, WindowShareBucket};
//!
//! let eras = EraTable::standard();
//! let date = NaiveDate::from_ymd_opt(1968, 5, 3).unwrap();
//! assert_eq!(eras.resolve(date).unwrap(), "ab 01.01.1960");
//!
//! assert_eq!(WindowShareBucket::quantize(27.0).percent(), 30);
//! assert_eq!(MeasureGroup::classify("Fenstertausch 2-fach"), MeasureGroup::Fenster);
//! ```

pub use self::{era::*, measure::*, record::*, window_share::*};

mod era;
mod measure;
mod record;
mod window_share;
