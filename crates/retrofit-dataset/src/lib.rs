//! Simulation dataset access and reshaping.
//!
//! The simulation dataset is a collection of wide tables ("sheets"), one per
//! construction-era partition. This crate reads those tables through the
//! [`TableSource`](source::TableSource) trait and reshapes a table into the
//! long [`RecordPool`] used for matching.
//!
//! # Wide Table Layout
//!
//! ```text
//!            col 0          col 1    col 2     col 3    ...
//! row 0      (label)        -        V/A #0    V/A #1   ...
//! row 1      (label)        -        AW/BF #0  AW/BF #1 ...
//! row 2..    measure text   bucket   savings   savings  ...
//! ```
//!
//! Every (variant column, measure row) pair becomes one
//! [`SimulationRecord`](retrofit_core::SimulationRecord).
//!
//! # Example
//!
//! ```
//! use retrofit_dataset::{load_pool, table::Workbook};
//!
//! let workbook: Workbook = serde_json::from_str(
//!     r#"{
//!         "sheets": {
//!             "vor 1900": [
//!                 ["V/A", null, 0.4, 0.6],
//!                 ["AW/BF", null, 1.2, 0.9],
//!                 ["Fenstertausch 3-fach", 30, 11.0, 9.5]
//!             ]
//!         }
//!     }"#,
//! )
//! .unwrap();
//!
//! let pool = load_pool(&workbook, "vor 1900").unwrap();
//! assert_eq!(pool.len(), 2);
//! ```

use retrofit_core::RecordPool;

use self::{reshape::MalformedTableError, source::TableSource};

pub use self::source::LoadError;

pub mod reshape;
pub mod source;
pub mod table;

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From, derive_more::IsVariant)]
pub enum LoadPoolError {
    #[display("failed to load dataset table")]
    Load(LoadError),
    #[display("malformed table for partition '{partition}'")]
    #[from(skip)]
    MalformedTable {
        partition: String,
        source: MalformedTableError,
    },
}

/// Loads the table of `partition` from `source` and reshapes it into a record pool.
pub fn load_pool<S>(source: &S, partition: &str) -> Result<RecordPool, LoadPoolError>
where
    S: TableSource + ?Sized,
{
    let table = source.load_table(partition)?;
    let pool = reshape::reshape(&table).map_err(|source| LoadPoolError::MalformedTable {
        partition: partition.to_owned(),
        source,
    })?;
    tracing::debug!(partition, records = pool.len(), "loaded record pool");
    Ok(pool)
}
