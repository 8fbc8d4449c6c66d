use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const STANDARD_THRESHOLDS: [(i32, u32, u32, &str); 7] = [
    (1, 1, 1, "vor 1900"),
    (1900, 1, 1, "ab 01.01.1900"),
    (1945, 1, 1, "ab 01.01.1945"),
    (1960, 1, 1, "ab 01.01.1960"),
    (1976, 11, 15, "ab 15.11.1976"),
    (1993, 10, 1, "ab 01.10.1993"),
    (2001, 10, 26, "ab 26.10.2001"),
];

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("no dataset partition covers construction date {date}")]
pub struct NoMatchingPartitionError {
    pub date: NaiveDate,
}

/// A partition that applies to buildings constructed on or after `since`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EraThreshold {
    pub since: NaiveDate,
    pub partition: String,
}

/// Ordered construction-era thresholds.
///
/// A date resolves to the partition of the latest threshold not after it.
/// Thresholds are kept sorted by date; entries sharing a date resolve to the
/// one given last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraTable {
    thresholds: Vec<EraThreshold>,
}

impl EraTable {
    #[must_use]
    pub fn new<I>(thresholds: I) -> Self
    where
        I: IntoIterator<Item = EraThreshold>,
    {
        let mut thresholds = thresholds.into_iter().collect::<Vec<_>>();
        thresholds.sort_by_key(|t| t.since);
        Self { thresholds }
    }

    /// The seven construction eras the simulation dataset is partitioned by.
    ///
    /// The earliest threshold is 0001-01-01, so every date from year 1 on
    /// resolves to some partition.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            STANDARD_THRESHOLDS
                .iter()
                .map(|&(year, month, day, partition)| EraThreshold {
                    since: NaiveDate::from_ymd_opt(year, month, day)
                        .expect("standard era thresholds are valid dates"),
                    partition: partition.to_owned(),
                }),
        )
    }

    #[must_use]
    pub fn thresholds(&self) -> &[EraThreshold] {
        &self.thresholds
    }

    /// Resolves `date` to the partition of the latest threshold `<= date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use retrofit_core::EraTable;
    ///
    /// let eras = EraTable::standard();
    /// let date = NaiveDate::from_ymd_opt(1976, 11, 15).unwrap();
    /// assert_eq!(eras.resolve(date).unwrap(), "ab 15.11.1976");
    /// ```
    pub fn resolve(&self, date: NaiveDate) -> Result<&str, NoMatchingPartitionError> {
        self.thresholds
            .iter()
            .rev()
            .find(|t| t.since <= date)
            .map(|t| t.partition.as_str())
            .ok_or(NoMatchingPartitionError { date })
    }
}

impl Default for EraTable {
    fn default() -> Self {
        Self::standard()
    }
}
