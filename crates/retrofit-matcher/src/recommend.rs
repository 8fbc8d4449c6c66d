//! The end-to-end recommendation pipeline.

use chrono::NaiveDate;
use retrofit_core::{EraTable, NoMatchingPartitionError, VariantRatios, WindowShareBucket};
use retrofit_dataset::{
    LoadError, LoadPoolError, load_pool, reshape::MalformedTableError, source::TableSource,
};
use serde::Serialize;

use crate::{
    aggregate::{self, GroupRanking},
    matcher::{self, NoCandidatesError, VariantMatch},
    normalization::{DegeneratePolicy, DegenerateRangeError, NormalizeError, NormalizedPool},
};

pub const DEFAULT_TOP_GROUPS: usize = 2;

/// A building to find renovation measures for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Query {
    pub construction_date: NaiveDate,
    pub ratios: VariantRatios,
    /// Window share in percent, not yet quantized
    pub window_share_percent: f64,
    /// Built-up area in m². Accepted for completeness; matching does not use it.
    pub floor_area: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub partition: String,
    pub bucket: WindowShareBucket,
    pub matched: VariantMatch,
    /// Best groups first
    pub groups: Vec<GroupRanking>,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From, derive_more::IsVariant)]
pub enum RecommendError {
    #[display("{_0}")]
    NoMatchingPartition(#[error(not(source))] NoMatchingPartitionError),
    #[display("dataset has no table for partition '{partition}'")]
    #[from(skip)]
    PartitionNotFound { partition: String },
    #[display("failed to load dataset table for partition '{partition}'")]
    #[from(skip)]
    Dataset { partition: String, source: LoadError },
    #[display("malformed dataset table for partition '{partition}'")]
    #[from(skip)]
    MalformedTable {
        partition: String,
        source: MalformedTableError,
    },
    #[display("dataset table for partition '{partition}' contains no simulations")]
    #[from(skip)]
    EmptyPartition { partition: String },
    #[display("{_0}")]
    DegenerateRange(#[error(not(source))] DegenerateRangeError),
    #[display("{_0}")]
    NoCandidates(#[error(not(source))] NoCandidatesError),
}

impl RecommendError {
    fn from_load(partition: &str, error: LoadPoolError) -> Self {
        let partition = partition.to_owned();
        match error {
            LoadPoolError::Load(LoadError::PartitionNotFound { .. }) => {
                Self::PartitionNotFound { partition }
            }
            LoadPoolError::Load(source) => Self::Dataset { partition, source },
            LoadPoolError::MalformedTable { source, .. } => Self::MalformedTable { partition, source },
        }
    }

    fn from_normalize(partition: &str, error: NormalizeError) -> Self {
        match error {
            NormalizeError::Empty(_) => Self::EmptyPartition {
                partition: partition.to_owned(),
            },
            NormalizeError::DegenerateRange(e) => Self::DegenerateRange(e),
        }
    }
}

/// Recommends renovation measure groups for a building.
///
/// # Pipeline
///
/// 1. Resolve the construction date to a dataset partition ([`EraTable`])
/// 2. Load and reshape the partition's table ([`load_pool`])
/// 3. Normalize ratios over the whole pool ([`NormalizedPool`])
/// 4. Quantize the window share and find the nearest variant at that bucket
///    ([`matcher::find_nearest`])
/// 5. Rank the measure groups of that variant ([`aggregate::rank_groups`])
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use retrofit_core::{MeasureGroup, VariantRatios};
/// use retrofit_dataset::table::Workbook;
/// use retrofit_matcher::{Query, Recommender};
///
/// let workbook: Workbook = serde_json::from_str(
///     r#"{
///         "sheets": {
///             "ab 01.01.1960": [
///                 ["V/A", null, 0.4, 0.8],
///                 ["AW/BF", null, 1.2, 0.6],
///                 ["Fenstertausch 3-fach", 30, 11.0, 6.0],
///                 ["Dämmung oberste Decke", 30, 14.0, 18.0]
///             ]
///         }
///     }"#,
/// )
/// .unwrap();
///
/// let query = Query {
///     construction_date: NaiveDate::from_ymd_opt(1965, 4, 1).unwrap(),
///     ratios: VariantRatios { va: 0.75, awbf: 0.7 },
///     window_share_percent: 28.0,
///     floor_area: None,
/// };
/// let recommendation = Recommender::default().recommend(&workbook, &query).unwrap();
/// assert_eq!(recommendation.matched.variant_index, 1);
/// assert_eq!(recommendation.groups[0].group, MeasureGroup::ObersteDecke);
/// ```
#[derive(Debug, Clone)]
pub struct Recommender {
    eras: EraTable,
    policy: DegeneratePolicy,
    top_groups: usize,
}

impl Default for Recommender {
    fn default() -> Self {
        Self {
            eras: EraTable::standard(),
            policy: DegeneratePolicy::default(),
            top_groups: DEFAULT_TOP_GROUPS,
        }
    }
}

impl Recommender {
    #[must_use]
    pub fn with_eras(mut self, eras: EraTable) -> Self {
        self.eras = eras;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_top_groups(mut self, top_groups: usize) -> Self {
        self.top_groups = top_groups;
        self
    }

    pub fn recommend<S>(&self, source: &S, query: &Query) -> Result<Recommendation, RecommendError>
    where
        S: TableSource + ?Sized,
    {
        let partition = self.eras.resolve(query.construction_date)?;
        tracing::info!(date = %query.construction_date, partition, "selected dataset partition");
        if let Some(floor_area) = query.floor_area {
            tracing::debug!(floor_area, "floor area is not used for matching");
        }

        let pool =
            load_pool(source, partition).map_err(|e| RecommendError::from_load(partition, e))?;
        let pool = NormalizedPool::new(pool, self.policy)
            .map_err(|e| RecommendError::from_normalize(partition, e))?;

        let bucket = WindowShareBucket::quantize(query.window_share_percent);
        tracing::info!(
            input = query.window_share_percent,
            %bucket,
            "quantized window share"
        );
        let point = pool.normalize_query(query.ratios)?;
        let matched = matcher::find_nearest(&pool, bucket, &point)?;

        let mut groups = aggregate::rank_groups(pool.pool().variant_at(matched.ratios, bucket));
        groups.truncate(self.top_groups);

        Ok(Recommendation {
            partition: partition.to_owned(),
            bucket,
            matched,
            groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use retrofit_core::{EraThreshold, MeasureGroup};
    use retrofit_dataset::table::Workbook;

    use super::*;

    const WORKBOOK: &str = r#"{
        "sheets": {
            "ab 01.01.1945": [
                ["V/A", null, 0.40, 0.60, 0.80],
                ["AW/BF", null, 1.20, 0.90, 0.60],
                ["Fenstertausch 2-fach", 20, 4.0, 3.5, 3.0],
                ["Fenstertausch 3-fach", 20, 8.0, 7.0, 6.0],
                ["Dämmung oberste Decke 20cm", 20, 10.0, 12.0, 14.0],
                ["Dämmung unterste Decke 10cm", 20, 5.0, 5.5, 6.0],
                ["AW Sanierung WDVS 16cm", 20, 16.0, 13.0, 9.0],
                ["Lüftungsanlage", 20, 2.0, 2.0, 2.0],
                ["Fenstertausch 3-fach", 40, 12.0, 10.0, 9.0],
                ["Fassade hinterlüftet", 40, 11.0, 9.0, 8.0]
            ],
            "ab 01.01.1960": [
                ["V/A", null, 0.5, 0.5],
                ["AW/BF", null, 1.0, 1.0],
                ["Fenstertausch", 30, 4.0, 3.0]
            ]
        }
    }"#;

    fn workbook() -> Workbook {
        serde_json::from_str(WORKBOOK).unwrap()
    }

    fn query(year: i32, va: f64, awbf: f64, window_share_percent: f64) -> Query {
        Query {
            construction_date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            ratios: VariantRatios { va, awbf },
            window_share_percent,
            floor_area: Some(120.0),
        }
    }

    #[test]
    fn test_recommend_top_two_groups() {
        let recommendation = Recommender::default()
            .recommend(&workbook(), &query(1950, 0.42, 1.15, 22.0))
            .unwrap();

        assert_eq!(recommendation.partition, "ab 01.01.1945");
        assert_eq!(recommendation.bucket.percent(), 20);
        assert_eq!(recommendation.matched.variant_index, 0);
        assert_eq!(recommendation.matched.candidates, 18);

        let groups = recommendation
            .groups
            .iter()
            .map(|g| (g.group, g.mean_savings_percent))
            .collect::<Vec<_>>();
        assert_eq!(
            groups,
            [(MeasureGroup::Aw, 16.0), (MeasureGroup::ObersteDecke, 10.0)]
        );
        assert_eq!(recommendation.groups[0].measures.len(), 1);
    }

    #[test]
    fn test_recommend_only_matched_bucket() {
        let recommendation = Recommender::default()
            .with_top_groups(5)
            .recommend(&workbook(), &query(1950, 0.8, 0.6, 38.0))
            .unwrap();
        assert_eq!(recommendation.bucket.percent(), 40);
        assert_eq!(recommendation.matched.variant_index, 2);
        let groups = recommendation
            .groups
            .iter()
            .map(|g| (g.group, g.mean_savings_percent))
            .collect::<Vec<_>>();
        assert_eq!(groups, [(MeasureGroup::Fenster, 9.0), (MeasureGroup::Aw, 8.0)]);
    }

    #[test]
    fn test_no_candidates_at_bucket() {
        let err = Recommender::default()
            .recommend(&workbook(), &query(1950, 0.5, 1.0, 50.0))
            .unwrap_err();
        assert!(err.is_no_candidates());
        assert_eq!(
            err.to_string(),
            "no simulations with 50% window share in this dataset partition"
        );
    }

    #[test]
    fn test_partition_not_found() {
        let err = Recommender::default()
            .recommend(&workbook(), &query(1980, 0.5, 1.0, 20.0))
            .unwrap_err();
        assert!(matches!(
            err,
            RecommendError::PartitionNotFound { ref partition } if partition == "ab 15.11.1976"
        ));
    }

    #[test]
    fn test_no_matching_partition() {
        let eras = EraTable::new([EraThreshold {
            since: NaiveDate::from_ymd_opt(1945, 1, 1).unwrap(),
            partition: "ab 01.01.1945".to_owned(),
        }]);
        let err = Recommender::default()
            .with_eras(eras)
            .recommend(&workbook(), &query(1930, 0.5, 1.0, 20.0))
            .unwrap_err();
        assert!(err.is_no_matching_partition());
    }

    #[test]
    fn test_degenerate_policy() {
        let collapse = Recommender::default()
            .recommend(&workbook(), &query(1965, 0.9, 0.2, 30.0))
            .unwrap();
        assert_eq!(collapse.matched.record_index, 0);
        assert_eq!(collapse.matched.distance, 0.0);

        let err = Recommender::default()
            .with_policy(DegeneratePolicy::Reject)
            .recommend(&workbook(), &query(1965, 0.9, 0.2, 30.0))
            .unwrap_err();
        assert!(err.is_degenerate_range());
    }

    #[test]
    fn test_malformed_table() {
        let workbook: Workbook = serde_json::from_str(
            r#"{"sheets": {"vor 1900": [["V/A", null, 0.5], ["AW/BF", null, 1.0]]}}"#,
        )
        .unwrap();
        let err = Recommender::default()
            .recommend(&workbook, &query(1890, 0.5, 1.0, 20.0))
            .unwrap_err();
        assert!(err.is_malformed_table());
    }

    #[test]
    fn test_separator_and_unsupported_rows_ignored() {
        let workbook: Workbook = serde_json::from_str(
            r#"{"sheets": {"ab 01.01.1945": [
                ["V/A", null, 0.4, 0.8],
                ["AW/BF", null, 1.2, 0.6],
                ["Fenstertausch 3-fach", 20, 8.0, 6.0],
                [null, null, null, null],
                ["Fenstertausch 3-fach", 60, 3.0, 2.0],
                ["AW Sanierung WDVS 16cm", 20, 16.0, 9.0]
            ]}}"#,
        )
        .unwrap();
        let recommendation = Recommender::default()
            .recommend(&workbook, &query(1950, 0.4, 1.2, 20.0))
            .unwrap();
        assert_eq!(recommendation.matched.candidates, 4);
        let groups = recommendation
            .groups
            .iter()
            .map(|g| (g.group, g.mean_savings_percent))
            .collect::<Vec<_>>();
        assert_eq!(groups, [(MeasureGroup::Aw, 16.0), (MeasureGroup::Fenster, 8.0)]);
    }

    #[test]
    fn test_empty_partition() {
        let workbook: Workbook = serde_json::from_str(
            r#"{"sheets": {"vor 1900": [
                ["V/A", null, 0.5],
                ["AW/BF", null, 1.0],
                ["Fenstertausch", 25, 3.0]
            ]}}"#,
        )
        .unwrap();
        let err = Recommender::default()
            .recommend(&workbook, &query(1890, 0.5, 1.0, 20.0))
            .unwrap_err();
        assert!(matches!(
            err,
            RecommendError::EmptyPartition { ref partition } if partition == "vor 1900"
        ));
    }
}
