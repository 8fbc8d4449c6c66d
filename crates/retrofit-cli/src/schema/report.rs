use chrono::{DateTime, Utc};
use retrofit_core::{MeasureGroup, WindowShareBucket};
use retrofit_matcher::{Query, Recommendation};
use retrofit_stats::descriptive::DescriptiveStats;
use serde::Serialize;

/// Result of one `recommend` run
#[derive(Debug, Clone, Serialize)]
pub struct RecommendReport {
    /// Timestamp when the report was created
    pub generated_at: DateTime<Utc>,
    pub query: Query,
    #[serde(flatten)]
    pub outcome: RecommendOutcome,
}

impl RecommendReport {
    /// Input window share rounded to the simulated bucket
    #[must_use]
    pub fn bucket(&self) -> WindowShareBucket {
        match &self.outcome {
            RecommendOutcome::Matched { recommendation } => recommendation.bucket,
            RecommendOutcome::NoCandidates { bucket, .. } => *bucket,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendOutcome {
    Matched { recommendation: Recommendation },
    /// The partition has no simulations at the bucket
    NoCandidates {
        bucket: WindowShareBucket,
        message: String,
    },
}

/// Overview of one dataset partition, produced by `inspect`
#[derive(Debug, Clone, Serialize)]
pub struct PartitionSummary {
    pub partition: String,
    pub records: usize,
    pub variants: usize,
    pub buckets: Vec<BucketSummary>,
    pub va: RatioSummary,
    pub awbf: RatioSummary,
    /// Mean savings per group over all variants and buckets, best first
    pub groups: Vec<GroupSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketSummary {
    pub bucket: WindowShareBucket,
    /// Measure rows simulated at this bucket
    pub measures: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RatioSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl From<DescriptiveStats> for RatioSummary {
    fn from(stats: DescriptiveStats) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            median: stats.median,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub group: MeasureGroup,
    pub records: usize,
    pub mean_savings_percent: f64,
    pub max_savings_percent: f64,
}

/// One row of the `partitions` listing
#[derive(Debug, Clone, Serialize)]
pub struct PartitionEntry {
    pub since: chrono::NaiveDate,
    pub partition: String,
    /// Whether the dataset has a table for the partition, if a dataset was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
}
