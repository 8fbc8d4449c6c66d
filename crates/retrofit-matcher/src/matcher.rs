//! Nearest-neighbor matching of a query point against the record pool.

use retrofit_core::{VariantRatios, WindowShareBucket};
use serde::Serialize;

use crate::normalization::{NormalizedPool, NormalizedRatios};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("no simulations with {bucket} window share in this dataset partition")]
pub struct NoCandidatesError {
    pub bucket: WindowShareBucket,
}

/// The building variant closest to a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VariantMatch {
    pub ratios: VariantRatios,
    pub variant_index: usize,
    /// Index of the closest record in the pool
    pub record_index: usize,
    /// Distance in normalized ratio space
    pub distance: f64,
    /// Number of records at the bucket that were compared
    pub candidates: usize,
}

/// Finds the record at `bucket` closest to `query`.
///
/// Only records whose bucket equals `bucket` are considered. If several
/// records share the minimum distance, the first one in load order wins.
pub fn find_nearest(
    pool: &NormalizedPool,
    bucket: WindowShareBucket,
    query: &NormalizedRatios,
) -> Result<VariantMatch, NoCandidatesError> {
    let mut candidates = 0;
    let nearest = pool
        .iter()
        .enumerate()
        .filter(|(_, (record, _))| record.bucket == bucket)
        .inspect(|_| candidates += 1)
        .map(|(index, (record, point))| (index, record, point.distance(query)))
        // `min_by` returns the first of equally minimal elements
        .min_by(|(_, _, a), (_, _, b)| a.total_cmp(b));

    let (record_index, record, distance) = nearest.ok_or(NoCandidatesError { bucket })?;
    let found = VariantMatch {
        ratios: record.ratios,
        variant_index: record.variant_index,
        record_index,
        distance,
        candidates,
    };
    tracing::debug!(
        va = found.ratios.va,
        awbf = found.ratios.awbf,
        distance,
        candidates,
        "matched building variant"
    );
    Ok(found)
}
