use serde::{Deserialize, Serialize};

use crate::{MeasureGroup, WindowShareBucket};

/// Geometric ratios identifying a simulated building variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantRatios {
    /// Volume to envelope surface area (V/A)
    pub va: f64,
    /// Exterior wall to floor area (AW/BF)
    pub awbf: f64,
}

/// A single simulated (building variant, measure) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// Column of the variant in the source table (0-based, excluding label columns)
    pub variant_index: usize,
    pub ratios: VariantRatios,
    pub measure: String,
    pub bucket: WindowShareBucket,
    pub savings_percent: f64,
}

impl SimulationRecord {
    #[must_use]
    pub fn group(&self) -> MeasureGroup {
        MeasureGroup::classify(&self.measure)
    }

    /// Whether this record belongs to the given variant at the given bucket.
    #[must_use]
    pub fn is_variant_at(&self, ratios: VariantRatios, bucket: WindowShareBucket) -> bool {
        self.ratios == ratios && self.bucket == bucket
    }
}

/// Immutable pool of all records loaded from one partition.
///
/// Records keep their load order: variant by variant, and within a variant in
/// measure row order. Matching tie-breaks rely on this order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPool {
    records: Box<[SimulationRecord]>,
}

impl RecordPool {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimulationRecord> {
        self.records.iter()
    }

    pub fn at_bucket(&self, bucket: WindowShareBucket) -> impl Iterator<Item = &SimulationRecord> {
        self.iter().filter(move |r| r.bucket == bucket)
    }

    /// All records simulated for `ratios` at `bucket`, in load order.
    pub fn variant_at(
        &self,
        ratios: VariantRatios,
        bucket: WindowShareBucket,
    ) -> impl Iterator<Item = &SimulationRecord> {
        self.iter().filter(move |r| r.is_variant_at(ratios, bucket))
    }
}

impl From<Vec<SimulationRecord>> for RecordPool {
    fn from(records: Vec<SimulationRecord>) -> Self {
        Self {
            records: records.into_boxed_slice(),
        }
    }
}

impl FromIterator<SimulationRecord> for RecordPool {
    fn from_iter<T: IntoIterator<Item = SimulationRecord>>(iter: T) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl<'a> IntoIterator for &'a RecordPool {
    type Item = &'a SimulationRecord;
    type IntoIter = std::slice::Iter<'a, SimulationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
