//! Min-max normalization of the geometric ratios of a record pool.
//!
//! Bounds are computed once over the whole pool (all buckets) and the same
//! bounds normalize the query point, so pool and query share one space.

use retrofit_core::{RecordPool, SimulationRecord, VariantRatios};
use retrofit_stats::scaling::MinMaxScale;
use serde::Serialize;

/// Fallback applied when all records share the same value of a ratio.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::FromStr)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Map the degenerate axis to 0.0 for pool and query, so it does not
    /// contribute to distances.
    #[default]
    Collapse,
    /// Fail with [`DegenerateRangeError`].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum RatioAxis {
    #[display("V/A")]
    Va,
    #[display("AW/BF")]
    Awbf,
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("every record has {axis} = {value}, so {axis} cannot be normalized")]
pub struct DegenerateRangeError {
    pub axis: RatioAxis,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("cannot normalize an empty record pool")]
pub struct EmptyPoolError;

/// A point in normalized ratio space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedRatios {
    pub va: f64,
    pub awbf: f64,
}

impl NormalizedRatios {
    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dva = self.va - other.va;
        let dawbf = self.awbf - other.awbf;
        (dva * dva + dawbf * dawbf).sqrt()
    }
}

/// Observed ratio ranges of a record pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioBounds {
    pub va: MinMaxScale,
    pub awbf: MinMaxScale,
}

impl RatioBounds {
    /// Bounds of all records in `pool`, or `None` if the pool is empty.
    #[must_use]
    pub fn from_pool(pool: &RecordPool) -> Option<Self> {
        Some(Self {
            va: MinMaxScale::from_values(pool.iter().map(|r| r.ratios.va))?,
            awbf: MinMaxScale::from_values(pool.iter().map(|r| r.ratios.awbf))?,
        })
    }

    /// Normalizes `ratios`, handling degenerate ranges according to `policy`.
    pub fn normalize_with(
        &self,
        ratios: VariantRatios,
        policy: DegeneratePolicy,
    ) -> Result<NormalizedRatios, DegenerateRangeError> {
        Ok(NormalizedRatios {
            va: normalize_axis(&self.va, RatioAxis::Va, ratios.va, policy)?,
            awbf: normalize_axis(&self.awbf, RatioAxis::Awbf, ratios.awbf, policy)?,
        })
    }

    /// Maps a normalized point back to ratios.
    pub fn denormalize(
        &self,
        normalized: NormalizedRatios,
    ) -> Result<VariantRatios, DegenerateRangeError> {
        Ok(VariantRatios {
            va: self
                .va
                .denormalize(normalized.va)
                .map_err(|e| DegenerateRangeError {
                    axis: RatioAxis::Va,
                    value: e.value,
                })?,
            awbf: self
                .awbf
                .denormalize(normalized.awbf)
                .map_err(|e| DegenerateRangeError {
                    axis: RatioAxis::Awbf,
                    value: e.value,
                })?,
        })
    }
}

fn normalize_axis(
    scale: &MinMaxScale,
    axis: RatioAxis,
    value: f64,
    policy: DegeneratePolicy,
) -> Result<f64, DegenerateRangeError> {
    match (scale.normalize(value), policy) {
        (Ok(normalized), _) => Ok(normalized),
        (Err(_), DegeneratePolicy::Collapse) => Ok(0.0),
        (Err(e), DegeneratePolicy::Reject) => Err(DegenerateRangeError {
            axis,
            value: e.value,
        }),
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum NormalizeError {
    #[display("{_0}")]
    Empty(#[error(not(source))] EmptyPoolError),
    #[display("{_0}")]
    DegenerateRange(#[error(not(source))] DegenerateRangeError),
}

/// A record pool together with the normalized ratios of every record.
#[derive(Debug, Clone)]
pub struct NormalizedPool {
    pool: RecordPool,
    bounds: RatioBounds,
    policy: DegeneratePolicy,
    normalized: Box<[NormalizedRatios]>,
}

impl NormalizedPool {
    /// Computes the pool's bounds and normalizes every record.
    ///
    /// # Examples
    ///
    /// ```
    /// use retrofit_core::{RecordPool, SimulationRecord, VariantRatios, WindowShareBucket};
    /// use retrofit_matcher::normalization::{DegeneratePolicy, NormalizedPool};
    ///
    /// let record = |va: f64, awbf: f64| SimulationRecord {
    ///     variant_index: 0,
    ///     ratios: VariantRatios { va, awbf },
    ///     measure: "Fenstertausch".to_owned(),
    ///     bucket: WindowShareBucket::quantize(20.0),
    ///     savings_percent: 10.0,
    /// };
    /// let pool: RecordPool = [record(0.0, 1.0), record(10.0, 3.0)].into_iter().collect();
    ///
    /// let normalized = NormalizedPool::new(pool, DegeneratePolicy::Reject).unwrap();
    /// assert_eq!(normalized.normalized()[1].va, 1.0);
    /// ```
    pub fn new(pool: RecordPool, policy: DegeneratePolicy) -> Result<Self, NormalizeError> {
        let bounds = RatioBounds::from_pool(&pool).ok_or(EmptyPoolError)?;
        let normalized = pool
            .iter()
            .map(|r| bounds.normalize_with(r.ratios, policy))
            .collect::<Result<Box<[_]>, _>>()?;
        tracing::debug!(
            va_min = bounds.va.min,
            va_max = bounds.va.max,
            awbf_min = bounds.awbf.min,
            awbf_max = bounds.awbf.max,
            "normalized record pool"
        );
        Ok(Self {
            pool,
            bounds,
            policy,
            normalized,
        })
    }

    #[must_use]
    pub fn pool(&self) -> &RecordPool {
        &self.pool
    }

    #[must_use]
    pub fn bounds(&self) -> &RatioBounds {
        &self.bounds
    }

    #[must_use]
    pub fn normalized(&self) -> &[NormalizedRatios] {
        &self.normalized
    }

    /// Normalizes a query point with the pool's bounds and policy.
    pub fn normalize_query(
        &self,
        ratios: VariantRatios,
    ) -> Result<NormalizedRatios, DegenerateRangeError> {
        self.bounds.normalize_with(ratios, self.policy)
    }

    /// Records paired with their normalized ratios, in load order.
    pub fn iter(&self) -> impl Iterator<Item = (&SimulationRecord, &NormalizedRatios)> {
        self.pool.iter().zip(self.normalized.iter())
    }
}

#[cfg(test)]
mod tests {
    use retrofit_core::WindowShareBucket;

    use super::*;

    fn pool(ratios: &[(f64, f64)]) -> RecordPool {
        ratios
            .iter()
            .enumerate()
            .map(|(variant_index, &(va, awbf))| SimulationRecord {
                variant_index,
                ratios: VariantRatios { va, awbf },
                measure: "Fenstertausch".to_owned(),
                bucket: WindowShareBucket::quantize(30.0),
                savings_percent: 12.0,
            })
            .collect()
    }

    #[test]
    fn test_bounds_to_unit_interval() {
        let normalized =
            NormalizedPool::new(pool(&[(0.0, 2.0), (10.0, 4.0)]), DegeneratePolicy::Reject)
                .unwrap();
        assert_eq!(
            normalized.normalized(),
            [
                NormalizedRatios { va: 0.0, awbf: 0.0 },
                NormalizedRatios { va: 1.0, awbf: 1.0 },
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        let normalized = NormalizedPool::new(
            pool(&[(0.42, 1.1), (0.77, 0.63), (0.58, 0.94), (0.91, 1.37)]),
            DegeneratePolicy::Reject,
        )
        .unwrap();
        for (record, point) in normalized.iter() {
            let back = normalized.bounds().denormalize(*point).unwrap();
            assert!((back.va - record.ratios.va).abs() < 1e-12);
            assert!((back.awbf - record.ratios.awbf).abs() < 1e-12);
        }
    }

    #[test]
    fn test_query_uses_pool_bounds() {
        let normalized =
            NormalizedPool::new(pool(&[(0.0, 0.0), (4.0, 8.0)]), DegeneratePolicy::Reject)
                .unwrap();
        let query = normalized
            .normalize_query(VariantRatios { va: 1.0, awbf: 10.0 })
            .unwrap();
        assert_eq!(query, NormalizedRatios { va: 0.25, awbf: 1.25 });
    }

    #[test]
    fn test_degenerate_rejected() {
        let err = NormalizedPool::new(pool(&[(0.5, 1.0), (0.5, 2.0)]), DegeneratePolicy::Reject)
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::DegenerateRange(DegenerateRangeError {
                axis: RatioAxis::Va,
                value: 0.5
            })
        );
    }

    #[test]
    fn test_degenerate_collapsed() {
        let normalized =
            NormalizedPool::new(pool(&[(0.5, 1.0), (0.5, 2.0)]), DegeneratePolicy::Collapse)
                .unwrap();
        assert!(normalized.normalized().iter().all(|p| p.va == 0.0));
        let query = normalized
            .normalize_query(VariantRatios { va: 0.9, awbf: 1.5 })
            .unwrap();
        assert_eq!(query, NormalizedRatios { va: 0.0, awbf: 0.5 });
        assert!(query.va.is_finite() && query.awbf.is_finite());
    }

    #[test]
    fn test_empty_pool() {
        assert_eq!(
            NormalizedPool::new(RecordPool::default(), DegeneratePolicy::Collapse).unwrap_err(),
            NormalizeError::Empty(EmptyPoolError)
        );
    }

    #[test]
    fn test_distance() {
        let a = NormalizedRatios { va: 0.0, awbf: 0.0 };
        let b = NormalizedRatios { va: 0.3, awbf: 0.4 };
        assert!((a.distance(&b) - 0.5).abs() < 1e-12);
        assert_eq!(a.distance(&a), 0.0);
    }
}
