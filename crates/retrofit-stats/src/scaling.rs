//! Min-max scaling.
//!
//! [`MinMaxScale`] stores the observed bounds of a dataset and maps values in
//! that range linearly onto \[0.0, 1.0\]. A range whose bounds coincide cannot
//! be scaled; instead of producing `NaN`, every operation on such a scale
//! returns [`DegenerateRangeError`] and leaves the fallback to the caller.

/// The scale's minimum and maximum are equal, so scaling is undefined.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
#[display("degenerate range: min and max are both {value}")]
pub struct DegenerateRangeError {
    pub value: f64,
}

/// Observed bounds of a dataset used for min-max scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScale {
    pub min: f64,
    pub max: f64,
}

impl MinMaxScale {
    /// Creates a scale covering all given values.
    ///
    /// Returns `None` for an empty input.
    ///
    /// # Examples
    ///
    /// ```
    /// use retrofit_stats::scaling::MinMaxScale;
    ///
    /// let scale = MinMaxScale::from_values([3.0, -1.0, 7.0]).unwrap();
    /// assert_eq!(scale.min, -1.0);
    /// assert_eq!(scale.max, 7.0);
    /// ```
    #[must_use]
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(Self { min, max }) => Some(Self {
                min: min.min(v),
                max: max.max(v),
            }),
        })
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }

    /// Maps `value` to `(value - min) / (max - min)`.
    ///
    /// Values outside the bounds are not clamped.
    pub fn normalize(&self, value: f64) -> Result<f64, DegenerateRangeError> {
        self.check()?;
        Ok((value - self.min) / self.span())
    }

    /// Inverse of [`normalize`](Self::normalize): `normalized * (max - min) + min`.
    pub fn denormalize(&self, normalized: f64) -> Result<f64, DegenerateRangeError> {
        self.check()?;
        Ok(normalized * self.span() + self.min)
    }

    fn check(&self) -> Result<(), DegenerateRangeError> {
        if self.is_degenerate() {
            return Err(DegenerateRangeError { value: self.min });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_map_to_unit_interval() {
        let scale = MinMaxScale::from_values([0.0, 10.0]).unwrap();
        assert_eq!(scale.normalize(0.0), Ok(0.0));
        assert_eq!(scale.normalize(10.0), Ok(1.0));
    }

    #[test]
    fn test_out_of_range_not_clamped() {
        let scale = MinMaxScale::from_values([10.0, 0.0]).unwrap();
        assert_eq!(scale.min, 0.0);
        assert_eq!(scale.normalize(15.0), Ok(1.5));
        assert_eq!(scale.normalize(-5.0), Ok(-0.5));
    }

    #[test]
    fn test_degenerate_range() {
        let scale = MinMaxScale::from_values([0.7, 0.7, 0.7]).unwrap();
        assert!(scale.is_degenerate());
        assert_eq!(
            scale.normalize(0.7),
            Err(DegenerateRangeError { value: 0.7 })
        );
        assert!(scale.denormalize(0.0).is_err());
    }

    #[test]
    fn test_round_trip() {
        let values = [0.31, 0.48, 0.52, 0.77, 0.9];
        let scale = MinMaxScale::from_values(values).unwrap();
        for v in values {
            let back = scale.denormalize(scale.normalize(v).unwrap()).unwrap();
            assert!((back - v).abs() < 1e-12, "{v} -> {back}");
        }
    }

    #[test]
    fn test_empty_values() {
        assert!(MinMaxScale::from_values([]).is_none());
    }
}
