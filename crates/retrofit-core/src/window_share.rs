use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{value}% is not a supported window-share bucket")]
pub struct InvalidBucketError {
    pub value: u8,
}

/// A window-share level (percentage of glazing in the exterior wall area)
/// for which the dataset contains simulations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "u8", into = "u8")]
#[display("{_0}%")]
pub struct WindowShareBucket(u8);

impl WindowShareBucket {
    pub const ALL: [Self; 5] = [Self(10), Self(20), Self(30), Self(40), Self(50)];

    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// Snaps an arbitrary percentage to the closest bucket.
    ///
    /// On an exact midpoint the lower bucket wins. Values outside \[0, 100\]
    /// map to the nearest end of the bucket set and `NaN` maps to the lowest
    /// bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use retrofit_core::WindowShareBucket;
    ///
    /// assert_eq!(WindowShareBucket::quantize(33.0).percent(), 30);
    /// assert_eq!(WindowShareBucket::quantize(35.0).percent(), 30);
    /// ```
    #[must_use]
    pub fn quantize(percent: f64) -> Self {
        let distance = |bucket: &Self| (f64::from(bucket.0) - percent).abs();
        // `min_by` keeps the first of equal elements and `ALL` is ascending.
        Self::ALL
            .into_iter()
            .min_by(|a, b| distance(a).total_cmp(&distance(b)))
            .unwrap_or(Self::ALL[0])
    }

    /// Returns the bucket whose percentage equals `value` exactly.
    #[must_use]
    pub fn from_exact(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|bucket| f64::from(bucket.0) == value)
    }
}

impl TryFrom<u8> for WindowShareBucket {
    type Error = InvalidBucketError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.0 == value)
            .ok_or(InvalidBucketError { value })
    }
}

impl From<WindowShareBucket> for u8 {
    fn from(bucket: WindowShareBucket) -> Self {
        bucket.0
    }
}
