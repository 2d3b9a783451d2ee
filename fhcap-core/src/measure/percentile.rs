use std::fmt;

/// A percentile rank in `[0.0, 100.0]`.
///
/// Evaluating a percentile over a sample set uses linear interpolation
/// between order statistics, the conventional definition: the value at
/// fractional rank `p/100 × (n − 1)` of the sorted samples.
///
/// # Example
///
/// ```
/// use fhcap_core::measure::Percentile;
///
/// let median = Percentile::new(50.0).unwrap();
/// assert_eq!(median.over(&[1.0, 2.0, 10.0]), Some(2.0));
/// // interpolated halfway between the two middle samples
/// assert_eq!(median.over(&[1.0, 3.0, 5.0, 7.0]), Some(4.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentile(f64);

impl Percentile {
    /// The 99th percentile, the conventional capacity exceedance bound.
    pub const P99: Self = Self(99.0);
    /// The 99.9th percentile, the conventional glitch cutoff.
    pub const P99_9: Self = Self(99.9);

    /// Create a new validated percentile rank.
    ///
    /// # Errors
    ///
    /// Returns [`PercentileError`] if `rank` is NaN or outside
    /// `[0.0, 100.0]`.
    pub fn new(rank: f64) -> Result<Self, PercentileError> {
        if !(0.0..=100.0).contains(&rank) {
            return Err(PercentileError(rank));
        }
        Ok(Self(rank))
    }

    /// Returns the rank in `[0.0, 100.0]`.
    pub fn rank(self) -> f64 {
        self.0
    }

    /// Value of this percentile over `samples`, or `None` when `samples`
    /// is empty.
    ///
    /// Samples are copied and sorted; NaN samples order last under
    /// [`f64::total_cmp`], so callers should only pass finite values.
    pub fn over(self, samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);

        let rank = self.0 / 100.0 * (sorted.len() - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        let frac = rank - lo as f64;
        Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
    }
}

impl fmt::Display for Percentile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Error returned when constructing a [`Percentile`] with a rank outside
/// `[0.0, 100.0]`.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("percentile rank must be in [0.0, 100.0], got {0}")]
pub struct PercentileError(f64);
