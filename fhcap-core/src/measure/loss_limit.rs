use std::{fmt, str::FromStr};

/// A validated loss-ratio bound in the range `[0.0, 1.0]`.
///
/// This is the SLA knob of the buffered estimator: the largest tolerated
/// fraction of traffic-bearing slots that may overflow the buffer. It also
/// serves as the lossy/clean threshold when classifying slots.
///
/// # Example
///
/// ```
/// use fhcap_core::measure::LossLimit;
///
/// // 1% loss (programmatic)
/// let limit = LossLimit::new(0.01).unwrap();
/// assert_eq!(limit.to_string(), "1%");
///
/// // 1% loss (parsed)
/// let parsed: LossLimit = "1%".parse().unwrap();
/// assert_eq!(parsed, limit);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LossLimit(f64);

impl LossLimit {
    /// No tolerated loss at all.
    pub const ZERO: Self = Self(0.0);
    /// The conventional 1% bound.
    pub const ONE_PERCENT: Self = Self(0.01);

    /// Create a new validated loss limit.
    ///
    /// # Errors
    ///
    /// Returns [`LossLimitError`] if `ratio` is NaN, negative, or greater
    /// than `1.0`.
    pub fn new(ratio: f64) -> Result<Self, LossLimitError> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(LossLimitError(ratio));
        }
        Ok(Self(ratio))
    }

    /// Returns the inner ratio in `[0.0, 1.0]`.
    pub fn ratio(self) -> f64 {
        self.0
    }
}

impl Default for LossLimit {
    fn default() -> Self {
        LossLimit::ONE_PERCENT
    }
}

impl fmt::Display for LossLimit {
    /// Formats as a percentage with up to 2 decimal places.
    ///
    /// - `LossLimit::new(0.01)` → `"1%"`
    /// - `LossLimit::new(0.005)` → `"0.50%"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = self.0 * 100.0;
        // If the percentage is a whole number, skip decimal places.
        if pct.fract() == 0.0 {
            write!(f, "{}%", pct as u64)
        } else {
            write!(f, "{:.2}%", pct)
        }
    }
}

impl FromStr for LossLimit {
    type Err = LossLimitParseError;

    /// Parses a percentage string like `"0%"`, `"1%"`, `"0.50%"`, `"100%"`.
    ///
    /// The `%` suffix is required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(num) = s.strip_suffix('%') else {
            return Err(LossLimitParseError::MissingSuffix);
        };
        let pct: f64 = num
            .trim()
            .parse()
            .map_err(|_| LossLimitParseError::InvalidNumber)?;
        Self::new(pct / 100.0).map_err(LossLimitParseError::OutOfRange)
    }
}

/// Error returned when constructing a [`LossLimit`] with a value outside
/// `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("loss limit must be in [0.0, 1.0], got {0}")]
pub struct LossLimitError(f64);

/// Error returned when parsing a [`LossLimit`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LossLimitParseError {
    /// The string does not end with `%`.
    #[error("expected '%' suffix")]
    MissingSuffix,
    /// The numeric part could not be parsed as a float.
    #[error("invalid number before '%'")]
    InvalidNumber,
    /// The parsed percentage is outside `[0, 100]`.
    #[error("{0}")]
    OutOfRange(#[from] LossLimitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_bounds() {
        assert!(LossLimit::new(0.0).is_ok());
        assert!(LossLimit::new(1.0).is_ok());
        assert!(LossLimit::new(0.01).is_ok());
    }

    #[test]
    fn new_rejects_invalid_values() {
        assert!(LossLimit::new(f64::NAN).is_err());
        assert!(LossLimit::new(-0.01).is_err());
        assert!(LossLimit::new(1.5).is_err());
    }

    #[test]
    fn default_is_one_percent() {
        assert_eq!(LossLimit::default(), LossLimit::ONE_PERCENT);
        assert_eq!(LossLimit::default().ratio(), 0.01);
    }

    #[test]
    fn display_whole_percent() {
        assert_eq!(LossLimit::new(0.01).unwrap().to_string(), "1%");
        assert_eq!(LossLimit::new(1.0).unwrap().to_string(), "100%");
        assert_eq!(LossLimit::ZERO.to_string(), "0%");
    }

    #[test]
    fn display_fractional_percent() {
        assert_eq!(LossLimit::new(0.005).unwrap().to_string(), "0.50%");
        assert_eq!(LossLimit::new(0.123).unwrap().to_string(), "12.30%");
    }

    #[test]
    fn parse_whole_percent() {
        assert_eq!(
            "1%".parse::<LossLimit>().unwrap(),
            LossLimit::new(0.01).unwrap()
        );
        assert_eq!(
            "100%".parse::<LossLimit>().unwrap(),
            LossLimit::new(1.0).unwrap()
        );
    }

    #[test]
    fn parse_round_trip() {
        for ratio in [0.0, 0.01, 0.05, 0.1, 0.5, 1.0] {
            let limit = LossLimit::new(ratio).unwrap();
            let s = limit.to_string();
            let parsed: LossLimit = s.parse().unwrap();
            assert_eq!(limit, parsed, "round-trip failed for {s}");
        }
    }

    #[test]
    fn parse_missing_suffix() {
        assert!("1".parse::<LossLimit>().is_err());
    }

    #[test]
    fn parse_invalid_number() {
        assert!("abc%".parse::<LossLimit>().is_err());
    }

    #[test]
    fn parse_out_of_range() {
        assert!("150%".parse::<LossLimit>().is_err());
        assert!("-1%".parse::<LossLimit>().is_err());
    }

    #[test]
    fn error_display() {
        let err = LossLimit::new(2.0).unwrap_err();
        assert_eq!(err.to_string(), "loss limit must be in [0.0, 1.0], got 2");
    }
}
