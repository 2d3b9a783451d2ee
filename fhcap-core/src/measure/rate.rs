use logos::{Lexer, Logos};
use std::{fmt, str::FromStr, time::Duration};

/// A data rate in gigabits per second (decimal SI: 1 gbps = 10⁹ bits/s).
///
/// [`Rate`] is the unit of every slot-trace sample and of every capacity
/// figure the estimators produce. A rate is validated at construction and
/// is always finite and non-negative.
///
/// # Example
///
/// ```
/// # use fhcap_core::measure::Rate;
/// # use std::time::Duration;
/// // 2.5 Gbps, parsed from a unit-suffixed string
/// let rate: Rate = "2.5gbps".parse().unwrap();
/// // bits the link can carry in one second at this rate
/// let bits = rate.bits_in(Duration::from_secs(1));
/// # assert_eq!(bits, 2_500_000_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Rate(f64);

impl Rate {
    /// A rate of zero, an idle link.
    pub const ZERO: Self = Self(0.0);

    /// Create a rate from gigabits per second.
    ///
    /// # Errors
    ///
    /// Returns [`RateError`] if `gbps` is negative, NaN or infinite.
    pub fn new(gbps: f64) -> Result<Self, RateError> {
        if !gbps.is_finite() || gbps < 0.0 {
            return Err(RateError(gbps));
        }
        Ok(Self(gbps))
    }

    /// Wrap a value already known to be finite and non-negative.
    pub(crate) fn from_valid(gbps: f64) -> Self {
        debug_assert!(gbps.is_finite() && gbps >= 0.0, "invalid rate {gbps}");
        Self(gbps)
    }

    /// Returns the rate in gigabits per second.
    pub fn gbps(self) -> f64 {
        self.0
    }

    /// Returns how many bits this rate carries over `elapsed`.
    ///
    /// ```
    /// # use fhcap_core::measure::Rate;
    /// # use std::time::Duration;
    /// let rate = Rate::new(4.0).unwrap();
    /// assert_eq!(rate.bits_in(Duration::from_secs(2)), 8_000_000_000.0);
    /// ```
    pub fn bits_in(self, elapsed: Duration) -> f64 {
        self.0 * 1e9 * elapsed.as_secs_f64()
    }

    /// Round to 3 decimal places of gbps, the reporting precision.
    pub fn rounded(self) -> Self {
        Self((self.0 * 1_000.0).round_ties_even() / 1_000.0)
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::ZERO
    }
}

// --- Display ---

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // scaling to a sub-gbps unit multiplies by a power of ten and can
        // leave float noise far below the displayed unit; trim it off so a
        // parsed rate prints back as the number it was parsed from
        fn trim(value: f64) -> f64 {
            (value * 1e6).round_ties_even() / 1e6
        }

        let gbps = self.0;
        if gbps == 0.0 {
            write!(f, "0bps")
        } else if gbps >= 1.0 {
            write!(f, "{gbps}gbps")
        } else if gbps >= 1e-3 {
            write!(f, "{}mbps", trim(gbps * 1e3))
        } else if gbps >= 1e-6 {
            write!(f, "{}kbps", trim(gbps * 1e6))
        } else {
            write!(f, "{}bps", trim(gbps * 1e9))
        }
    }
}

// --- FromStr ---

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum RateToken {
    #[regex("bps")]
    Bps,
    #[regex("kbps")]
    Kbps,
    #[regex("mbps")]
    Mbps,
    #[regex("gbps")]
    Gbps,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Value,
}

impl FromStr for Rate {
    type Err = RateParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, RateToken>::new(s);

        let Some(Ok(RateToken::Value)) = lex.next() else {
            return Err(RateParseError::MissingValue);
        };
        let number: f64 = lex
            .slice()
            .parse()
            .map_err(|_| RateParseError::InvalidNumber)?;
        let Some(Ok(token)) = lex.next() else {
            return Err(RateParseError::MissingUnit);
        };
        let gbps = match token {
            RateToken::Bps => number * 1e-9,
            RateToken::Kbps => number * 1e-6,
            RateToken::Mbps => number * 1e-3,
            RateToken::Gbps => number,
            RateToken::Value => return Err(RateParseError::MissingUnit),
        };

        if lex.next().is_some() {
            return Err(RateParseError::TrailingInput);
        }

        Self::new(gbps).map_err(RateParseError::OutOfRange)
    }
}

/// Error returned when constructing a [`Rate`] from a negative or
/// non-finite value.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("rate must be finite and non-negative, got {0} gbps")]
pub struct RateError(f64);

/// Error returned when parsing a [`Rate`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RateParseError {
    /// The string does not start with a number.
    #[error("expected a number")]
    MissingValue,
    /// The numeric part could not be parsed as a float.
    #[error("invalid number")]
    InvalidNumber,
    /// No recognized unit follows the number.
    #[error("expected a unit (bps, kbps, mbps, gbps)")]
    MissingUnit,
    /// Extra tokens follow the unit.
    #[error("unexpected trailing input")]
    TrailingInput,
    /// The parsed value is not a valid rate.
    #[error("{0}")]
    OutOfRange(#[from] RateError),
}
