//! Per-slot traffic traces.
//!
//! A [`SlotTrace`] is the input of every estimator in this crate: one rate
//! sample per fixed-duration time slot, produced either by
//! [`aggregate_link_traffic`](crate::aggregate::aggregate_link_traffic) for
//! a whole link or by
//! [`SymbolAggregation`](crate::prepare::SymbolAggregation) for a single
//! cell.

/// An immutable per-slot traffic trace.
///
/// Slot `i` covers the half-open interval `[i·T_slot, (i+1)·T_slot)`; the
/// slot index is contiguous and zero-based. Values are instantaneous rates
/// in gbps. A value of exactly `0.0` means no traffic was offered in that
/// slot; idle slots are never congestion events and several operations
/// ([`mean_nonzero`](Self::mean_nonzero), the estimators' simulation loops)
/// treat them as transparent.
///
/// Traces are validated on construction: every sample is finite and
/// non-negative, and nothing mutates a trace afterwards.
///
/// # Example
///
/// ```
/// use fhcap_core::SlotTrace;
///
/// let trace = SlotTrace::from_rates(vec![0.0, 4.0, 8.0, 0.0]).unwrap();
/// assert_eq!(trace.len(), 4);
/// assert_eq!(trace.peak(), 8.0);
/// // idle slots do not dilute the average
/// assert_eq!(trace.mean_nonzero(), 6.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SlotTrace(Vec<f64>);

impl SlotTrace {
    /// Create a trace from per-slot rates in gbps.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] naming the first offending slot if any sample
    /// is negative, NaN or infinite.
    pub fn from_rates(rates: Vec<f64>) -> Result<Self, TraceError> {
        for (slot, &value) in rates.iter().enumerate() {
            if !value.is_finite() {
                return Err(TraceError::NotFinite { slot, value });
            }
            if value < 0.0 {
                return Err(TraceError::Negative { slot, value });
            }
        }
        Ok(Self(rates))
    }

    /// Wrap samples already known to be finite and non-negative.
    pub(crate) fn from_valid(rates: Vec<f64>) -> Self {
        debug_assert!(
            rates.iter().all(|v| v.is_finite() && *v >= 0.0),
            "invalid slot rate"
        );
        Self(rates)
    }

    /// Number of slots in the trace.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the trace holds no slots at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw per-slot rates.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Largest sample in the trace, `0.0` for an empty trace.
    pub fn peak(&self) -> f64 {
        self.0.iter().copied().fold(0.0, f64::max)
    }

    /// Mean of the strictly-positive samples, `0.0` when every slot is
    /// idle. Idle slots are excluded so quiet periods do not dilute the
    /// load figure.
    pub fn mean_nonzero(&self) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for &value in &self.0 {
            if value > 0.0 {
                sum += value;
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { sum / count as f64 }
    }

    /// Trailing moving average with valid overlap: output sample `i` is
    /// the mean of raw samples `i..i + window`, so the output holds
    /// `len − window + 1` samples. Computed with a sliding sum in O(len).
    ///
    /// Returns `None` when the trace is shorter than `window` or `window`
    /// is zero; callers pick their own fallback.
    pub fn smoothed(&self, window: usize) -> Option<SlotTrace> {
        if window == 0 || self.0.len() < window {
            return None;
        }
        let divisor = window as f64;
        let mut out = Vec::with_capacity(self.0.len() - window + 1);
        let mut sum: f64 = self.0[..window].iter().sum();
        // The sliding sum can drift a hair below zero after long idle
        // stretches; the means stay clamped at zero.
        out.push((sum / divisor).max(0.0));
        for slot in window..self.0.len() {
            sum += self.0[slot] - self.0[slot - window];
            out.push((sum / divisor).max(0.0));
        }
        Some(SlotTrace::from_valid(out))
    }
}

/// Error returned when a trace sample is not a valid rate.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TraceError {
    /// A sample is negative.
    #[error("slot {slot} holds a negative rate ({value} gbps)")]
    Negative { slot: usize, value: f64 },
    /// A sample is NaN or infinite.
    #[error("slot {slot} holds a non-finite rate ({value})")]
    NotFinite { slot: usize, value: f64 },
}
