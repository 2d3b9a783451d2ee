use crate::{
    defaults::{DEFAULT_LOSS_PERCENTILE, DEFAULT_SMOOTHING_WINDOW},
    estimator::ConfigError,
    measure::{Percentile, Rate},
    trace::SlotTrace,
};

/// Capacity bound assuming no burst absorption at all.
///
/// Without a buffer, any instant where load exceeds capacity loses
/// traffic, so the link must be sized against short-term load rather than
/// the long-run mean. The trace is smoothed with a trailing moving average
/// of [`window`](Self::with_window) slots (roughly one scheduling epoch)
/// and the requirement is the [`percentile`](Self::with_percentile)-th
/// percentile of the smoothed curve: the smallest capacity that would be
/// exceeded in at most `100 − P` percent of windows.
///
/// A trace shorter than the window cannot be smoothed; the estimator then
/// falls back to the raw peak and emits a warning, since a peak is a much
/// blunter figure than the caller asked for.
///
/// # Example
///
/// ```
/// use fhcap_core::{NoBufferEstimator, SlotTrace};
///
/// let trace = SlotTrace::from_rates(vec![4.0; 200]).unwrap();
/// let estimate = NoBufferEstimator::new().estimate(&trace);
/// assert_eq!(estimate.required_capacity.gbps(), 4.0);
/// assert_eq!(estimate.average_traffic.gbps(), 4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoBufferEstimator {
    window: usize,
    percentile: Percentile,
}

impl NoBufferEstimator {
    /// Create an estimator with the conventional defaults: a 20-slot
    /// window and the 99th percentile.
    pub fn new() -> Self {
        Self {
            window: DEFAULT_SMOOTHING_WINDOW,
            percentile: DEFAULT_LOSS_PERCENTILE,
        }
    }

    /// Replace the smoothing window length, in slots.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroWindow`] when `window` is 0.
    pub fn with_window(mut self, window: usize) -> Result<Self, ConfigError> {
        if window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        self.window = window;
        Ok(self)
    }

    /// Replace the percentile of smoothed load the link is sized for.
    pub fn with_percentile(mut self, percentile: Percentile) -> Self {
        self.percentile = percentile;
        self
    }

    /// The configured smoothing window, in slots.
    pub fn window(&self) -> usize {
        self.window
    }

    /// The configured loss percentile.
    pub fn percentile(&self) -> Percentile {
        self.percentile
    }

    /// Estimate the required capacity for one link trace.
    ///
    /// Both output figures are rounded to 3 decimal places of gbps.
    pub fn estimate(&self, trace: &SlotTrace) -> NoBufferEstimate {
        let average_traffic = Rate::from_valid(trace.mean_nonzero()).rounded();

        let required_capacity = if trace.peak() == 0.0 {
            // Nothing was ever offered; an idle link needs no capacity.
            Rate::ZERO
        } else {
            match trace.smoothed(self.window) {
                Some(smoothed) => {
                    let value = self.percentile.over(smoothed.as_slice()).unwrap_or(0.0);
                    Rate::from_valid(value).rounded()
                }
                None => {
                    tracing::warn!(
                        slots = trace.len(),
                        window = self.window,
                        "trace shorter than the smoothing window, falling back to the peak rate"
                    );
                    Rate::from_valid(trace.peak()).rounded()
                }
            }
        };

        NoBufferEstimate {
            average_traffic,
            required_capacity,
        }
    }
}

impl Default for NoBufferEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`NoBufferEstimator::estimate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoBufferEstimate {
    /// Mean of the strictly-positive slot rates. Informational: reported
    /// alongside the capacity but never used to derive it.
    pub average_traffic: Rate,
    /// Capacity at the configured percentile of the smoothed trace.
    pub required_capacity: Rate,
}

#[cfg(test)]
mod tests {
    use rand_chacha::ChaChaRng;
    use rand_core::{Rng, SeedableRng as _};

    use super::*;

    fn unit_sample<R: Rng>(rng: &mut R) -> f64 {
        (rng.next_u64() as f64) * (1.0 / (u64::MAX as f64 + 1.0))
    }

    fn bursty_trace(seed: u64, len: usize) -> SlotTrace {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let rates = (0..len)
            .map(|_| {
                let uniform = unit_sample(&mut rng);
                // Mostly quiet link with occasional tall bursts.
                if uniform < 0.2 { uniform * 40.0 } else { uniform }
            })
            .collect();
        SlotTrace::from_rates(rates).unwrap()
    }

    #[test]
    fn all_zero_trace_needs_no_capacity() {
        let trace = SlotTrace::from_rates(vec![0.0; 100]).unwrap();
        let estimate = NoBufferEstimator::new().estimate(&trace);
        assert_eq!(estimate.required_capacity, Rate::ZERO);
        assert_eq!(estimate.average_traffic, Rate::ZERO);
    }

    #[test]
    fn empty_trace_needs_no_capacity() {
        let trace = SlotTrace::from_rates(vec![]).unwrap();
        let estimate = NoBufferEstimator::new().estimate(&trace);
        assert_eq!(estimate.required_capacity, Rate::ZERO);
    }

    #[test]
    fn short_trace_falls_back_to_peak() {
        // 5 slots against the default 20-slot window.
        let trace = SlotTrace::from_rates(vec![1.0, 3.0, 2.0, 0.5, 1.5]).unwrap();
        let estimate = NoBufferEstimator::new().estimate(&trace);
        assert_eq!(estimate.required_capacity.gbps(), 3.0);
    }

    #[test]
    fn twenty_three_slot_burst_scenario() {
        // Two idle edges around a 19-slot plateau of 10 gbps: exactly 4
        // smoothable windows, [9.0, 9.5, 9.5, 9.0], whose 99th percentile
        // interpolates between the two equal maxima.
        let mut rates = vec![10.0; 23];
        rates[0] = 0.0;
        rates[1] = 0.0;
        rates[21] = 0.0;
        rates[22] = 0.0;
        let trace = SlotTrace::from_rates(rates).unwrap();

        let smoothed = trace.smoothed(20).unwrap();
        assert_eq!(smoothed.as_slice(), &[9.0, 9.5, 9.5, 9.0]);

        let estimate = NoBufferEstimator::new().estimate(&trace);
        assert_eq!(estimate.required_capacity.gbps(), 9.5);
        assert_eq!(estimate.average_traffic.gbps(), 10.0);
    }

    #[test]
    fn average_excludes_idle_slots() {
        let mut rates = vec![0.0; 40];
        rates[3] = 6.0;
        rates[17] = 12.0;
        let trace = SlotTrace::from_rates(rates).unwrap();
        let estimate = NoBufferEstimator::new().estimate(&trace);
        assert_eq!(estimate.average_traffic.gbps(), 9.0);
    }

    #[test]
    fn capacity_is_monotone_in_percentile() {
        let trace = bursty_trace(11, 500);
        let mut previous = 0.0;
        for rank in [50.0, 90.0, 95.0, 99.0, 99.9, 100.0] {
            let estimator = NoBufferEstimator::new()
                .with_percentile(Percentile::new(rank).unwrap());
            let required = estimator.estimate(&trace).required_capacity.gbps();
            assert!(
                required >= previous,
                "p{rank} gave {required}, below {previous}"
            );
            previous = required;
        }
    }

    #[test]
    fn estimate_is_deterministic() {
        let trace = bursty_trace(12, 400);
        let estimator = NoBufferEstimator::new();
        assert_eq!(estimator.estimate(&trace), estimator.estimate(&trace));
    }

    #[test]
    fn constant_trace_needs_the_constant() {
        let trace = SlotTrace::from_rates(vec![7.25; 64]).unwrap();
        let estimate = NoBufferEstimator::new().estimate(&trace);
        assert_eq!(estimate.required_capacity.gbps(), 7.25);
    }

    #[test]
    fn window_resizing_changes_the_smoothing() {
        // With a window as long as the plateau-less trace, smoothing
        // averages everything; with window 1 the percentile sees raw slots.
        let trace = SlotTrace::from_rates(vec![0.0, 10.0, 0.0, 10.0, 0.0, 10.0]).unwrap();
        let wide = NoBufferEstimator::new()
            .with_window(6)
            .unwrap()
            .estimate(&trace);
        let narrow = NoBufferEstimator::new()
            .with_window(1)
            .unwrap()
            .estimate(&trace);
        assert_eq!(wide.required_capacity.gbps(), 5.0);
        assert_eq!(narrow.required_capacity.gbps(), 10.0);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert_eq!(
            NoBufferEstimator::new().with_window(0).unwrap_err(),
            ConfigError::ZeroWindow
        );
    }
}
