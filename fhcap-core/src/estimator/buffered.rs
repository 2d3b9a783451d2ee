use std::time::Duration;

use crate::{
    defaults::{
        DEFAULT_BUFFER_TIME, DEFAULT_LOSS_LIMIT, DEFAULT_SEARCH_ITERATIONS, DEFAULT_SLOT_TIME,
        DEFAULT_SMOOTHING_WINDOW,
    },
    estimator::ConfigError,
    measure::{LossLimit, Rate},
    trace::SlotTrace,
};

/// Minimum capacity meeting a loss SLA when a bounded buffer absorbs
/// bursts.
///
/// A candidate capacity is scored by replaying the trace through a leaky
/// bucket once: each traffic-bearing slot offers `rate × slot_time` bits
/// against a service budget of `capacity × slot_time` bits; excess demand
/// queues up in the buffer and surplus capacity drains it. A slot whose
/// excess no longer fits the buffer counts as an overflow, the overflowing
/// bits are dropped, and the loss ratio is the fraction of traffic-bearing
/// slots that overflowed. The candidate space is then bisected for a fixed
/// number of iterations, which caps runtime deterministically; the upper
/// bound of the final interval is returned so the result errs feasible
/// rather than tight.
///
/// The buffer holds `capacity × buffer_time` bits, proportional to the
/// candidate rate under test: a faster link is assumed to carry a
/// proportionally larger store for the same time margin.
///
/// # Example
///
/// ```
/// use fhcap_core::{BufferedEstimator, SlotTrace};
///
/// let trace = SlotTrace::from_rates(vec![5.0; 1000]).unwrap();
/// let estimate = BufferedEstimator::new().estimate(&trace);
/// assert_eq!(estimate.required_capacity.gbps(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferedEstimator {
    slot_time: Duration,
    buffer_time: Duration,
    loss_limit: LossLimit,
    window: usize,
    iterations: u32,
}

impl BufferedEstimator {
    /// Create an estimator with the conventional defaults: 500µs slots, a
    /// 143µs buffer margin, a 1% loss limit, a 20-slot smoothing window
    /// and 30 bisection iterations.
    pub fn new() -> Self {
        Self {
            slot_time: DEFAULT_SLOT_TIME,
            buffer_time: DEFAULT_BUFFER_TIME,
            loss_limit: DEFAULT_LOSS_LIMIT,
            window: DEFAULT_SMOOTHING_WINDOW,
            iterations: DEFAULT_SEARCH_ITERATIONS,
        }
    }

    /// Replace the slot duration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroSlotTime`] when `slot_time` is zero.
    pub fn with_slot_time(mut self, slot_time: Duration) -> Result<Self, ConfigError> {
        if slot_time.is_zero() {
            return Err(ConfigError::ZeroSlotTime);
        }
        self.slot_time = slot_time;
        Ok(self)
    }

    /// Replace the buffer margin. A zero margin models a bufferless link.
    pub fn with_buffer_time(mut self, buffer_time: Duration) -> Self {
        self.buffer_time = buffer_time;
        self
    }

    /// Replace the tolerated loss ratio.
    pub fn with_loss_limit(mut self, loss_limit: LossLimit) -> Self {
        self.loss_limit = loss_limit;
        self
    }

    /// Replace the smoothing window applied before the search, in slots.
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

    /// Replace the bisection iteration count.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroIterations`] when `iterations` is 0.
    pub fn with_iterations(mut self, iterations: u32) -> Result<Self, ConfigError> {
        if iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        self.iterations = iterations;
        Ok(self)
    }

    /// The configured slot duration.
    pub fn slot_time(&self) -> Duration {
        self.slot_time
    }

    /// The configured buffer margin.
    pub fn buffer_time(&self) -> Duration {
        self.buffer_time
    }

    /// The configured loss limit.
    pub fn loss_limit(&self) -> LossLimit {
        self.loss_limit
    }

    /// The configured smoothing window, in slots.
    pub fn window(&self) -> usize {
        self.window
    }

    /// The configured bisection iteration count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Snapshot of the parameter set, echoed into estimates and reports.
    pub fn params(&self) -> BufferedParams {
        BufferedParams {
            slot_time: self.slot_time,
            buffer_time: self.buffer_time,
            loss_limit: self.loss_limit,
            window: self.window,
            iterations: self.iterations,
        }
    }

    /// Fraction of traffic-bearing slots that overflow the buffer when the
    /// trace is served at `capacity`.
    ///
    /// Idle slots (rate `≤ 0`) are transparent: they advance neither
    /// counter and leave the buffer untouched. The replay is strictly
    /// sequential, the buffer occupancy carries from slot to slot.
    ///
    /// Returns `0.0` for a trace with no traffic-bearing slots.
    pub fn loss_ratio(&self, trace: &SlotTrace, capacity: Rate) -> f64 {
        let capacity_bits = capacity.bits_in(self.slot_time);
        let buffer_limit_bits = capacity.bits_in(self.buffer_time);

        let mut occupancy = 0.0_f64;
        let mut overflowed: u64 = 0;
        let mut carrying: u64 = 0;

        for &rate in trace.as_slice() {
            if rate <= 0.0 {
                continue;
            }
            carrying += 1;
            let demand_bits = Rate::from_valid(rate).bits_in(self.slot_time);
            let excess = demand_bits - capacity_bits;
            if excess > 0.0 {
                occupancy += excess;
                if occupancy > buffer_limit_bits {
                    // The overflowing bits are dropped, not retried; lost
                    // traffic does not linger in the buffer.
                    overflowed += 1;
                    occupancy = buffer_limit_bits;
                }
            } else {
                // Surplus capacity drains the backlog, never below empty.
                occupancy = (occupancy + excess).max(0.0);
            }
        }

        if carrying == 0 {
            0.0
        } else {
            overflowed as f64 / carrying as f64
        }
    }

    /// Estimate the required capacity for one link trace.
    ///
    /// The trace is smoothed with the same moving average as the no-buffer
    /// estimator so the two capacity figures share their pre-filtering;
    /// a trace shorter than the window is replayed raw, with a warning.
    /// The result is rounded to 3 decimal places of gbps.
    pub fn estimate(&self, trace: &SlotTrace) -> BufferedEstimate {
        let smoothed = match trace.smoothed(self.window) {
            Some(smoothed) => smoothed,
            None => {
                tracing::warn!(
                    slots = trace.len(),
                    window = self.window,
                    "trace shorter than the smoothing window, searching over the raw trace"
                );
                trace.clone()
            }
        };

        let average = smoothed.mean_nonzero();
        let peak = smoothed.peak();

        let mut low = average;
        let mut high = if peak > 0.0 { peak * 1.2 } else { average };

        for _ in 0..self.iterations {
            let mid = (low + high) / 2.0;
            if self.loss_ratio(&smoothed, Rate::from_valid(mid)) <= self.loss_limit.ratio() {
                high = mid;
            } else {
                low = mid;
            }
        }

        tracing::debug!(
            capacity = high,
            iterations = self.iterations,
            "capacity bisection settled"
        );

        BufferedEstimate {
            required_capacity: Rate::from_valid(high).rounded(),
            params: self.params(),
        }
    }
}

impl Default for BufferedEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// The parameter set a buffered estimate was produced with.
///
/// Carried inside every [`BufferedEstimate`] so a report row stays
/// self-describing even when estimator defaults change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferedParams {
    /// Slot duration.
    pub slot_time: Duration,
    /// Buffer margin; the buffer holds `capacity × buffer_time` bits.
    pub buffer_time: Duration,
    /// Tolerated fraction of overflowing traffic slots.
    pub loss_limit: LossLimit,
    /// Smoothing window applied before the search, in slots.
    pub window: usize,
    /// Bisection iteration count.
    pub iterations: u32,
}

/// Result of [`BufferedEstimator::estimate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferedEstimate {
    /// Smallest feasible capacity found, rounded to 3 decimals. Biased
    /// high by construction: the upper bound of the final bisection
    /// interval, feasible to within the interval width.
    pub required_capacity: Rate,
    /// Parameters the search ran with.
    pub params: BufferedParams,
}
