//! Turning raw captures into estimator inputs.
//!
//! Capture equipment reports throughput per *symbol*, a sub-slot sampling
//! period, in kilobits. [`SymbolAggregation`] rolls those samples up into a
//! [`SlotTrace`], zeroing measurement glitches on the way. Packet loss
//! arrives as per-slot [`PacketCounters`]; [`loss_signal`] turns a slot
//! sequence of counters into the loss-ratio series consumed by topology
//! inference.

use std::time::Duration;

use crate::{
    defaults::{DEFAULT_GLITCH_PERCENTILE, DEFAULT_SLOT_TIME, DEFAULT_SYMBOLS_PER_SLOT},
    measure::Percentile,
    trace::{SlotTrace, TraceError},
};

/// Rolls per-symbol kilobit samples up into a per-slot rate trace.
///
/// Samples strictly above the glitch percentile of the capture are zeroed
/// first: isolated readings far above everything else are artifacts of the
/// capture path, not traffic. The survivors are summed in groups of
/// [`symbols_per_slot`] and each group's kilobit total becomes a Gbps rate
/// over the slot duration. A trailing group short of a full slot keeps its
/// partial sum.
///
/// # Example
///
/// ```
/// use fhcap_core::prepare::SymbolAggregation;
/// use std::time::Duration;
///
/// let prepare = SymbolAggregation::new()
///     .with_symbols_per_slot(2)
///     .unwrap()
///     .with_slot_time(Duration::from_secs(1))
///     .unwrap();
/// // Two slots of 2 symbols each: 3 + 5 = 8 kilobits, then 1 + 1 = 2.
/// let trace = prepare.slot_trace(&[3.0, 5.0, 1.0, 1.0]).unwrap();
/// assert_eq!(trace.as_slice(), &[0.000008, 0.000002]);
/// ```
///
/// [`symbols_per_slot`]: SymbolAggregation::symbols_per_slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolAggregation {
    symbols_per_slot: usize,
    slot_time: Duration,
    glitch_percentile: Percentile,
}

impl SymbolAggregation {
    /// Create an aggregation with the conventional defaults: 14 symbols
    /// per slot, 500µs slots and a 99.9th-percentile glitch filter.
    pub fn new() -> Self {
        Self {
            symbols_per_slot: DEFAULT_SYMBOLS_PER_SLOT,
            slot_time: DEFAULT_SLOT_TIME,
            glitch_percentile: DEFAULT_GLITCH_PERCENTILE,
        }
    }

    /// Replace the number of symbols that make up one slot.
    ///
    /// # Errors
    ///
    /// [`PrepareError::ZeroSymbols`] when `symbols_per_slot` is 0.
    pub fn with_symbols_per_slot(mut self, symbols_per_slot: usize) -> Result<Self, PrepareError> {
        if symbols_per_slot == 0 {
            return Err(PrepareError::ZeroSymbols);
        }
        self.symbols_per_slot = symbols_per_slot;
        Ok(self)
    }

    /// Replace the slot duration.
    ///
    /// # Errors
    ///
    /// [`PrepareError::ZeroSlotTime`] when `slot_time` is zero.
    pub fn with_slot_time(mut self, slot_time: Duration) -> Result<Self, PrepareError> {
        if slot_time.is_zero() {
            return Err(PrepareError::ZeroSlotTime);
        }
        self.slot_time = slot_time;
        Ok(self)
    }

    /// Replace the glitch percentile.
    pub fn with_glitch_percentile(mut self, glitch_percentile: Percentile) -> Self {
        self.glitch_percentile = glitch_percentile;
        self
    }

    /// The number of symbols that make up one slot.
    pub fn symbols_per_slot(&self) -> usize {
        self.symbols_per_slot
    }

    /// The slot duration.
    pub fn slot_time(&self) -> Duration {
        self.slot_time
    }

    /// The glitch percentile.
    pub fn glitch_percentile(&self) -> Percentile {
        self.glitch_percentile
    }

    /// Aggregate one capture of per-symbol kilobit counts, in time order,
    /// into a [`SlotTrace`].
    ///
    /// # Errors
    ///
    /// [`PrepareError::EmptyCapture`] when `samples` is empty and
    /// [`PrepareError::InvalidSample`] when a sample is negative or not
    /// finite.
    pub fn slot_trace(&self, samples: &[f64]) -> Result<SlotTrace, PrepareError> {
        if samples.is_empty() {
            return Err(PrepareError::EmptyCapture);
        }
        for (index, &value) in samples.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(PrepareError::InvalidSample { index, value });
            }
        }

        // With every sample at or below an infinite threshold the filter
        // keeps the capture untouched.
        let threshold = self
            .glitch_percentile
            .over(samples)
            .unwrap_or(f64::INFINITY);

        let slot_seconds = self.slot_time.as_secs_f64();
        let rates = samples
            .chunks(self.symbols_per_slot)
            .map(|slot| {
                let kilobits: f64 = slot
                    .iter()
                    .map(|&sample| if sample > threshold { 0.0 } else { sample })
                    .sum();
                kilobits * 1_000.0 / slot_seconds / 1e9
            })
            .collect();

        Ok(SlotTrace::from_rates(rates)?)
    }
}

impl Default for SymbolAggregation {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-slot packet accounting from the receiver side.
///
/// `too_late` counts packets that did arrive but missed their processing
/// deadline; they are as good as lost to the radio stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketCounters {
    /// Packets handed to the link in this slot.
    pub transmitted: u64,
    /// Packets received in time.
    pub received: u64,
    /// Packets received after their deadline.
    pub too_late: u64,
}

impl PacketCounters {
    /// The slot's loss ratio: `(transmitted - received + too_late) /
    /// transmitted`, or 0 for a slot with nothing transmitted.
    ///
    /// Counters come from two independent clock domains, so `received` can
    /// momentarily exceed `transmitted` and the ratio go negative. The
    /// value is reported as computed; downstream consumers correlate the
    /// shape of the signal and care about fidelity, not about clamping.
    pub fn loss_ratio(&self) -> f64 {
        if self.transmitted == 0 {
            return 0.0;
        }
        let lost = self.transmitted as f64 - self.received as f64 + self.too_late as f64;
        lost / self.transmitted as f64
    }
}

/// The per-slot loss-ratio series of one cell, in slot order.
pub fn loss_signal(counters: &[PacketCounters]) -> Vec<f64> {
    counters.iter().map(PacketCounters::loss_ratio).collect()
}

/// Error preparing raw captures.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PrepareError {
    /// The capture holds no samples at all.
    #[error("the capture holds no samples")]
    EmptyCapture,
    /// A sample is negative or not finite.
    #[error("sample {index} is not a valid kilobit count: {value}")]
    InvalidSample {
        /// Position of the offending sample in the capture.
        index: usize,
        /// The offending value.
        value: f64,
    },
    /// A slot must cover at least one symbol.
    #[error("a slot must cover at least one symbol")]
    ZeroSymbols,
    /// The slot duration must not be zero.
    #[error("the slot duration must not be zero")]
    ZeroSlotTime,
    /// The aggregated rates do not form a valid trace.
    #[error(transparent)]
    Trace(#[from] TraceError),
}
