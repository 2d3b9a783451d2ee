use crate::measure::{LossLimit, Percentile};
use std::time::Duration;

/// Default slot duration
///
/// Every trace slot covers this much wall-clock time. The value matches
/// one scheduling period of the radio interface the captures come from.
///
/// ```
/// # use fhcap_core::defaults::*;
/// assert_eq!(DEFAULT_SLOT_TIME.as_micros(), 500);
/// ```
pub const DEFAULT_SLOT_TIME: Duration = Duration::from_micros(500);

/// Default buffer margin
///
/// The buffered estimator sizes the link buffer to hold this much time
/// worth of traffic at the candidate capacity.
///
/// See [`BufferedEstimator::with_buffer_time`] for more details.
///
/// ```
/// # use fhcap_core::defaults::*;
/// assert_eq!(DEFAULT_BUFFER_TIME.as_micros(), 143);
/// ```
///
/// [`BufferedEstimator::with_buffer_time`]: crate::estimator::BufferedEstimator::with_buffer_time
pub const DEFAULT_BUFFER_TIME: Duration = Duration::from_micros(143);

/// Default smoothing window, in slots
///
/// Both estimators smooth the trace with a trailing moving average over
/// this many slots before looking at it.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 20;

/// Default percentile for the no-buffer capacity figure
///
/// ```
/// # use fhcap_core::defaults::*;
/// assert_eq!(DEFAULT_LOSS_PERCENTILE.to_string(), "p99");
/// ```
pub const DEFAULT_LOSS_PERCENTILE: Percentile = Percentile::P99;

/// Default percentile for the glitch filter
///
/// Samples above this percentile of a raw capture are treated as
/// measurement glitches and zeroed before slot aggregation.
///
/// ```
/// # use fhcap_core::defaults::*;
/// assert_eq!(DEFAULT_GLITCH_PERCENTILE.to_string(), "p99.9");
/// ```
pub const DEFAULT_GLITCH_PERCENTILE: Percentile = Percentile::P99_9;

/// Default tolerated loss ratio
///
/// ```
/// # use fhcap_core::defaults::*;
/// assert_eq!(DEFAULT_LOSS_LIMIT.to_string(), "1%");
/// ```
pub const DEFAULT_LOSS_LIMIT: LossLimit = LossLimit::ONE_PERCENT;

/// Default bisection iteration count
///
/// 30 halvings shrink the search bracket by a factor of 2^30, far below
/// the 3-decimal rounding of the reported capacity.
pub const DEFAULT_SEARCH_ITERATIONS: u32 = 30;

/// Default symbols per slot
///
/// Raw captures arrive as per-symbol kilobit counts; this many symbols
/// make up one slot.
///
/// See [`SymbolAggregation`] for more details.
///
/// [`SymbolAggregation`]: crate::prepare::SymbolAggregation
pub const DEFAULT_SYMBOLS_PER_SLOT: usize = 14;

/// Default signal window, in slots
///
/// Loss signals are averaged over windows of this many slots before cells
/// are correlated for topology inference.
pub const DEFAULT_SIGNAL_WINDOW: usize = 50;

/// Default link count
///
/// Topology inference groups cells into this many links unless told
/// otherwise.
pub const DEFAULT_LINK_COUNT: usize = 3;
