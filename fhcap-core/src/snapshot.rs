//! Per-slot diagnostic classification.

use std::fmt;

use crate::measure::LossLimit;

/// What one slot looked like on the wire.
///
/// A slot is [`Idle`] when it carried no traffic, [`Clean`] when its loss
/// ratio stayed within the limit and [`Lossy`] otherwise. Idle wins over
/// lossy: a slot that offered nothing cannot be congested, whatever its
/// loss counters claim.
///
/// # Example
///
/// ```
/// use fhcap_core::{LossLimit, SlotState};
///
/// let limit = LossLimit::ONE_PERCENT;
/// assert_eq!(SlotState::classify(0.0, 0.5, limit), SlotState::Idle);
/// assert_eq!(SlotState::classify(2.5, 0.002, limit), SlotState::Clean);
/// assert_eq!(SlotState::classify(2.5, 0.2, limit), SlotState::Lossy);
/// ```
///
/// [`Idle`]: SlotState::Idle
/// [`Clean`]: SlotState::Clean
/// [`Lossy`]: SlotState::Lossy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// No traffic offered in this slot.
    Idle,
    /// Traffic flowed and loss stayed within the limit.
    Clean,
    /// Traffic flowed and loss exceeded the limit.
    Lossy,
}

impl SlotState {
    /// Classify one slot from its offered rate (Gbps) and loss ratio.
    pub fn classify(rate: f64, loss_ratio: f64, limit: LossLimit) -> Self {
        if rate <= 0.0 {
            Self::Idle
        } else if loss_ratio <= limit.ratio() {
            Self::Clean
        } else {
            Self::Lossy
        }
    }

    /// Compact numeric code for tabulated output: idle 0, clean 1,
    /// lossy 2.
    pub fn code(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Clean => 1,
            Self::Lossy => 2,
        }
    }
}

// --- Display ---

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => "idle".fmt(f),
            Self::Clean => "clean".fmt(f),
            Self::Lossy => "lossy".fmt(f),
        }
    }
}
