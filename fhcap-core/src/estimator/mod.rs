//! The two capacity estimators.
//!
//! Both take the same aggregated link trace and answer the same question,
//! "what is the smallest capacity keeping loss inside the SLA", under
//! different hardware assumptions: [`NoBufferEstimator`] assumes overflow
//! in any instant is lost, [`BufferedEstimator`] lets a bounded buffer
//! absorb short bursts before anything is lost.

mod buffered;
mod no_buffer;

pub use self::{
    buffered::{BufferedEstimate, BufferedEstimator, BufferedParams},
    no_buffer::{NoBufferEstimate, NoBufferEstimator},
};

/// Error returned when an estimator is configured with a degenerate
/// parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The smoothing window must cover at least one slot.
    #[error("smoothing window must be at least 1 slot")]
    ZeroWindow,
    /// The bisection needs at least one iteration to move its bounds.
    #[error("capacity search needs at least 1 iteration")]
    ZeroIterations,
    /// A zero-length slot makes every per-slot bit budget zero.
    #[error("slot duration must be non-zero")]
    ZeroSlotTime,
}
