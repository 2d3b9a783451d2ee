mod loss_limit;
mod percentile;
mod rate;

pub use self::{
    loss_limit::{LossLimit, LossLimitError, LossLimitParseError},
    percentile::{Percentile, PercentileError},
    rate::{Rate, RateError, RateParseError},
};
