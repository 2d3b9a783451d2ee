/*!
# Fronthaul capacity estimation

Estimates how much capacity a fronthaul link needs to carry its cells'
traffic without violating a loss target. Traffic arrives as per-slot rate
traces ([`SlotTrace`]), cells sharing a link are summed
([`aggregate_link_traffic`]) and two estimators answer the sizing
question: [`NoBufferEstimator`] reads a high percentile off the smoothed
trace, [`BufferedEstimator`] searches for the smallest rate whose
leaky-bucket replay stays within the loss limit.

The [`prepare`] module turns raw capture data into traces and loss
signals; [`topology`] recovers which cells share a link from correlated
loss when the wiring is unknown.
*/

pub mod aggregate;
pub mod cell;
pub mod defaults;
pub mod estimator;
pub mod link;
pub mod measure;
pub mod prepare;
pub mod snapshot;
pub mod topology;
pub mod trace;

pub use self::{
    aggregate::{AggregateError, aggregate_link_traffic},
    cell::CellId,
    estimator::{BufferedEstimator, NoBufferEstimator},
    link::{LinkGroup, LinkId},
    measure::{LossLimit, Percentile, Rate},
    snapshot::SlotState,
    topology::{CellSignal, TopologyInference},
    trace::{SlotTrace, TraceError},
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_then_estimate() {
        // Two cells on one link: a steady one and one that bursts every
        // fourth slot. The link must be sized for the sum.
        let steady = SlotTrace::from_rates(vec![1.0; 120]).unwrap();
        let bursty = SlotTrace::from_rates(
            (0..120)
                .map(|slot| if slot % 4 == 0 { 4.0 } else { 0.5 })
                .collect(),
        )
        .unwrap();

        let total = aggregate_link_traffic([&steady, &bursty]).unwrap();
        assert_eq!(total.len(), 120);

        let no_buffer = NoBufferEstimator::new().estimate(&total);
        let buffered = BufferedEstimator::new().estimate(&total);

        // The percentile bound can never undercut the smoothed average,
        // and a buffer only ever relaxes the requirement further.
        let average = no_buffer.average_traffic.gbps();
        assert!(no_buffer.required_capacity.gbps() >= 1.5);
        assert!(average > 1.5 && average < 3.0, "average {average}");
        assert!(buffered.required_capacity.gbps() <= no_buffer.required_capacity.gbps() * 1.2);
        assert!(buffered.required_capacity.gbps() > 0.0);
    }
}
