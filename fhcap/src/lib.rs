/*!
# Fronthaul link capacity planning

Answers "how big does each fronthaul link have to be" for a set of radio
cells: group the cells by link ([`TopologyInference`] when the wiring is
unknown), hand each link's traffic to the [`CapacityPlanner`] and read
the per-link figures off the [`CapacityReport`].

The numeric machinery lives in `fhcap-core`; this crate adds the per-link
orchestration, failure isolation and the report rendering.
*/

pub mod planner;
pub mod report;

// convenient re-export of the `fhcap_core` vocabulary
pub use fhcap_core::{
    BufferedEstimator, CellId, CellSignal, LinkGroup, LinkId, LossLimit, NoBufferEstimator,
    Percentile, Rate, SlotState, SlotTrace, TopologyInference, aggregate_link_traffic,
};

pub use self::{
    planner::{CapacityPlanner, CapacityPlannerBuilder, CellTraffic, LinkWorkload, PlanError},
    report::{CapacityEstimate, CapacityReport, CapacityReportBuilder, LinkRecord},
};
