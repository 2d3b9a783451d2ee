//! Per-link orchestration of the estimation pipeline.

use std::{collections::HashMap, thread, time::Duration};

use fhcap_core::{
    BufferedEstimator, CellId, LinkGroup, LinkId, NoBufferEstimator, SlotTrace,
    aggregate::AggregateError,
    aggregate_link_traffic,
    estimator::ConfigError,
    measure::{LossLimit, Percentile},
};

use crate::report::{CapacityEstimate, CapacityReport, CapacityReportBuilder};

/// One cell's traffic, assigned to a link.
#[derive(Debug, Clone, PartialEq)]
pub struct CellTraffic {
    /// The cell the trace was captured on.
    pub cell: CellId,
    /// The cell's per-slot traffic.
    pub trace: SlotTrace,
}

/// Everything one link has to carry.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkWorkload {
    /// The link under consideration.
    pub link: LinkId,
    /// The cells riding on it.
    pub cells: Vec<CellTraffic>,
}

/// Sizes a set of fronthaul links.
///
/// Each link is planned independently: its cell traces are summed and
/// both estimators run over the aggregate. Links are planned on scoped
/// worker threads, one per link, and a link that fails keeps its error in
/// the report without disturbing the others.
///
/// # Example
///
/// ```
/// use fhcap::{CapacityPlanner, CellTraffic, LinkWorkload};
/// use fhcap_core::{CellId, LinkId, SlotTrace};
///
/// let workload = LinkWorkload {
///     link: LinkId::new(1),
///     cells: vec![CellTraffic {
///         cell: CellId::new(7),
///         trace: SlotTrace::from_rates(vec![2.0; 100]).unwrap(),
///     }],
/// };
/// let report = CapacityPlanner::new().plan(&[workload]);
/// let estimate = report.rows()[0].outcome().unwrap();
/// assert_eq!(estimate.no_buffer_capacity.gbps(), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPlanner {
    no_buffer: NoBufferEstimator,
    buffered: BufferedEstimator,
}

impl CapacityPlanner {
    /// A planner with both estimators at their defaults.
    pub fn new() -> Self {
        Self {
            no_buffer: NoBufferEstimator::new(),
            buffered: BufferedEstimator::new(),
        }
    }

    /// Start configuring a planner.
    pub fn builder() -> CapacityPlannerBuilder {
        CapacityPlannerBuilder::new()
    }

    /// Plan every workload, one report row per link, in input order.
    pub fn plan(&self, workloads: &[LinkWorkload]) -> CapacityReport {
        let entries: Vec<(LinkId, Result<&LinkWorkload, PlanError>)> = workloads
            .iter()
            .map(|workload| (workload.link, Ok(workload)))
            .collect();
        self.run(&entries)
    }

    /// Plan inferred link groups against a pool of per-cell traces.
    ///
    /// Each group is stitched into a workload by looking its cells up in
    /// `traces`; a group referencing an unknown cell becomes an error row
    /// for that link and the other groups proceed.
    pub fn plan_groups(
        &self,
        groups: &[LinkGroup],
        traces: &HashMap<CellId, SlotTrace>,
    ) -> CapacityReport {
        let stitched: Vec<(LinkId, Result<LinkWorkload, PlanError>)> = groups
            .iter()
            .map(|group| {
                let cells = group
                    .cells()
                    .iter()
                    .map(|&cell| match traces.get(&cell) {
                        Some(trace) => Ok(CellTraffic {
                            cell,
                            trace: trace.clone(),
                        }),
                        None => Err(PlanError::MissingCell {
                            link: group.link(),
                            cell,
                        }),
                    })
                    .collect::<Result<Vec<CellTraffic>, PlanError>>();
                let workload = cells.map(|cells| LinkWorkload {
                    link: group.link(),
                    cells,
                });
                (group.link(), workload)
            })
            .collect();

        let entries: Vec<(LinkId, Result<&LinkWorkload, PlanError>)> = stitched
            .iter()
            .map(|(link, entry)| (*link, entry.as_ref().map_err(|&error| error)))
            .collect();
        self.run(&entries)
    }

    fn run(&self, entries: &[(LinkId, Result<&LinkWorkload, PlanError>)]) -> CapacityReport {
        let outcomes: Vec<(LinkId, Result<CapacityEstimate, PlanError>)> =
            thread::scope(|scope| {
                let handles: Vec<_> = entries
                    .iter()
                    .map(|&(link, entry)| {
                        let handle = scope.spawn(move || match entry {
                            Ok(workload) => self.plan_link(workload),
                            Err(error) => Err(error),
                        });
                        (link, handle)
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|(link, handle)| {
                        let outcome = handle
                            .join()
                            .unwrap_or_else(|_| Err(PlanError::WorkerPanicked { link }));
                        (link, outcome)
                    })
                    .collect()
            });

        let mut builder = CapacityReportBuilder::new();
        for (link, outcome) in outcomes {
            builder = match outcome {
                Ok(estimate) => builder.add_estimate(estimate),
                Err(error) => {
                    tracing::warn!(%link, %error, "link planning failed");
                    builder.add_failure(link, error)
                }
            };
        }
        builder.build()
    }

    fn plan_link(&self, workload: &LinkWorkload) -> Result<CapacityEstimate, PlanError> {
        let total = aggregate_link_traffic(workload.cells.iter().map(|cell| &cell.trace))?;
        let no_buffer = self.no_buffer.estimate(&total);
        let buffered = self.buffered.estimate(&total);
        tracing::info!(
            link = %workload.link,
            cells = workload.cells.len(),
            slots = total.len(),
            no_buffer_gbps = no_buffer.required_capacity.gbps(),
            buffered_gbps = buffered.required_capacity.gbps(),
            "sized link"
        );
        Ok(CapacityEstimate {
            link: workload.link,
            average_traffic: no_buffer.average_traffic,
            no_buffer_capacity: no_buffer.required_capacity,
            buffered_capacity: buffered.required_capacity,
            buffered_params: buffered.params,
        })
    }
}

impl Default for CapacityPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Configures a [`CapacityPlanner`].
///
/// The smoothing window applies to both estimators so their capacity
/// figures stay comparable; the remaining knobs each belong to one of
/// them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityPlannerBuilder {
    no_buffer: NoBufferEstimator,
    buffered: BufferedEstimator,
}

impl CapacityPlannerBuilder {
    /// Start from the estimator defaults.
    pub fn new() -> Self {
        Self {
            no_buffer: NoBufferEstimator::new(),
            buffered: BufferedEstimator::new(),
        }
    }

    /// Smoothing window for both estimators, in slots.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroWindow`] when `window` is 0.
    pub fn smoothing_window(mut self, window: usize) -> Result<Self, ConfigError> {
        self.no_buffer = self.no_buffer.with_window(window)?;
        self.buffered = self.buffered.with_window(window)?;
        Ok(self)
    }

    /// Percentile for the no-buffer capacity figure.
    pub fn loss_percentile(mut self, percentile: Percentile) -> Self {
        self.no_buffer = self.no_buffer.with_percentile(percentile);
        self
    }

    /// Tolerated loss ratio for the buffered search.
    pub fn loss_limit(mut self, loss_limit: LossLimit) -> Self {
        self.buffered = self.buffered.with_loss_limit(loss_limit);
        self
    }

    /// Slot duration for the buffered simulation.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroSlotTime`] when `slot_time` is zero.
    pub fn slot_time(mut self, slot_time: Duration) -> Result<Self, ConfigError> {
        self.buffered = self.buffered.with_slot_time(slot_time)?;
        Ok(self)
    }

    /// Buffer margin for the buffered simulation.
    pub fn buffer_time(mut self, buffer_time: Duration) -> Self {
        self.buffered = self.buffered.with_buffer_time(buffer_time);
        self
    }

    /// Bisection iteration count for the buffered search.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroIterations`] when `iterations` is 0.
    pub fn search_iterations(mut self, iterations: u32) -> Result<Self, ConfigError> {
        self.buffered = self.buffered.with_iterations(iterations)?;
        Ok(self)
    }

    /// Finish the configuration.
    pub fn build(self) -> CapacityPlanner {
        CapacityPlanner {
            no_buffer: self.no_buffer,
            buffered: self.buffered,
        }
    }
}

impl Default for CapacityPlannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Error planning one link.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// The link's traces could not be aggregated.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    /// A link group references a cell with no trace in the pool.
    #[error("link {link} has no trace for cell {cell}")]
    MissingCell {
        /// The link whose group is incomplete.
        link: LinkId,
        /// The cell without a trace.
        cell: CellId,
    },
    /// A worker thread panicked while planning this link.
    #[error("worker for link {link} panicked")]
    WorkerPanicked {
        /// The link the worker was planning.
        link: LinkId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(rates: Vec<f64>) -> SlotTrace {
        SlotTrace::from_rates(rates).unwrap()
    }

    fn workload(link: u64, cells: Vec<(u64, Vec<f64>)>) -> LinkWorkload {
        LinkWorkload {
            link: LinkId::new(link),
            cells: cells
                .into_iter()
                .map(|(cell, rates)| CellTraffic {
                    cell: CellId::new(cell),
                    trace: trace(rates),
                })
                .collect(),
        }
    }

    #[test]
    fn plans_every_link_in_input_order() {
        let planner = CapacityPlanner::new();
        let report = planner.plan(&[
            workload(5, vec![(1, vec![1.0; 100]), (2, vec![2.0; 100])]),
            workload(2, vec![(3, vec![4.0; 100])]),
            workload(9, vec![(4, vec![0.5; 100])]),
        ]);

        let links: Vec<LinkId> = report.rows().iter().map(|row| row.link()).collect();
        assert_eq!(links, vec![LinkId::new(5), LinkId::new(2), LinkId::new(9)]);

        let first = report.rows()[0].outcome().unwrap();
        assert_eq!(first.average_traffic.gbps(), 3.0);
        assert_eq!(first.no_buffer_capacity.gbps(), 3.0);
        assert_eq!(first.buffered_capacity.gbps(), 3.0);
    }

    #[test]
    fn one_failing_link_does_not_disturb_the_others() {
        let planner = CapacityPlanner::new();
        let report = planner.plan(&[
            workload(1, vec![(1, vec![1.0; 100])]),
            workload(2, vec![]),
            workload(3, vec![(2, vec![2.0; 100])]),
        ]);

        assert!(report.rows()[0].outcome().is_ok());
        assert_eq!(
            report.rows()[1].outcome().unwrap_err(),
            &PlanError::Aggregate(AggregateError::NoCells)
        );
        let third = report.rows()[2].outcome().unwrap();
        assert_eq!(third.no_buffer_capacity.gbps(), 2.0);
    }

    #[test]
    fn plan_groups_stitches_traces_by_cell() {
        let groups = [
            LinkGroup::new(LinkId::new(1), vec![CellId::new(1), CellId::new(2)]),
            LinkGroup::new(LinkId::new(2), vec![CellId::new(3)]),
        ];
        let traces = HashMap::from([
            (CellId::new(1), trace(vec![1.0; 100])),
            (CellId::new(2), trace(vec![2.0; 100])),
            (CellId::new(3), trace(vec![5.0; 100])),
        ]);

        let report = CapacityPlanner::new().plan_groups(&groups, &traces);
        assert_eq!(report.len(), 2);
        let first = report.rows()[0].outcome().unwrap();
        let second = report.rows()[1].outcome().unwrap();
        assert_eq!(first.no_buffer_capacity.gbps(), 3.0);
        assert_eq!(second.no_buffer_capacity.gbps(), 5.0);
    }

    #[test]
    fn plan_groups_reports_the_first_missing_cell() {
        let groups = [
            LinkGroup::new(
                LinkId::new(7),
                vec![CellId::new(1), CellId::new(99), CellId::new(98)],
            ),
            LinkGroup::new(LinkId::new(8), vec![CellId::new(2)]),
        ];
        let traces = HashMap::from([
            (CellId::new(1), trace(vec![1.0; 100])),
            (CellId::new(2), trace(vec![2.0; 100])),
        ]);

        let report = CapacityPlanner::new().plan_groups(&groups, &traces);
        assert_eq!(
            report.rows()[0].outcome().unwrap_err(),
            &PlanError::MissingCell {
                link: LinkId::new(7),
                cell: CellId::new(99)
            }
        );
        assert!(report.rows()[1].outcome().is_ok());
    }

    #[test]
    fn empty_plan_is_an_empty_report() {
        let report = CapacityPlanner::new().plan(&[]);
        assert!(report.is_empty());
    }

    #[test]
    fn reports_are_deterministic_across_runs() {
        let workloads = [
            workload(1, vec![(1, vec![1.0; 200]), (2, vec![0.5; 150])]),
            workload(2, vec![(3, vec![3.0; 200])]),
        ];
        let planner = CapacityPlanner::new();
        assert_eq!(
            planner.plan(&workloads).to_string(),
            planner.plan(&workloads).to_string()
        );
    }

    #[test]
    fn builder_configures_both_estimators() {
        let planner = CapacityPlanner::builder()
            .smoothing_window(5)
            .unwrap()
            .loss_percentile(Percentile::new(95.0).unwrap())
            .loss_limit(LossLimit::new(0.02).unwrap())
            .buffer_time(Duration::from_micros(250))
            .search_iterations(20)
            .unwrap()
            .build();

        assert_eq!(planner.no_buffer.window(), 5);
        assert_eq!(planner.buffered.window(), 5);
        assert_eq!(planner.buffered.loss_limit(), LossLimit::new(0.02).unwrap());
        assert_eq!(planner.buffered.buffer_time(), Duration::from_micros(250));
        assert_eq!(planner.buffered.iterations(), 20);
    }

    #[test]
    fn builder_rejects_degenerate_windows() {
        assert_eq!(
            CapacityPlanner::builder().smoothing_window(0).unwrap_err(),
            ConfigError::ZeroWindow
        );
        assert_eq!(
            CapacityPlanner::builder().search_iterations(0).unwrap_err(),
            ConfigError::ZeroIterations
        );
    }
}
