//! The per-link capacity summary.

use std::fmt;

use fhcap_core::{LinkId, Rate, estimator::BufferedParams};

use crate::planner::PlanError;

/// Sized capacity figures for one link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityEstimate {
    /// The link the figures are for.
    pub link: LinkId,
    /// Mean rate over the link's traffic-bearing slots.
    pub average_traffic: Rate,
    /// Capacity required without any buffering.
    pub no_buffer_capacity: Rate,
    /// Capacity required with the buffer margin in `buffered_params`.
    pub buffered_capacity: Rate,
    /// Parameter set the buffered figure was searched with.
    pub buffered_params: BufferedParams,
}

/// One report row: a link and how planning it went.
///
/// A link that could not be planned keeps its error here; it never
/// disappears from the report and never shows up as a zero-capacity
/// estimate.
#[derive(Debug, Clone)]
pub struct LinkRecord {
    link: LinkId,
    outcome: Result<CapacityEstimate, PlanError>,
}

impl LinkRecord {
    /// The link this row is about.
    pub fn link(&self) -> LinkId {
        self.link
    }

    /// The estimate, or the error that prevented one.
    pub fn outcome(&self) -> Result<&CapacityEstimate, &PlanError> {
        self.outcome.as_ref()
    }
}

/// Capacity figures for a set of links, in planning order.
///
/// Renders as an aligned table; failed links render their error text in
/// place of the figures.
#[derive(Debug, Clone, Default)]
pub struct CapacityReport {
    rows: Vec<LinkRecord>,
}

impl CapacityReport {
    /// All rows, in the order they were planned.
    pub fn rows(&self) -> &[LinkRecord] {
        &self.rows
    }

    /// The row for one link, if it was planned.
    pub fn get(&self, link: LinkId) -> Option<&LinkRecord> {
        self.rows.iter().find(|row| row.link == link)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` for a report without any rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The successful estimates, in planning order.
    pub fn estimates(&self) -> impl Iterator<Item = &CapacityEstimate> {
        self.rows.iter().filter_map(|row| row.outcome.as_ref().ok())
    }

    /// The failed links and their errors, in planning order.
    pub fn failures(&self) -> impl Iterator<Item = (LinkId, &PlanError)> {
        self.rows
            .iter()
            .filter_map(|row| row.outcome.as_ref().err().map(|error| (row.link, error)))
    }
}

/// Collects per-link outcomes into a [`CapacityReport`].
///
/// # Example
///
/// ```
/// use fhcap::{CapacityReportBuilder, LinkId, PlanError};
/// use fhcap_core::AggregateError;
///
/// let report = CapacityReportBuilder::new()
///     .add_failure(LinkId::new(4), PlanError::Aggregate(AggregateError::NoCells))
///     .build();
/// assert_eq!(report.len(), 1);
/// assert_eq!(report.failures().count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CapacityReportBuilder {
    rows: Vec<LinkRecord>,
}

impl CapacityReportBuilder {
    /// Start an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successfully planned link.
    pub fn add_estimate(mut self, estimate: CapacityEstimate) -> Self {
        self.rows.push(LinkRecord {
            link: estimate.link,
            outcome: Ok(estimate),
        });
        self
    }

    /// Append a link that could not be planned.
    pub fn add_failure(mut self, link: LinkId, error: PlanError) -> Self {
        self.rows.push(LinkRecord {
            link,
            outcome: Err(error),
        });
        self
    }

    /// Finish the report, keeping insertion order.
    pub fn build(self) -> CapacityReport {
        CapacityReport { rows: self.rows }
    }
}

// --- Display ---

impl fmt::Display for CapacityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>4}  {:>10}  {:>14}  {:>13}",
            "link", "avg_gbps", "no_buffer_gbps", "buffered_gbps"
        )?;
        for row in &self.rows {
            match &row.outcome {
                Ok(estimate) => writeln!(
                    f,
                    "{:>4}  {:>10.3}  {:>14.3}  {:>13.3}",
                    row.link,
                    estimate.average_traffic.gbps(),
                    estimate.no_buffer_capacity.gbps(),
                    estimate.buffered_capacity.gbps(),
                )?,
                Err(error) => writeln!(f, "{:>4}  error: {error}", row.link)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use fhcap_core::{BufferedEstimator, CellId};

    use super::*;

    fn estimate(link: u64, average: f64, no_buffer: f64, buffered: f64) -> CapacityEstimate {
        CapacityEstimate {
            link: LinkId::new(link),
            average_traffic: Rate::new(average).unwrap(),
            no_buffer_capacity: Rate::new(no_buffer).unwrap(),
            buffered_capacity: Rate::new(buffered).unwrap(),
            buffered_params: BufferedEstimator::new().params(),
        }
    }

    #[test]
    fn rows_keep_insertion_order() {
        let report = CapacityReportBuilder::new()
            .add_estimate(estimate(5, 1.0, 2.0, 1.5))
            .add_failure(
                LinkId::new(2),
                PlanError::MissingCell {
                    link: LinkId::new(2),
                    cell: CellId::new(7),
                },
            )
            .add_estimate(estimate(9, 3.0, 4.0, 3.5))
            .build();

        let links: Vec<LinkId> = report.rows().iter().map(LinkRecord::link).collect();
        assert_eq!(links, vec![LinkId::new(5), LinkId::new(2), LinkId::new(9)]);
        assert_eq!(report.len(), 3);
        assert_eq!(report.estimates().count(), 2);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn failed_links_stay_visible() {
        let error = PlanError::MissingCell {
            link: LinkId::new(2),
            cell: CellId::new(7),
        };
        let report = CapacityReportBuilder::new()
            .add_failure(LinkId::new(2), error)
            .build();

        let row = report.get(LinkId::new(2)).unwrap();
        assert_eq!(row.outcome().unwrap_err(), &error);
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures, vec![(LinkId::new(2), &error)]);
    }

    #[test]
    fn renders_an_aligned_table() {
        let report = CapacityReportBuilder::new()
            .add_estimate(estimate(1, 2.375, 9.5, 5.25))
            .add_failure(
                LinkId::new(2),
                PlanError::MissingCell {
                    link: LinkId::new(2),
                    cell: CellId::new(7),
                },
            )
            .build();

        let expected = "\
link    avg_gbps  no_buffer_gbps  buffered_gbps
   1       2.375           9.500          5.250
   2  error: link 2 has no trace for cell 7
";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn empty_report_is_just_the_header() {
        let report = CapacityReportBuilder::new().build();
        assert!(report.is_empty());
        assert_eq!(
            report.to_string(),
            "link    avg_gbps  no_buffer_gbps  buffered_gbps\n"
        );
    }

    #[test]
    fn lookup_by_link_id() {
        let report = CapacityReportBuilder::new()
            .add_estimate(estimate(3, 1.0, 1.0, 1.0))
            .build();
        assert!(report.get(LinkId::new(3)).is_some());
        assert!(report.get(LinkId::new(4)).is_none());
    }
}
