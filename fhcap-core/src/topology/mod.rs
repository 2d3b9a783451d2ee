//! Which cells share a fronthaul link.
//!
//! Cells on the same physical link lose packets together: congestion
//! happens on the link, not in the cell. Conditioning each cell's loss
//! series ([`SignalMatrix`]), correlating the shapes
//! ([`CorrelationMatrix`]) and clustering on `1 - r` recovers the
//! physical grouping without any knowledge of the wiring.

mod cluster;
mod correlation;
mod signal;

pub use self::{
    correlation::CorrelationMatrix,
    signal::{SignalError, SignalMatrix},
};

use crate::{
    cell::CellId,
    defaults::{DEFAULT_LINK_COUNT, DEFAULT_SIGNAL_WINDOW},
    link::{LinkGroup, LinkId},
};

/// One cell's per-slot loss-ratio series, the raw input to topology
/// inference.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSignal {
    /// The cell the series was measured on.
    pub cell: CellId,
    /// Per-slot loss ratios, in slot order.
    pub samples: Vec<f64>,
}

/// Infers the cell-to-link grouping from correlated loss.
///
/// # Example
///
/// ```
/// use fhcap_core::{CellId, CellSignal, TopologyInference};
///
/// // Cells 7 and 9 lose together, cell 8 loses on its own schedule.
/// let bursty = |phase: usize| -> Vec<f64> {
///     (0..200).map(|i| if (i / 50) % 2 == phase { 0.3 } else { 0.0 }).collect()
/// };
/// let groups = TopologyInference::new()
///     .with_links(2)
///     .unwrap()
///     .infer(&[
///         CellSignal { cell: CellId::new(7), samples: bursty(0) },
///         CellSignal { cell: CellId::new(8), samples: bursty(1) },
///         CellSignal { cell: CellId::new(9), samples: bursty(0) },
///     ])
///     .unwrap();
/// assert_eq!(groups[0].cells(), &[CellId::new(7), CellId::new(9)]);
/// assert_eq!(groups[1].cells(), &[CellId::new(8)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyInference {
    window: usize,
    links: usize,
}

impl TopologyInference {
    /// Create an inference with the conventional defaults: 50-slot signal
    /// windows and 3 links.
    pub fn new() -> Self {
        Self {
            window: DEFAULT_SIGNAL_WINDOW,
            links: DEFAULT_LINK_COUNT,
        }
    }

    /// Replace the signal window, in slots.
    ///
    /// # Errors
    ///
    /// [`SignalError::ZeroWindow`] when `window` is 0.
    pub fn with_window(mut self, window: usize) -> Result<Self, TopologyError> {
        if window == 0 {
            return Err(SignalError::ZeroWindow.into());
        }
        self.window = window;
        Ok(self)
    }

    /// Replace the number of links to split the cells across.
    ///
    /// # Errors
    ///
    /// [`TopologyError::ZeroLinks`] when `links` is 0.
    pub fn with_links(mut self, links: usize) -> Result<Self, TopologyError> {
        if links == 0 {
            return Err(TopologyError::ZeroLinks);
        }
        self.links = links;
        Ok(self)
    }

    /// The signal window, in slots.
    pub fn window(&self) -> usize {
        self.window
    }

    /// The number of links to split the cells across.
    pub fn links(&self) -> usize {
        self.links
    }

    /// Group the cells onto links by the shape of their loss.
    ///
    /// Links are numbered from 1 in order of first cell appearance and
    /// each group lists its cells in input order.
    ///
    /// # Errors
    ///
    /// [`TopologyError::NoCells`] without input,
    /// [`TopologyError::NotEnoughCells`] when the cells cannot fill the
    /// requested links and [`TopologyError::Signal`] when the loss series
    /// cannot be conditioned.
    pub fn infer(&self, cells: &[CellSignal]) -> Result<Vec<LinkGroup>, TopologyError> {
        if cells.is_empty() {
            return Err(TopologyError::NoCells);
        }
        if cells.len() < self.links {
            return Err(TopologyError::NotEnoughCells {
                cells: cells.len(),
                links: self.links,
            });
        }

        let series: Vec<&[f64]> = cells.iter().map(|cell| cell.samples.as_slice()).collect();
        let signals = SignalMatrix::build(&series, self.window)?;

        let rows: Vec<&[f64]> = (0..signals.rows()).map(|row| signals.row(row)).collect();
        let correlation = CorrelationMatrix::of(&rows);

        let distance: Vec<Vec<f64>> = (0..correlation.cells())
            .map(|a| {
                (0..correlation.cells())
                    .map(|b| 1.0 - correlation.between(a, b))
                    .collect()
            })
            .collect();

        let labels = cluster::average_linkage_labels(distance, self.links);

        let groups = (0..self.links)
            .map(|label| {
                let members = cells
                    .iter()
                    .zip(&labels)
                    .filter(|&(_, &cell_label)| cell_label == label)
                    .map(|(cell, _)| cell.cell)
                    .collect();
                LinkGroup::new(LinkId::new(label as u64 + 1), members)
            })
            .collect();

        tracing::debug!(
            cells = cells.len(),
            links = self.links,
            window = self.window,
            "clustered cells into link groups"
        );

        Ok(groups)
    }
}

impl Default for TopologyInference {
    fn default() -> Self {
        Self::new()
    }
}

/// Error inferring the cell-to-link topology.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TopologyError {
    /// No cell signals at all.
    #[error("no cell signals to infer a topology from")]
    NoCells,
    /// Fewer cells than links to fill.
    #[error("cannot split {cells} cells across {links} links")]
    NotEnoughCells {
        /// Number of cells offered.
        cells: usize,
        /// Number of links requested.
        links: usize,
    },
    /// At least one link is needed.
    #[error("the topology needs at least one link")]
    ZeroLinks,
    /// The loss series could not be conditioned.
    #[error(transparent)]
    Signal(#[from] SignalError),
}
