//! Aggregation of per-cell traffic onto their shared link.

use crate::trace::{SlotTrace, TraceError};

/// Sum the per-cell traces of one link into a single link trace.
///
/// Cells may record slightly different lengths; the sum is truncated to the
/// shortest input so that every retained slot aggregates all cells.
/// Trailing slots beyond the shortest length are dropped rather than
/// zero-filled: zero-filling would silently understate aggregate load for
/// slots where some cells are simply missing data. The output slot index
/// restarts at 0.
///
/// # Example
///
/// ```
/// use fhcap_core::{SlotTrace, aggregate_link_traffic};
///
/// let a = SlotTrace::from_rates(vec![1.0, 2.0, 3.0]).unwrap();
/// let b = SlotTrace::from_rates(vec![4.0, 5.0]).unwrap();
/// let link = aggregate_link_traffic([&a, &b]).unwrap();
/// assert_eq!(link.as_slice(), &[5.0, 7.0]);
/// ```
///
/// # Errors
///
/// [`AggregateError::NoCells`] without any input and
/// [`AggregateError::EmptyTrace`] when the shortest input holds no slots;
/// a degenerate trace is never emitted. A sum overflowing to infinity
/// reports the offending slot as [`AggregateError::Trace`].
pub fn aggregate_link_traffic<'a>(
    cells: impl IntoIterator<Item = &'a SlotTrace>,
) -> Result<SlotTrace, AggregateError> {
    let cells: Vec<&SlotTrace> = cells.into_iter().collect();
    let Some(min_len) = cells.iter().map(|cell| cell.len()).min() else {
        return Err(AggregateError::NoCells);
    };
    if min_len == 0 {
        return Err(AggregateError::EmptyTrace);
    }

    let mut sums = vec![0.0_f64; min_len];
    for cell in cells {
        for (slot, value) in cell.as_slice()[..min_len].iter().enumerate() {
            sums[slot] += value;
        }
    }
    Ok(SlotTrace::from_rates(sums)?)
}

/// Error returned when a link group's traffic cannot be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum AggregateError {
    /// The link groups no cells at all.
    #[error("no cell traces to aggregate")]
    NoCells,
    /// The shortest cell trace holds no slots.
    #[error("the shortest cell trace is empty")]
    EmptyTrace,
    /// A slot sum is not a valid rate.
    #[error(transparent)]
    Trace(#[from] TraceError),
}
