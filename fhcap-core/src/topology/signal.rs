use std::fmt;

/// Loss signals conditioned for correlation.
///
/// Raw per-slot loss ratios are too noisy and too long to correlate
/// directly. [`build`] truncates every cell's sequence to the common
/// length, averages non-overlapping windows into one point each and
/// z-scores the result so cells with different loss magnitudes still
/// compare by shape. A flat signal has no shape to compare; it z-scores
/// to all zeros rather than dividing by a zero deviation.
///
/// Rows are cells, columns are windows, storage is dense row-major.
///
/// [`build`]: SignalMatrix::build
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl SignalMatrix {
    /// Condition one loss signal per cell into a correlation-ready
    /// matrix.
    ///
    /// # Errors
    ///
    /// [`SignalError::NoSignals`] without any cells,
    /// [`SignalError::ZeroWindow`] for an empty window,
    /// [`SignalError::TooShort`] when the common length cannot fill one
    /// window and [`SignalError::InvalidSample`] on non-finite input.
    /// Negative samples are valid: counter skew legitimately produces
    /// them.
    pub fn build<S: AsRef<[f64]>>(signals: &[S], window: usize) -> Result<Self, SignalError> {
        if window == 0 {
            return Err(SignalError::ZeroWindow);
        }
        if signals.is_empty() {
            return Err(SignalError::NoSignals);
        }
        for (row, signal) in signals.iter().enumerate() {
            for (index, &value) in signal.as_ref().iter().enumerate() {
                if !value.is_finite() {
                    return Err(SignalError::InvalidSample { row, index, value });
                }
            }
        }

        let common = signals
            .iter()
            .map(|signal| signal.as_ref().len())
            .min()
            .unwrap_or(0);
        let cols = common / window;
        if cols == 0 {
            return Err(SignalError::TooShort {
                len: common,
                window,
            });
        }

        let mut data = Vec::with_capacity(signals.len() * cols);
        for signal in signals {
            let windowed: Vec<f64> = signal.as_ref()[..cols * window]
                .chunks(window)
                .map(|chunk| chunk.iter().sum::<f64>() / window as f64)
                .collect();
            data.extend(zscore(&windowed));
        }

        Ok(Self {
            rows: signals.len(),
            cols,
            data,
        })
    }

    /// Number of cells.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of windows per cell.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// One cell's conditioned signal.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }
}

// --- Display ---

impl fmt::Display for SignalMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cells x {} windows", self.rows, self.cols)
    }
}

/// Population z-score; all zeros when the deviation is 0.
fn zscore(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if variance == 0.0 {
        return vec![0.0; values.len()];
    }
    let deviation = variance.sqrt();
    values.iter().map(|v| (v - mean) / deviation).collect()
}

/// Error conditioning loss signals.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SignalError {
    /// No cells to condition.
    #[error("no loss signals to condition")]
    NoSignals,
    /// The window must cover at least one slot.
    #[error("the signal window must cover at least one slot")]
    ZeroWindow,
    /// The common signal length cannot fill a single window.
    #[error("signals share only {len} slots, shorter than one {window}-slot window")]
    TooShort {
        /// Common length across all cells, in slots.
        len: usize,
        /// Window length, in slots.
        window: usize,
    },
    /// A loss sample is not finite.
    #[error("cell row {row}, sample {index} is not finite: {value}")]
    InvalidSample {
        /// Row of the offending cell in the input.
        row: usize,
        /// Position of the offending sample.
        index: usize,
        /// The offending value.
        value: f64,
    },
}
