/// Pairwise Pearson correlation between cell signals.
///
/// Symmetric with a unit diagonal. A zero-variance signal has no shape to
/// correlate and scores 0 against every other cell instead of poisoning
/// the matrix with NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    cells: usize,
    data: Vec<f64>,
}

impl CorrelationMatrix {
    /// Correlate every pair of rows.
    pub fn of<S: AsRef<[f64]>>(rows: &[S]) -> Self {
        let cells = rows.len();
        let mut data = vec![0.0; cells * cells];
        for a in 0..cells {
            data[a * cells + a] = 1.0;
            for b in a + 1..cells {
                let r = pearson(rows[a].as_ref(), rows[b].as_ref());
                data[a * cells + b] = r;
                data[b * cells + a] = r;
            }
        }
        Self { cells, data }
    }

    /// Number of cells on each axis.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Correlation between two cells, in `[-1, 1]`.
    pub fn between(&self, a: usize, b: usize) -> f64 {
        self.data[a * self.cells + b]
    }
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let (a, b) = (&a[..len], &b[..len]);
    let n = len as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }
    if variance_a == 0.0 || variance_b == 0.0 {
        return 0.0;
    }
    (covariance / (variance_a * variance_b).sqrt()).clamp(-1.0, 1.0)
}
