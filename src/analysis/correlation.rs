//! Pearson correlation between measures.
//!
//! The matrix is computed as a normalized Gram matrix of the centered data:
//!
//! ```text
//! C = Xcᵀ Xc,   corr(i, j) = C[i,j] / sqrt(C[i,i] · C[j,j])
//! ```
//!
//! A zero-variance column has no defined correlation, so its row and column
//! (diagonal included) are NaN.

use nalgebra::DMatrix;
use serde::Serialize;

use crate::data::table::SalesTable;
use crate::domain::Measure;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub measures: Vec<Measure>,
    /// Row-major `k × k` values.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Measure, b: Measure) -> Option<f64> {
        let i = self.measures.iter().position(|&m| m == a)?;
        let j = self.measures.iter().position(|&m| m == b)?;
        Some(self.values[i][j])
    }
}

pub fn correlation_matrix(table: &SalesTable, measures: &[Measure]) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = measures.iter().map(|&m| table.column(m)).collect();
    CorrelationMatrix {
        measures: measures.to_vec(),
        values: pearson(&columns),
    }
}

/// Pearson correlation of equally sized columns.
pub fn pearson(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = columns.len();
    let n = columns.first().map(|c| c.len()).unwrap_or(0);
    if n < 2 || columns.iter().any(|c| c.len() != n) {
        return vec![vec![f64::NAN; k]; k];
    }

    let x = DMatrix::from_fn(n, k, |i, j| columns[j][i]);
    let means: Vec<f64> = (0..k).map(|j| x.column(j).mean()).collect();
    let centered = DMatrix::from_fn(n, k, |i, j| x[(i, j)] - means[j]);
    let gram = centered.transpose() * &centered;

    (0..k)
        .map(|i| {
            (0..k)
                .map(|j| {
                    let denom = (gram[(i, i)] * gram[(j, j)]).sqrt();
                    if denom > 0.0 && denom.is_finite() {
                        (gram[(i, j)] / denom).clamp(-1.0, 1.0)
                    } else {
                        f64::NAN
                    }
                })
                .collect()
        })
        .collect()
}
