//! Dense design matrix and linear predictor.
//!
//! Turns simulated covariate columns and a coefficient vector into the
//! per-observation parameter vectors the samplers consume.

use crate::error::{require_same_len, Result, SamplingError};
use crate::link::Link;

/// Row-major `n × p` matrix of covariates.
///
/// # Examples
/// ```
/// use count_sampler::design::DesignMatrix;
/// use count_sampler::link::Link;
/// let x1 = vec![0.0, 0.5, 1.0];
/// let x = DesignMatrix::from_columns(&[x1]).unwrap().with_intercept();
/// assert_eq!(x.n_cols(), 2);
/// // η = 1 + 2·x1, λ = exp(η)
/// let lambda = x.mean_response(&[1.0, 2.0], Link::Log).unwrap();
/// assert!((lambda[1] - 2.0_f64.exp()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    n_rows: usize,
    n_cols: usize,
    data: Vec<f64>,
}

impl DesignMatrix {
    /// Builds a matrix from equally long covariate columns.
    ///
    /// # Errors
    /// `InvalidDesign` if there are no columns, no rows, columns of unequal
    /// length or non-finite entries.
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let n_cols = columns.len();
        if n_cols == 0 {
            return Err(SamplingError::InvalidDesign(
                "at least one covariate column is required".into(),
            ));
        }
        let n_rows = columns[0].len();
        if n_rows == 0 {
            return Err(SamplingError::InvalidDesign("columns must be non-empty".into()));
        }
        for (j, col) in columns.iter().enumerate() {
            if col.len() != n_rows {
                return Err(SamplingError::InvalidDesign(format!(
                    "column {j} has {} rows, expected {n_rows}",
                    col.len()
                )));
            }
            if col.iter().any(|v| !v.is_finite()) {
                return Err(SamplingError::InvalidDesign(format!(
                    "column {j} contains non-finite values"
                )));
            }
        }

        let mut data = Vec::with_capacity(n_rows * n_cols);
        for i in 0..n_rows {
            data.extend(columns.iter().map(|col| col[i]));
        }
        Ok(Self { n_rows, n_cols, data })
    }

    /// Builds a matrix from rows of equal width.
    ///
    /// # Errors
    /// `InvalidDesign` if the input is empty, ragged or non-finite.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if n_rows == 0 || n_cols == 0 {
            return Err(SamplingError::InvalidDesign(
                "design matrix must have at least one row and one column".into(),
            ));
        }
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(SamplingError::InvalidDesign(format!(
                    "row {i} has {} columns, expected {n_cols}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(SamplingError::InvalidDesign(format!(
                    "row {i} contains non-finite values"
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { n_rows, n_cols, data })
    }

    /// Prepends a column of ones (the intercept).
    pub fn with_intercept(self) -> Self {
        let n_cols = self.n_cols + 1;
        let mut data = Vec::with_capacity(self.n_rows * n_cols);
        for row in self.data.chunks_exact(self.n_cols) {
            data.push(1.0);
            data.extend_from_slice(row);
        }
        Self {
            n_rows: self.n_rows,
            n_cols,
            data,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Row `i` as a slice.
    ///
    /// # Panics
    /// If `i >= n_rows`.
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.n_cols;
        &self.data[start..start + self.n_cols]
    }

    /// Linear predictor `η = X·β`.
    ///
    /// # Errors
    /// `LengthMismatch` if `beta.len() != n_cols`, `InvalidParameter` if
    /// a coefficient is not finite.
    pub fn linear_predictor(&self, beta: &[f64]) -> Result<Vec<f64>> {
        require_same_len(self.n_cols, beta.len())?;
        if let Some(b) = beta.iter().find(|b| !b.is_finite()) {
            return Err(SamplingError::InvalidParameter(format!(
                "coefficients must be finite, got {b}"
            )));
        }
        Ok(self
            .data
            .chunks_exact(self.n_cols)
            .map(|row| row.iter().zip(beta).map(|(&x, &b)| x * b).sum())
            .collect())
    }

    /// Parameter vector `g⁻¹(X·β)` for the given link.
    pub fn mean_response(&self, beta: &[f64], link: Link) -> Result<Vec<f64>> {
        Ok(self
            .linear_predictor(beta)?
            .into_iter()
            .map(|eta| link.inverse(eta))
            .collect())
    }
}
