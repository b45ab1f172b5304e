//! Region contrasts for the mixed-model fit
//!
//! The first row estimates the grand mean (`1/n` per region). Row `r + 1`
//! compares region `r` against the average of all other regions, so its
//! estimate plus the intercept is the region's own coefficient.

use nalgebra::DMatrix;
use std::collections::BTreeMap;

use crate::{Error, Result};

/// Label of the grand-mean row
pub const INTERCEPT: &str = "intercept";

/// Contrast matrix with labelled rows
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastMatrix {
    row_labels: Vec<String>,
    matrix: DMatrix<f64>,
}

impl ContrastMatrix {
    /// Contrasts for `regions`, one column per region in the given order
    ///
    /// ```rust
    /// use spindle_polars::ContrastMatrix;
    ///
    /// let regions = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    /// let contrasts = ContrastMatrix::new(&regions).unwrap();
    /// let m = contrasts.as_matrix();
    /// assert_eq!(m.shape(), (4, 3));
    /// assert_eq!(m[(0, 1)], 1.0 / 3.0);
    /// assert_eq!(m[(2, 1)], 1.0);
    /// assert_eq!(m[(2, 0)], -0.5);
    /// assert_eq!(contrasts.row_labels()[0], "intercept");
    /// ```
    pub fn new(regions: &[String]) -> Result<Self> {
        let n = regions.len();
        if n < 2 {
            return Err(Error::InvalidInput(format!(
                "contrasts need at least two regions, got {n}"
            )));
        }
        let others = -1.0 / (n - 1) as f64;
        let matrix = DMatrix::from_fn(n + 1, n, |row, col| match row {
            0 => 1.0 / n as f64,
            r if r - 1 == col => 1.0,
            _ => others,
        });
        let row_labels = std::iter::once(INTERCEPT.to_string())
            .chain(regions.iter().cloned())
            .collect();
        Ok(Self { row_labels, matrix })
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Region names, without the intercept row
    pub fn regions(&self) -> &[String] {
        &self.row_labels[1..]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Apply the contrasts to per-region estimates, keyed by row label
    pub fn estimate(&self, region_estimates: &[f64]) -> Result<BTreeMap<String, f64>> {
        if region_estimates.len() != self.matrix.ncols() {
            return Err(spindle_core::Error::size_mismatch(
                self.matrix.ncols(),
                region_estimates.len(),
                "region estimates",
            )
            .into());
        }
        let estimates = &self.matrix * nalgebra::DVector::from_column_slice(region_estimates);
        Ok(self
            .row_labels
            .iter()
            .cloned()
            .zip(estimates.iter().copied())
            .collect())
    }
}

/// Fold the intercept estimate back into every region's contrast
///
/// The `intercept` entry is removed.
pub fn add_intercept(mut coefficients: BTreeMap<String, f64>) -> Result<BTreeMap<String, f64>> {
    let intercept = coefficients
        .remove(INTERCEPT)
        .ok_or_else(|| Error::IncompleteFit("no intercept estimate".to_string()))?;
    for value in coefficients.values_mut() {
        *value += intercept;
    }
    Ok(coefficients)
}
