//! Log-ratio asymmetry of lead/follow counts

use nalgebra::DMatrix;

use spindle_core::nan::{nanmean, warn_undefined, Axis};

/// `c[a, b] = ln(x[a, b] / x[b, a])`
///
/// Entries where the ratio is not finite (either count zero) are NaN, as is
/// the diagonal.
pub fn log_ratio_matrix(x: &DMatrix<f64>) -> DMatrix<f64> {
    let r = x.nrows();
    DMatrix::from_fn(r, r, |a, b| {
        if a == b {
            return f64::NAN;
        }
        let c = (x[(a, b)] / x[(b, a)]).ln();
        if c.is_finite() {
            c
        } else {
            f64::NAN
        }
    })
}

/// Row means of [`log_ratio_matrix`] without logging
pub(crate) fn scores_quiet(x: &DMatrix<f64>) -> Vec<f64> {
    let c = log_ratio_matrix(x);
    (0..c.nrows())
        .map(|a| {
            let row: Vec<f64> = c.row(a).iter().copied().collect();
            nanmean(&row)
        })
        .collect()
}

/// Asymmetry score per region: `d[r] = nanmean(c[r, :])`
///
/// Positive scores mean the region tends to lead. A region with no defined
/// ratio against any other region scores NaN.
///
/// ```rust
/// use nalgebra::DMatrix;
/// use spindle_direction::asymmetry_scores;
///
/// let x = DMatrix::from_row_slice(2, 2, &[0.0, 4.0, 1.0, 0.0]);
/// let d = asymmetry_scores(&x);
/// assert!((d[0] - 4.0f64.ln()).abs() < 1e-12);
/// assert!((d[1] + 4.0f64.ln()).abs() < 1e-12);
/// ```
pub fn asymmetry_scores(x: &DMatrix<f64>) -> Vec<f64> {
    let d = scores_quiet(x);
    warn_undefined(&d, Axis::Rows);
    d
}
