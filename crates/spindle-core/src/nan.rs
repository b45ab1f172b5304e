//! NaN-aware reductions
//!
//! Degenerate statistics (a channel that never spindles, a ratio with a zero
//! denominator) are represented as NaN. These helpers skip NaN values and
//! return NaN only when nothing is left, so an undefined row never turns into
//! a fabricated zero.

use num_traits::Float;
use statrs::statistics::{Data, OrderStatistics};
use tracing::warn;

/// Reduction axis over a row-major matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Reduce across columns: one value per row
    Rows,
    /// Reduce across rows: one value per column
    Columns,
}

/// Mean of the non-NaN values
///
/// Returns NaN for empty or all-NaN input.
///
/// # Examples
///
/// ```rust
/// use spindle_core::nan::nanmean;
///
/// assert_eq!(nanmean(&[1.0, f64::NAN, 3.0]), 2.0);
/// assert!(nanmean::<f64>(&[f64::NAN]).is_nan());
/// ```
pub fn nanmean<T: Float>(data: &[T]) -> T {
    let (sum, n) = data
        .iter()
        .filter(|x| !x.is_nan())
        .fold((T::zero(), 0usize), |(s, n), &x| (s + x, n + 1));
    if n == 0 {
        return T::nan();
    }
    sum / T::from(n).unwrap_or_else(T::nan)
}

fn non_nan(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| !x.is_nan()).collect()
}

/// Median of the non-NaN values (mean of the two central values for even
/// counts)
pub fn nanmedian(data: &[f64]) -> f64 {
    let values = non_nan(data);
    if values.is_empty() {
        return f64::NAN;
    }
    Data::new(values).median()
}

/// Percentile with linear interpolation between closest ranks, `q` in
/// `[0, 100]`
pub fn percentile(data: &[f64], q: f64) -> f64 {
    let values = non_nan(data);
    if values.is_empty() || !(0.0..=100.0).contains(&q) {
        return f64::NAN;
    }
    let rank = q / 100.0 * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;

    // Order statistics are 1-based
    let mut data = Data::new(values);
    let below = data.order_statistic(lo + 1);
    let above = data.order_statistic(hi + 1);
    below + (above - below) * (rank - lo as f64)
}

/// NaN-aware mean of each row or column of a row-major `n_rows × n_cols`
/// matrix
///
/// Lanes that are entirely NaN come back as NaN. A single warning is emitted
/// per call when any such lane exists.
pub fn nanmean_axis(data: &[f64], n_rows: usize, n_cols: usize, axis: Axis) -> Vec<f64> {
    debug_assert_eq!(data.len(), n_rows * n_cols);
    let (n_lanes, lane_len) = match axis {
        Axis::Rows => (n_rows, n_cols),
        Axis::Columns => (n_cols, n_rows),
    };

    let mut lane = Vec::with_capacity(lane_len);
    let means: Vec<f64> = (0..n_lanes)
        .map(|l| {
            lane.clear();
            lane.extend((0..lane_len).map(|k| match axis {
                Axis::Rows => data[l * n_cols + k],
                Axis::Columns => data[k * n_cols + l],
            }));
            nanmean(&lane)
        })
        .collect();

    warn_undefined(&means, axis);
    means
}

/// Emit one warning if any lane of a reduction is undefined
pub fn warn_undefined(values: &[f64], axis: Axis) {
    let undefined = values.iter().filter(|v| v.is_nan()).count();
    if undefined > 0 {
        warn!(
            undefined,
            total = values.len(),
            ?axis,
            "mean of empty slice: lanes with only NaN values are undefined"
        );
    }
}

/// Divide, mapping a non-finite result (zero denominator) to NaN
///
/// ```rust
/// use spindle_core::nan::ratio;
///
/// assert_eq!(ratio(1.0, 4.0), 0.25);
/// assert!(ratio(0.0, 0.0).is_nan());
/// assert!(ratio(3.0, 0.0).is_nan());
/// ```
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        f64::NAN
    }
}
