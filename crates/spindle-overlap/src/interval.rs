//! Closed-interval overlap relation
//!
//! Two intervals overlap when `start_i <= end_j && start_j <= end_i`, so
//! intervals that only touch at a boundary overlap. The relation is built once
//! in start-sorted order and stored as an upper-triangular boolean matrix with
//! a true diagonal; queries are symmetric.

use nalgebra::DMatrix;
use ordered_float::OrderedFloat;
use tracing::debug;

use spindle_core::{Error, Result};

/// Closed-interval intersection test
///
/// ```rust
/// use spindle_overlap::intervals_overlap;
///
/// assert!(intervals_overlap((0.0, 10.0), (10.0, 20.0)));
/// assert!(!intervals_overlap((0.0, 10.0), (10.5, 20.0)));
/// ```
pub fn intervals_overlap(a: (f64, f64), b: (f64, f64)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// Pairwise overlap of N intervals in start-sorted order
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapMatrix {
    /// `order[k]` is the input index of the k-th interval by start time
    order: Vec<usize>,
    /// Upper triangle (including the diagonal) in sorted positions
    matrix: DMatrix<bool>,
}

impl OverlapMatrix {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Input indices in start-sorted order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// The stored upper-triangular matrix
    pub fn as_matrix(&self) -> &DMatrix<bool> {
        &self.matrix
    }

    /// Whether sorted positions `i` and `j` overlap
    ///
    /// Symmetric; a position always overlaps itself.
    ///
    /// # Panics
    ///
    /// Panics if either position is out of bounds.
    pub fn overlaps(&self, i: usize, j: usize) -> bool {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        self.matrix[(lo, hi)]
    }

    /// Overlapping pairs `(i, j)` with `i < j`, in sorted positions
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.len();
        (0..n).flat_map(move |i| ((i + 1)..n).filter_map(move |j| self.matrix[(i, j)].then_some((i, j))))
    }

    /// Number of intervals each position overlaps, itself included
    pub fn overlap_counts(&self) -> Vec<usize> {
        let n = self.len();
        let mut counts = vec![0usize; n];
        for i in 0..n {
            for j in i..n {
                if self.matrix[(i, j)] {
                    counts[i] += 1;
                    if i != j {
                        counts[j] += 1;
                    }
                }
            }
        }
        counts
    }

    /// An interval overlapping nothing but itself
    pub fn is_isolated(&self, i: usize) -> bool {
        (0..self.len()).all(|j| j == i || !self.overlaps(i, j))
    }
}

/// Build the overlap relation of intervals `[starts[k], ends[k]]`
///
/// Intervals are stably sorted by start; the returned matrix is indexed by
/// sorted position and [`OverlapMatrix::order`] maps back to input indices.
///
/// # Errors
///
/// * `InvalidInput` when `starts` and `ends` differ in length
/// * `InvalidInterval` when a bound is not finite or `end <= start`
///
/// # Example
///
/// ```rust
/// use spindle_overlap::overlap_matrix;
///
/// let m = overlap_matrix(&[5.0, 0.0, 9.0], &[8.0, 6.0, 9.5]).unwrap();
/// assert_eq!(m.order(), &[1, 0, 2]);
/// assert!(m.overlaps(0, 1));
/// assert!(m.is_isolated(2));
/// assert_eq!(m.overlap_counts(), vec![2, 2, 1]);
/// ```
pub fn overlap_matrix(starts: &[f64], ends: &[f64]) -> Result<OverlapMatrix> {
    if starts.len() != ends.len() {
        return Err(Error::size_mismatch(starts.len(), ends.len(), "interval ends"));
    }
    for (k, (&s, &e)) in starts.iter().zip(ends).enumerate() {
        if !s.is_finite() || !e.is_finite() || e <= s {
            return Err(Error::invalid_interval(k, s, e));
        }
    }

    let n = starts.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&k| OrderedFloat(starts[k]));

    let mut matrix = DMatrix::from_element(n, n, false);
    let mut n_pairs = 0usize;
    for i in 0..n {
        matrix[(i, i)] = true;
        let end_i = ends[order[i]];
        for j in (i + 1)..n {
            // Later positions start no earlier than i, so the first one that
            // starts after i ends closes the scan.
            if starts[order[j]] > end_i {
                break;
            }
            matrix[(i, j)] = true;
            n_pairs += 1;
        }
    }

    debug!(n_intervals = n, n_pairs, "built overlap matrix");
    Ok(OverlapMatrix { order, matrix })
}
