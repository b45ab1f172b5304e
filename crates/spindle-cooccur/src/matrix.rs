//! Channel × channel co-occurrence matrix

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use spindle_core::nan::{nanmean_axis, ratio, Axis};
use spindle_core::Channels;
use spindle_overlap::SpindleGroup;

/// Distinct channel positions of each group, in channel order
///
/// Spindles on channels missing from `channels` are ignored.
pub(crate) fn group_members(channels: &Channels, groups: &[SpindleGroup]) -> Vec<Vec<usize>> {
    groups
        .iter()
        .map(|group| {
            let mut members: Vec<usize> = group
                .distinct_channels()
                .into_iter()
                .filter_map(|label| channels.position(label))
                .collect();
            members.sort_unstable();
            members
        })
        .collect()
}

/// Number of groups each channel takes part in
pub(crate) fn participation(n_channels: usize, members: &[Vec<usize>]) -> Vec<usize> {
    let mut n = vec![0usize; n_channels];
    for group in members {
        for &i in group {
            n[i] += 1;
        }
    }
    n
}

/// Source-normalized co-occurrence between channels
///
/// Entry `(i, j)` is the fraction of the groups containing channel `i` that
/// also contain channel `j`. The diagonal is NaN, as is every entry of a row
/// whose channel never appears in a group. The matrix is not symmetric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooccurrenceMatrix {
    labels: Vec<String>,
    values: DMatrix<f64>,
}

impl CooccurrenceMatrix {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    fn summarize(&self, axis: Axis) -> Vec<f64> {
        let n = self.len();
        // nalgebra stores column-major; the transpose's storage is row-major
        let row_major: Vec<f64> = self.values.transpose().as_slice().to_vec();
        nanmean_axis(&row_major, n, n, axis)
    }

    /// Per channel: NaN-aware mean of its row
    ///
    /// How reliably the other channels fire when this channel fires.
    pub fn source_summary(&self) -> Vec<f64> {
        self.summarize(Axis::Rows)
    }

    /// Per channel: NaN-aware mean of its column
    ///
    /// How reliably this channel fires when each of the others fires.
    pub fn target_summary(&self) -> Vec<f64> {
        self.summarize(Axis::Columns)
    }
}

/// Build the source-normalized co-occurrence matrix of `channels`
///
/// # Example
///
/// ```rust
/// use spindle_core::{Channels, Spindle, SpindleSet};
/// use spindle_cooccur::create_cooccurrence_matrix;
/// use spindle_overlap::group_spindles;
///
/// let channels = Channels::from_labels(["A", "B"]).unwrap();
/// let set = SpindleSet::new(vec![
///     Spindle::new("A", 0.0, 1.0),
///     Spindle::new("B", 0.5, 1.5),
///     Spindle::new("B", 5.0, 6.0),
/// ])
/// .unwrap();
/// let groups = group_spindles(&set).unwrap();
///
/// let m = create_cooccurrence_matrix(&channels, &groups);
/// assert_eq!(m.get(0, 1), 1.0); // every A group has B
/// assert_eq!(m.get(1, 0), 0.5); // half the B groups have A
/// assert!(m.get(0, 0).is_nan());
/// ```
#[instrument(skip_all, fields(n_channels = channels.len(), n_groups = groups.len()))]
pub fn create_cooccurrence_matrix(channels: &Channels, groups: &[SpindleGroup]) -> CooccurrenceMatrix {
    let n = channels.len();
    let members = group_members(channels, groups);

    let mut counts = DMatrix::<f64>::zeros(n, n);
    for group in &members {
        for &i in group {
            for &j in group {
                counts[(i, j)] += 1.0;
            }
        }
    }

    let mut values = DMatrix::from_element(n, n, f64::NAN);
    for i in 0..n {
        let own = counts[(i, i)];
        for j in 0..n {
            if i != j {
                values[(i, j)] = ratio(counts[(i, j)], own);
            }
        }
    }

    debug!("built co-occurrence matrix");
    CooccurrenceMatrix {
        labels: channels.labels().map(str::to_string).collect(),
        values,
    }
}
