//! Per-channel ratios over group memberships

use tracing::instrument;

use spindle_core::nan::{ratio, warn_undefined, Axis};
use spindle_core::Channels;
use spindle_overlap::SpindleGroup;

use crate::matrix::{create_cooccurrence_matrix, group_members, participation};

/// Threshold-count ratio per channel
///
/// For every group containing the channel, the threshold is met when the
/// group holds at least `k` *other* distinct channels. The value is
/// `met / (met + not_met)`, NaN for a channel that is in no group.
///
/// # Example
///
/// ```rust
/// use spindle_core::{Channels, Spindle};
/// use spindle_cooccur::cooccur_likelihood;
/// use spindle_overlap::SpindleGroup;
///
/// let channels = Channels::from_labels(["A", "B", "C"]).unwrap();
/// let groups = vec![
///     SpindleGroup::new(vec![Spindle::new("A", 0.0, 1.0), Spindle::new("B", 0.5, 1.0)]),
///     SpindleGroup::new(vec![Spindle::new("A", 3.0, 4.0)]),
/// ];
///
/// let p = cooccur_likelihood(&channels, &groups, 1);
/// assert_eq!(p[0], 0.5);
/// assert_eq!(p[1], 1.0);
/// assert!(p[2].is_nan());
/// ```
#[instrument(skip(channels, groups), fields(n_channels = channels.len(), n_groups = groups.len()))]
pub fn cooccur_likelihood(channels: &Channels, groups: &[SpindleGroup], k: usize) -> Vec<f64> {
    let members = group_members(channels, groups);
    let n = channels.len();
    let mut met = vec![0usize; n];
    let total = participation(n, &members);

    for group in &members {
        let others = group.len().saturating_sub(1);
        if others >= k {
            for &i in group {
                met[i] += 1;
            }
        }
    }

    let values: Vec<f64> = met
        .iter()
        .zip(&total)
        .map(|(&m, &t)| ratio(m as f64, t as f64))
        .collect();
    warn_undefined(&values, Axis::Rows);
    values
}

/// Exclusive ratio per channel
///
/// For each other channel `j`, the fraction of channel `i`'s groups that also
/// contain `j`; averaged over `j`. NaN for a channel that is in no group.
///
/// This is the row mean of the source-normalized matrix, so it equals
/// [`CooccurrenceMatrix::source_summary`](crate::CooccurrenceMatrix::source_summary).
pub fn ratio_spindles_with_chan(channels: &Channels, groups: &[SpindleGroup]) -> Vec<f64> {
    create_cooccurrence_matrix(channels, groups).source_summary()
}
