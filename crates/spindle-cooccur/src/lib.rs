//! Co-occurrence statistics over spindle groups
//!
//! Every statistic here reduces the spindle groups of one recording to one
//! value per channel, in the order of the [`Channels`](spindle_core::Channels)
//! passed in. Channels that never take part in a group get NaN, never 0.
//!
//! | Mode | Function |
//! |------|----------|
//! | source-normalized | [`CooccurrenceMatrix::source_summary`] |
//! | target-normalized | [`CooccurrenceMatrix::target_summary`] |
//! | threshold count (`cooccurNN`) | [`cooccur_likelihood`] |
//! | exclusive ratio | [`ratio_spindles_with_chan`] |
//! | instantaneous multiplicity | [`count_cooccur_per_chan`] |

pub mod config;
pub mod matrix;
pub mod multiplicity;
pub mod profile;
pub mod ratios;
pub mod single_channel;

pub use config::{Normalization, SpindleParam, Summarize};
pub use matrix::{create_cooccurrence_matrix, CooccurrenceMatrix};
pub use multiplicity::{count_cooccur_per_chan, count_sp_at_any_time, TimeGrid};
pub use profile::{
    compare_profiles, cooccurrence_profiles, paired_t_test, CooccurrenceProfiles, PairedTTest,
    ProfileParam, SpindleProfile,
};
pub use ratios::{cooccur_likelihood, ratio_spindles_with_chan};
pub use single_channel::spindle_param;

use spindle_core::Channels;
use spindle_overlap::SpindleGroup;

/// Per-channel values of a named normalization mode
///
/// ```rust
/// use spindle_core::{Channels, Spindle, SpindleSet};
/// use spindle_cooccur::{channel_values, Normalization};
/// use spindle_overlap::group_spindles;
///
/// let channels = Channels::from_labels(["A", "B"]).unwrap();
/// let set = SpindleSet::new(vec![Spindle::new("A", 0.0, 1.0), Spindle::new("B", 0.5, 2.0)]).unwrap();
/// let groups = group_spindles(&set).unwrap();
///
/// let values = channel_values(&channels, &groups, Normalization::Cooccur(1));
/// assert_eq!(values, vec![1.0, 1.0]);
/// ```
pub fn channel_values(
    channels: &Channels,
    groups: &[SpindleGroup],
    normalization: Normalization,
) -> Vec<f64> {
    match normalization {
        Normalization::Source => create_cooccurrence_matrix(channels, groups).source_summary(),
        Normalization::Target => create_cooccurrence_matrix(channels, groups).target_summary(),
        Normalization::Cooccur(k) => cooccur_likelihood(channels, groups, k),
        Normalization::Exclusive => ratio_spindles_with_chan(channels, groups),
    }
}
