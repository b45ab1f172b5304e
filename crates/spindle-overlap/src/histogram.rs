//! Group size distributions per lobe

use std::collections::BTreeMap;

use spindle_core::{Channels, Error, Lobe, Result};

use crate::grouping::SpindleGroup;

/// Sizes (spindle count) of the groups whose dominant region falls in each
/// lobe
///
/// Groups with no cortical spindle are filed under [`Lobe::Unknown`].
pub fn group_sizes_by_lobe(
    groups: &[SpindleGroup],
    channels: &Channels,
) -> BTreeMap<Lobe, Vec<usize>> {
    let mut sizes: BTreeMap<Lobe, Vec<usize>> = BTreeMap::new();
    for group in groups {
        sizes.entry(group.lobe(channels)).or_default().push(group.len());
    }
    sizes
}

/// Fixed-width histogram over `[0, max_value)`
///
/// Bin edges are `0, width, 2·width, …` below `max_value`. Every bin is
/// half-open except the last, which also takes its right edge; values outside
/// the edges are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeHistogram {
    edges: Vec<usize>,
}

impl SizeHistogram {
    pub fn new(max_value: usize, width: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidParameter(
                "histogram bin width must be positive".to_string(),
            ));
        }
        let edges: Vec<usize> = (0..max_value).step_by(width).collect();
        if edges.len() < 2 {
            return Err(Error::InvalidParameter(format!(
                "histogram range {max_value} holds fewer than two edges at width {width}"
            )));
        }
        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Count values per bin
    pub fn counts(&self, values: &[usize]) -> Vec<usize> {
        let n_bins = self.n_bins();
        let first = self.edges[0];
        let last = self.edges[n_bins];
        let mut counts = vec![0usize; n_bins];
        for &v in values {
            if v < first || v > last {
                continue;
            }
            let bin = match self.edges.partition_point(|&e| e <= v) {
                0 => continue,
                k => (k - 1).min(n_bins - 1),
            };
            counts[bin] += 1;
        }
        counts
    }

    /// Per-lobe counts plus the running baseline each lobe stacks on
    ///
    /// Lobes are stacked in [`Lobe`] order; the returned tuples are
    /// `(lobe, baseline, counts)`.
    pub fn stacked(
        &self,
        sizes: &BTreeMap<Lobe, Vec<usize>>,
    ) -> Vec<(Lobe, Vec<usize>, Vec<usize>)> {
        let mut baseline = vec![0usize; self.n_bins()];
        sizes
            .iter()
            .map(|(&lobe, values)| {
                let counts = self.counts(values);
                let base = baseline.clone();
                for (b, c) in baseline.iter_mut().zip(&counts) {
                    *b += c;
                }
                (lobe, base, counts)
            })
            .collect()
    }
}
