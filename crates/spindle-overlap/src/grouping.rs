//! Chained spindle grouping
//!
//! A spindle group is a connected component of the overlap graph over all
//! spindles of a recording, every channel pooled. Overlap chains: if A
//! overlaps B and B overlaps C, all three share a group even when A and C are
//! disjoint in time.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument};

use spindle_core::{Channels, Lobe, Result, Spindle, SpindleSet};

use crate::interval::overlap_matrix;

/// Disjoint-set forest with union by rank and path halving
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets of `a` and `b`; returns false if already merged
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// Spindles of one connected component, in start order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpindleGroup {
    spindles: Vec<Spindle>,
}

impl SpindleGroup {
    pub fn new(spindles: Vec<Spindle>) -> Self {
        Self { spindles }
    }

    pub fn spindles(&self) -> &[Spindle] {
        &self.spindles
    }

    /// Number of spindles in the group
    pub fn len(&self) -> usize {
        self.spindles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spindles.is_empty()
    }

    /// A group holding a single spindle
    pub fn is_isolated(&self) -> bool {
        self.spindles.len() == 1
    }

    /// Channel of every spindle, duplicates kept
    pub fn channels(&self) -> Vec<&str> {
        self.spindles.iter().map(|sp| sp.channel.as_str()).collect()
    }

    /// Distinct channels of the group
    pub fn distinct_channels(&self) -> BTreeSet<&str> {
        self.spindles.iter().map(|sp| sp.channel.as_str()).collect()
    }

    pub fn contains_channel(&self, channel: &str) -> bool {
        self.spindles.iter().any(|sp| sp.channel == channel)
    }

    /// Earliest start and latest end
    pub fn span(&self) -> Option<(f64, f64)> {
        let start = self.spindles.first()?.start_time;
        let end = self
            .spindles
            .iter()
            .map(|sp| sp.end_time)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((start, end))
    }

    /// Most common cortical region name among the group's spindles
    ///
    /// Hemispheres are pooled; ties go to the region seen first. `None` when
    /// no spindle sits on a cortical channel.
    pub fn dominant_region(&self, channels: &Channels) -> Option<String> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (seen, sp) in self.spindles.iter().enumerate() {
            if let Some(region) = channels.region_of(&sp.channel) {
                counts.entry(region.name.as_str()).or_insert((0, seen)).0 += 1;
            }
        }
        counts
            .into_iter()
            .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
            .map(|(name, _)| name.to_string())
    }

    /// Lobe of the dominant region
    pub fn lobe(&self, channels: &Channels) -> Lobe {
        self.dominant_region(channels)
            .map(|name| Lobe::of(&name))
            .unwrap_or(Lobe::Unknown)
    }
}

/// Group the spindles of a recording by chained overlap
///
/// Every connected component is returned, singletons included, ordered by the
/// start time of its first spindle.
///
/// # Example
///
/// ```rust
/// use spindle_core::{Spindle, SpindleSet};
/// use spindle_overlap::group_spindles;
///
/// let set = SpindleSet::new(vec![
///     Spindle::new("A", 0.0, 2.0),
///     Spindle::new("B", 1.5, 4.0),
///     Spindle::new("C", 3.5, 6.0),
///     Spindle::new("D", 9.0, 10.0),
/// ])
/// .unwrap();
///
/// let groups = group_spindles(&set).unwrap();
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[0].channels(), vec!["A", "B", "C"]);
/// assert!(groups[1].is_isolated());
/// ```
#[instrument(skip(spindles), fields(n_spindles = spindles.len()))]
pub fn group_spindles(spindles: &SpindleSet) -> Result<Vec<SpindleGroup>> {
    let starts: Vec<f64> = spindles.iter().map(|sp| sp.start_time).collect();
    let ends: Vec<f64> = spindles.iter().map(|sp| sp.end_time).collect();
    let overlap = overlap_matrix(&starts, &ends)?;

    let mut forest = DisjointSet::new(overlap.len());
    for (i, j) in overlap.pairs() {
        forest.union(i, j);
    }

    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<Spindle>> = Vec::new();
    for (pos, &idx) in overlap.order().iter().enumerate() {
        let root = forest.find(pos);
        let g = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[g].push(spindles.spindles()[idx].clone());
    }

    debug!(n_groups = groups.len(), "grouped spindles");
    Ok(groups.into_iter().map(SpindleGroup::new).collect())
}
