//! Region × region lead/follow counts

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

use spindle_core::{Channels, Error, Result, SpindleSet};

/// Regions a direction analysis is run over
///
/// Regions are bare parcellation names (`precentral_2`); both hemispheres
/// pool into the same region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegionsOfInterest {
    /// A fixed reference list
    Fixed(Vec<String>),
    /// Every region with at least one electrode, in first-seen order
    Discover,
}

impl RegionsOfInterest {
    /// Concrete region list for a set of recordings
    pub fn resolve<'a, I>(&self, recordings: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a Channels>,
    {
        match self {
            Self::Fixed(regions) => regions.clone(),
            Self::Discover => {
                let mut seen: Vec<String> = Vec::new();
                for channels in recordings {
                    for region in channels.regions() {
                        if !seen.contains(&region.name) {
                            seen.push(region.name);
                        }
                    }
                }
                seen
            }
        }
    }
}

/// `x[a, b]`: how often a spindle in region `a` was active when a spindle in
/// region `b` started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionCounts {
    regions: Vec<String>,
    counts: DMatrix<u64>,
}

impl DirectionCounts {
    /// All-zero counts over `regions`
    pub fn zeros(regions: Vec<String>) -> Self {
        let r = regions.len();
        Self {
            regions,
            counts: DMatrix::zeros(r, r),
        }
    }

    /// Wrap an existing integer count matrix
    pub fn from_counts(regions: Vec<String>, counts: DMatrix<u64>) -> Result<Self> {
        if !counts.is_square() {
            return Err(Error::InvalidInput(format!(
                "count matrix must be square, got {}x{}",
                counts.nrows(),
                counts.ncols()
            )));
        }
        if counts.nrows() != regions.len() {
            return Err(Error::size_mismatch(regions.len(), counts.nrows(), "count matrix regions"));
        }
        Ok(Self { regions, counts })
    }

    /// Validate a real-valued count matrix
    ///
    /// Entries must be finite, non-negative integers.
    pub fn from_matrix(regions: Vec<String>, matrix: &DMatrix<f64>) -> Result<Self> {
        for (k, &v) in matrix.iter().enumerate() {
            if !v.is_finite() {
                return Err(Error::non_finite("count matrix"));
            }
            if v < 0.0 || v.fract() != 0.0 {
                let (row, col) = (k % matrix.nrows(), k / matrix.nrows());
                return Err(Error::InvalidInput(format!(
                    "count matrix entry ({row}, {col}) = {v} is not a non-negative integer"
                )));
            }
        }
        Self::from_counts(regions, matrix.map(|v| v as u64))
    }

    /// Count lead/follow pairs in one recording
    ///
    /// For every ordered pair of spindles where the follower starts strictly
    /// after the leader starts and strictly before it ends, increment
    /// `x[region(leader), region(follower)]`. Spindles on channels without a
    /// region, or with a region outside `regions`, are skipped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use spindle_core::{Channel, Channels, Spindle, SpindleSet};
    /// use spindle_direction::DirectionCounts;
    ///
    /// let channels = Channels::new(vec![
    ///     Channel::new("F1").with_region_label("ctx-lh-precentral_1").unwrap(),
    ///     Channel::new("T1").with_region_label("ctx-lh-superiortemporal_1").unwrap(),
    /// ])
    /// .unwrap();
    /// let set = SpindleSet::new(vec![
    ///     Spindle::new("F1", 0.0, 1.0),
    ///     Spindle::new("T1", 0.5, 1.5),
    /// ])
    /// .unwrap();
    /// let regions = vec!["precentral_1".to_string(), "superiortemporal_1".to_string()];
    ///
    /// let x = DirectionCounts::from_spindles(&set, &channels, regions).unwrap();
    /// assert_eq!(x.get(0, 1), 1);
    /// assert_eq!(x.get(1, 0), 0);
    /// ```
    #[instrument(skip_all, fields(n_spindles = spindles.len(), n_regions = regions.len()))]
    pub fn from_spindles(
        spindles: &SpindleSet,
        channels: &Channels,
        regions: Vec<String>,
    ) -> Result<Self> {
        let index: HashMap<&str, usize> = regions
            .iter()
            .enumerate()
            .map(|(i, r)| (r.as_str(), i))
            .collect();
        if index.len() != regions.len() {
            return Err(Error::InvalidInput("regions of interest contain duplicates".to_string()));
        }

        // Region index of every spindle, None when skipped
        let region_of: Vec<Option<usize>> = spindles
            .iter()
            .map(|sp| {
                channels
                    .region_of(&sp.channel)
                    .and_then(|r| index.get(r.name.as_str()).copied())
            })
            .collect();

        let r = regions.len();
        let mut counts = DMatrix::<u64>::zeros(r, r);
        let all = spindles.spindles();
        let mut n_pairs = 0u64;
        for (i, lead) in all.iter().enumerate() {
            let Some(a) = region_of[i] else { continue };
            // Start-sorted: followers are after the leader and start before it ends
            for (j, follow) in all.iter().enumerate().skip(i + 1) {
                if follow.start_time >= lead.end_time {
                    break;
                }
                if follow.start_time <= lead.start_time {
                    continue;
                }
                if let Some(b) = region_of[j] {
                    counts[(a, b)] += 1;
                    n_pairs += 1;
                }
            }
        }

        debug!(n_pairs, "counted lead/follow pairs");
        Ok(Self { regions, counts })
    }

    /// Add another subject's counts over the same regions
    pub fn add(&mut self, other: &DirectionCounts) -> Result<()> {
        if self.regions != other.regions {
            return Err(Error::InvalidInput(
                "cannot add direction counts over different regions".to_string(),
            ));
        }
        self.counts += &other.counts;
        Ok(())
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn n_regions(&self) -> usize {
        self.regions.len()
    }

    pub fn counts(&self) -> &DMatrix<u64> {
        &self.counts
    }

    pub fn get(&self, lead: usize, follow: usize) -> u64 {
        self.counts[(lead, follow)]
    }

    /// Counts as a real matrix
    pub fn to_f64(&self) -> DMatrix<f64> {
        self.counts.map(|v| v as f64)
    }

    /// Pairs a region takes part in with other regions, either direction
    pub fn pair_count(&self, region: usize) -> u64 {
        (0..self.n_regions())
            .filter(|&j| j != region)
            .map(|j| self.counts[(region, j)] + self.counts[(j, region)])
            .sum()
    }

    /// Total off-diagonal pairs
    pub fn total_pairs(&self) -> u64 {
        let r = self.n_regions();
        (0..r)
            .flat_map(|i| (0..r).map(move |j| (i, j)))
            .filter(|(i, j)| i != j)
            .map(|(i, j)| self.counts[(i, j)])
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::{Channel, Spindle};

    fn channels() -> Channels {
        Channels::new(vec![
            Channel::new("A1").with_region_label("ctx-lh-precentral_1").unwrap(),
            Channel::new("A2").with_region_label("ctx-rh-precentral_1").unwrap(),
            Channel::new("B1").with_region_label("ctx-lh-insula_2").unwrap(),
            Channel::new("W1").with_region_label("Left-Cerebral-White-Matter").unwrap(),
            Channel::new("C1").with_region_label("ctx-lh-cuneus").unwrap(),
        ])
        .unwrap()
    }

    fn regions() -> Vec<String> {
        vec!["precentral_1".to_string(), "insula_2".to_string()]
    }

    #[test]
    fn test_lead_follow_counting() {
        let set = SpindleSet::new(vec![
            Spindle::new("A1", 0.0, 2.0),
            Spindle::new("B1", 1.0, 3.0),
            Spindle::new("B1", 1.5, 2.2),
            // Starts after A1 ends
            Spindle::new("A2", 2.5, 4.0),
            // No region
            Spindle::new("W1", 2.6, 3.0),
            // Region not of interest
            Spindle::new("C1", 2.7, 3.0),
        ])
        .unwrap();
        let x = DirectionCounts::from_spindles(&set, &channels(), regions()).unwrap();
        // A1 leads both B1 spindles; A2 leads nothing
        assert_eq!(x.get(0, 1), 2);
        // B1@1.0 leads B1@1.5 and A2
        assert_eq!(x.get(1, 1), 1);
        assert_eq!(x.get(1, 0), 1);
        assert_eq!(x.get(0, 0), 0);
        assert_eq!(x.pair_count(0), 3);
        assert_eq!(x.total_pairs(), 3);
    }

    #[test]
    fn test_same_start_and_touching_end_do_not_count() {
        let set = SpindleSet::new(vec![
            Spindle::new("A1", 0.0, 2.0),
            Spindle::new("B1", 0.0, 1.0),
            Spindle::new("B1", 2.0, 3.0),
        ])
        .unwrap();
        let x = DirectionCounts::from_spindles(&set, &channels(), regions()).unwrap();
        assert_eq!(x.total_pairs(), 0);
    }

    #[test]
    fn test_from_matrix_validation() {
        let ok = DMatrix::from_row_slice(2, 2, &[0.0, 3.0, 1.0, 0.0]);
        let x = DirectionCounts::from_matrix(regions(), &ok).unwrap();
        assert_eq!(x.get(0, 1), 3);

        let negative = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        assert!(DirectionCounts::from_matrix(regions(), &negative).is_err());

        let fractional = DMatrix::from_row_slice(2, 2, &[0.0, 1.5, 1.0, 0.0]);
        assert!(DirectionCounts::from_matrix(regions(), &fractional).is_err());

        let non_square = DMatrix::from_row_slice(1, 2, &[0.0, 1.0]);
        assert!(DirectionCounts::from_matrix(regions(), &non_square).is_err());

        let nan = DMatrix::from_row_slice(2, 2, &[0.0, f64::NAN, 1.0, 0.0]);
        assert!(DirectionCounts::from_matrix(regions(), &nan).is_err());
    }

    #[test]
    fn test_add_across_subjects() {
        let mut total = DirectionCounts::zeros(regions());
        let one = DirectionCounts::from_matrix(
            regions(),
            &DMatrix::from_row_slice(2, 2, &[0.0, 2.0, 1.0, 0.0]),
        )
        .unwrap();
        total.add(&one).unwrap();
        total.add(&one).unwrap();
        assert_eq!(total.get(0, 1), 4);

        let other = DirectionCounts::zeros(vec!["cuneus".to_string()]);
        assert!(total.add(&other).is_err());
    }

    #[test]
    fn test_discover_regions_first_seen() {
        let discovered = RegionsOfInterest::Discover.resolve([&channels()]);
        assert_eq!(discovered, vec!["precentral_1", "insula_2", "cuneus"]);
        let fixed = RegionsOfInterest::Fixed(regions()).resolve(std::iter::empty::<&Channels>());
        assert_eq!(fixed, regions());
    }
}
