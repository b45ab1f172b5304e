//! Spindle and channel data model

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::region::Region;
use crate::{Error, Result};

/// A detected oscillatory event on one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spindle {
    pub channel: String,
    /// Onset in seconds
    pub start_time: f64,
    /// Offset in seconds, strictly after `start_time`
    pub end_time: f64,
    pub peak_time: f64,
    /// Hz
    pub peak_frequency: f64,
    pub peak_amplitude: f64,
}

impl Spindle {
    /// Create a spindle with only timing information
    ///
    /// Peak time is placed at the midpoint; frequency and amplitude are NaN.
    pub fn new(channel: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            channel: channel.into(),
            start_time,
            end_time,
            peak_time: (start_time + end_time) / 2.0,
            peak_frequency: f64::NAN,
            peak_amplitude: f64::NAN,
        }
    }

    pub fn with_peak(mut self, peak_time: f64, peak_frequency: f64, peak_amplitude: f64) -> Self {
        self.peak_time = peak_time;
        self.peak_frequency = peak_frequency;
        self.peak_amplitude = peak_amplitude;
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Closed-interval intersection with another spindle
    pub fn overlaps(&self, other: &Spindle) -> bool {
        self.start_time <= other.end_time && other.start_time <= self.end_time
    }

    /// Whether the spindle is active at `t` (half-open `[start, end)`)
    pub fn is_active_at(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time
    }

    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        if !self.start_time.is_finite()
            || !self.end_time.is_finite()
            || self.end_time <= self.start_time
        {
            return Err(Error::invalid_interval(index, self.start_time, self.end_time));
        }
        Ok(())
    }
}

/// Per-channel detection summary carried alongside the spindles
///
/// These values are produced by the detector and never read by the
/// statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub mean: f64,
    pub std: f64,
    pub detection_threshold: f64,
    pub selection_threshold: f64,
}

/// Spindles of one subject/condition ordered by start time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpindleSet {
    spindles: Vec<Spindle>,
    summaries: HashMap<String, ChannelSummary>,
}

impl SpindleSet {
    /// Validate and stably sort spindles by start time
    pub fn new(mut spindles: Vec<Spindle>) -> Result<Self> {
        for (i, sp) in spindles.iter().enumerate() {
            sp.validate(i)?;
        }
        spindles.sort_by_key(|sp| OrderedFloat(sp.start_time));
        Ok(Self {
            spindles,
            summaries: HashMap::new(),
        })
    }

    pub fn with_summary(mut self, channel: impl Into<String>, summary: ChannelSummary) -> Self {
        self.summaries.insert(channel.into(), summary);
        self
    }

    pub fn summary(&self, channel: &str) -> Option<&ChannelSummary> {
        self.summaries.get(channel)
    }

    pub fn spindles(&self) -> &[Spindle] {
        &self.spindles
    }

    pub fn len(&self) -> usize {
        self.spindles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spindles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Spindle> {
        self.spindles.iter()
    }

    /// Spindles recorded on one channel
    pub fn on_channel<'a>(&'a self, channel: &'a str) -> impl Iterator<Item = &'a Spindle> + 'a {
        self.spindles.iter().filter(move |sp| sp.channel == channel)
    }

    /// Earliest start and latest end, if any spindles exist
    pub fn time_span(&self) -> Option<(f64, f64)> {
        let first = self.spindles.first()?.start_time;
        let last_end = self
            .spindles
            .iter()
            .map(|sp| sp.end_time)
            .fold(f64::NEG_INFINITY, f64::max);
        Some((first, last_end))
    }
}

impl<'a> IntoIterator for &'a SpindleSet {
    type Item = &'a Spindle;
    type IntoIter = std::slice::Iter<'a, Spindle>;

    fn into_iter(self) -> Self::IntoIter {
        self.spindles.iter()
    }
}

/// Electrical reference scheme of the underlying recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reref {
    /// Common average reference
    Average,
    /// Bipolar montage between neighbours within the given distance (mm)
    Bipolar(u32),
}

impl fmt::Display for Reref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Average => write!(f, "avg"),
            Self::Bipolar(mm) => write!(f, "{mm}"),
        }
    }
}

/// A recording channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub label: String,
    pub xyz: [f64; 3],
    pub region: Option<Region>,
}

impl Channel {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            xyz: [f64::NAN; 3],
            region: None,
        }
    }

    pub fn with_xyz(mut self, xyz: [f64; 3]) -> Self {
        self.xyz = xyz;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Attach the region parsed from a parcellation label
    pub fn with_region_label(mut self, label: &str) -> Result<Self> {
        self.region = Region::parse_label(label)?;
        Ok(self)
    }
}

/// Ordered channel collection with label lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Channel>", into = "Vec<Channel>")]
pub struct Channels {
    channels: Vec<Channel>,
    index: HashMap<String, usize>,
}

impl Channels {
    /// Build a collection; labels must be unique
    pub fn new(channels: Vec<Channel>) -> Result<Self> {
        let mut index = HashMap::with_capacity(channels.len());
        for (i, ch) in channels.iter().enumerate() {
            if index.insert(ch.label.clone(), i).is_some() {
                return Err(Error::InvalidInput(format!(
                    "Duplicate channel label '{}'",
                    ch.label
                )));
            }
        }
        Ok(Self { channels, index })
    }

    /// Channels with no position or region information
    pub fn from_labels<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(labels.into_iter().map(Channel::new).collect())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Channel> {
        self.channels.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.label.as_str())
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn get(&self, label: &str) -> Option<&Channel> {
        self.position(label).map(|i| &self.channels[i])
    }

    pub fn region_of(&self, label: &str) -> Option<&Region> {
        self.get(label).and_then(|c| c.region.as_ref())
    }

    /// Distinct regions in first-seen channel order
    pub fn regions(&self) -> Vec<Region> {
        let mut seen = Vec::new();
        for region in self.channels.iter().filter_map(|c| c.region.as_ref()) {
            if !seen.contains(region) {
                seen.push(region.clone());
            }
        }
        seen
    }
}

impl TryFrom<Vec<Channel>> for Channels {
    type Error = Error;

    fn try_from(channels: Vec<Channel>) -> Result<Self> {
        Self::new(channels)
    }
}

impl From<Channels> for Vec<Channel> {
    fn from(channels: Channels) -> Self {
        channels.channels
    }
}

impl std::ops::Index<usize> for Channels {
    type Output = Channel;

    fn index(&self, i: usize) -> &Channel {
        &self.channels[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Hemisphere;

    #[test]
    fn test_spindle_set_sorts_stably() {
        let set = SpindleSet::new(vec![
            Spindle::new("B", 5.0, 6.0),
            Spindle::new("A", 1.0, 2.0),
            Spindle::new("C", 5.0, 7.0),
        ])
        .unwrap();
        let order: Vec<&str> = set.iter().map(|s| s.channel.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(set.time_span(), Some((1.0, 7.0)));
    }

    #[test]
    fn test_spindle_set_rejects_malformed() {
        let err = SpindleSet::new(vec![
            Spindle::new("A", 1.0, 2.0),
            Spindle::new("B", 3.0, 3.0),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInterval { index: 1, .. }));

        assert!(SpindleSet::new(vec![Spindle::new("A", f64::NAN, 2.0)]).is_err());
    }

    #[test]
    fn test_spindle_overlap_is_closed() {
        let a = Spindle::new("A", 0.0, 10.0);
        let b = Spindle::new("B", 10.0, 20.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(a.is_active_at(0.0));
        assert!(!a.is_active_at(10.0));
    }

    #[test]
    fn test_channels_lookup() {
        let channels = Channels::new(vec![
            Channel::new("G1").with_region_label("ctx-lh-precentral_1").unwrap(),
            Channel::new("G2").with_region_label("Left-Putamen").unwrap(),
            Channel::new("G3").with_region_label("ctx-lh-precentral_1").unwrap(),
        ])
        .unwrap();
        assert_eq!(channels.position("G3"), Some(2));
        assert!(channels.region_of("G2").is_none());
        assert_eq!(
            channels.regions(),
            vec![Region::new(Hemisphere::Left, "precentral_1")]
        );
        assert!(Channels::from_labels(["A", "A"]).is_err());
    }

    #[test]
    fn test_reref_display() {
        assert_eq!(Reref::Average.to_string(), "avg");
        assert_eq!(Reref::Bipolar(15).to_string(), "15");
    }
}
