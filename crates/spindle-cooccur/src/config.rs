//! Named analysis modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use spindle_core::{Error, Result};

/// Co-occurrence normalization mode
///
/// Every mode reduces the groups of a recording to one value per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Row mean of the source-normalized co-occurrence matrix
    Source,
    /// Column mean of the source-normalized co-occurrence matrix
    Target,
    /// Fraction of a channel's groups holding at least `k` other channels
    Cooccur(usize),
    /// Mean fraction of a channel's groups shared with each other channel
    Exclusive,
}

impl Normalization {
    /// Get the name of this mode
    pub fn name(&self) -> String {
        match self {
            Self::Source => "source".to_string(),
            Self::Target => "target".to_string(),
            Self::Cooccur(k) => format!("cooccur{k:02}"),
            Self::Exclusive => "exclusive".to_string(),
        }
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self::Source
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Normalization {
    type Err = Error;

    /// Parse `source`, `target`, `exclusive` or `cooccurNN`
    ///
    /// ```rust
    /// use spindle_cooccur::Normalization;
    ///
    /// assert_eq!("cooccur05".parse::<Normalization>().unwrap(), Normalization::Cooccur(5));
    /// assert_eq!(Normalization::Cooccur(1).name(), "cooccur01");
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "source" => Ok(Self::Source),
            "target" => Ok(Self::Target),
            "exclusive" => Ok(Self::Exclusive),
            other => {
                let k = other
                    .strip_prefix("cooccur")
                    .filter(|k| !k.is_empty())
                    .and_then(|k| k.parse::<usize>().ok())
                    .ok_or_else(|| {
                        Error::InvalidParameter(format!("Unknown normalization '{other}'"))
                    })?;
                Ok(Self::Cooccur(k))
            }
        }
    }
}

/// Reduction applied to per-sample multiplicities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Summarize {
    #[default]
    Mean,
    Median,
}

impl Summarize {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
        }
    }
}

impl FromStr for Summarize {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            other => Err(Error::InvalidParameter(format!(
                "Unknown summary '{other}', expected 'mean' or 'median'"
            ))),
        }
    }
}

/// Per-channel spindle descriptive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpindleParam {
    /// Spindles per minute of recording
    Density,
    /// Mean duration (s)
    Duration,
    /// Mean peak amplitude
    PeakAmplitude,
    /// Mean peak frequency (Hz)
    PeakFrequency,
}

impl SpindleParam {
    pub const ALL: [SpindleParam; 4] = [
        SpindleParam::Density,
        SpindleParam::Duration,
        SpindleParam::PeakAmplitude,
        SpindleParam::PeakFrequency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Density => "density",
            Self::Duration => "duration",
            Self::PeakAmplitude => "peak_val",
            Self::PeakFrequency => "peak_freq",
        }
    }
}

impl FromStr for SpindleParam {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::InvalidParameter(format!("Unknown spindle parameter '{s}'")))
    }
}
