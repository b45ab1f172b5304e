//! Batch analysis over subject recordings
//!
//! A [`Command`] names one analysis. Regional commands reduce every subject
//! to one value per channel and collect the cortical channels into a
//! [`RegionTable`]; [`Command::Direction`] sums lead/follow counts over
//! subjects and runs the permutation analysis. A subject that cannot
//! contribute is reported in the outcome list instead of aborting the batch.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use spindle_cooccur::{channel_values, spindle_param, Normalization, SpindleParam};
use spindle_core::{
    ArtifactCache, CacheKey, CachePolicy, CacheStats, Channels, ExecutionEngine, Fingerprint,
    Reref, SpindleSet,
};
use spindle_direction::{
    DirectionAnalysis, DirectionConfig, DirectionCounts, DirectionReport, RegionsOfInterest,
};
use spindle_overlap::{group_spindles, SpindleGroup};
use spindle_polars::RegionTable;

use crate::{Error, Result};

const GROUPS_ARTIFACT: &str = "groups";

/// Detected spindles and channel metadata of one subject
#[derive(Debug, Clone)]
pub struct SubjectRecording {
    pub subject: String,
    pub reref: Reref,
    pub spindles: SpindleSet,
    pub channels: Channels,
    /// Analysed recording length, needed for spindle density
    pub recording_minutes: Option<f64>,
    pub fingerprint: Fingerprint,
}

impl SubjectRecording {
    pub fn new(subject: impl Into<String>, reref: Reref, spindles: SpindleSet, channels: Channels) -> Self {
        let fingerprint = Fingerprint::new(channels.len(), 0.0, 0.0);
        Self {
            subject: subject.into(),
            reref,
            spindles,
            channels,
            recording_minutes: None,
            fingerprint,
        }
    }

    pub fn with_recording_minutes(mut self, minutes: f64) -> Self {
        self.recording_minutes = Some(minutes);
        self
    }

    /// Record the detector settings the spindles were produced with
    pub fn with_detector(mut self, smoothing_std: f64, smoothing_threshold: f64) -> Self {
        self.fingerprint = Fingerprint::new(self.channels.len(), smoothing_std, smoothing_threshold);
        self
    }

    fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.subject.clone(), self.reref, GROUPS_ARTIFACT)
    }
}

/// Named analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cooccurrence(Normalization),
    Direction,
    SingleChannel(SpindleParam),
}

impl Command {
    pub fn name(&self) -> String {
        match self {
            Self::Cooccurrence(n) => n.name(),
            Self::Direction => "direction".to_string(),
            Self::SingleChannel(p) => p.name().to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Command {
    type Err = Error;

    /// ```rust
    /// use spindle_stats::pipeline::Command;
    /// use spindle_stats::{Normalization, SpindleParam};
    ///
    /// assert_eq!("cooccur02".parse::<Command>().unwrap(), Command::Cooccurrence(Normalization::Cooccur(2)));
    /// assert_eq!("peak_freq".parse::<Command>().unwrap(), Command::SingleChannel(SpindleParam::PeakFrequency));
    /// assert_eq!("direction".parse::<Command>().unwrap(), Command::Direction);
    /// assert!("lmer".parse::<Command>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        if s == "direction" {
            return Ok(Self::Direction);
        }
        if let Ok(param) = s.parse::<SpindleParam>() {
            return Ok(Self::SingleChannel(param));
        }
        s.parse::<Normalization>()
            .map(Self::Cooccurrence)
            .map_err(|_| Error::UnknownCommand(s.to_string()))
    }
}

/// How one subject took part in a batch
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectStatus {
    /// Contributed table rows (regional commands) or lead/follow pairs
    /// (direction)
    Included { count: usize },
    /// No spindles (or no lead/follow pairs) to work with
    InsufficientData,
    /// The subject's data could not be analysed
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectOutcome {
    pub subject: String,
    pub status: SubjectStatus,
}

/// Result of one command over a batch
#[derive(Debug, Clone)]
pub enum AnalysisOutput {
    Regional {
        command: Command,
        table: RegionTable,
        subjects: Vec<SubjectOutcome>,
    },
    Direction {
        report: DirectionReport,
        subjects: Vec<SubjectOutcome>,
    },
}

impl AnalysisOutput {
    pub fn subjects(&self) -> &[SubjectOutcome] {
        match self {
            Self::Regional { subjects, .. } | Self::Direction { subjects, .. } => subjects,
        }
    }
}

/// Runs commands over recordings, caching spindle groups per subject
pub struct Pipeline<E> {
    engine: E,
    groups: ArtifactCache<Vec<SpindleGroup>>,
    direction: DirectionConfig,
    regions: RegionsOfInterest,
}

impl<E: ExecutionEngine> Pipeline<E> {
    pub fn new(engine: E) -> Self {
        Self::with_cache_policy(engine, CachePolicy::default())
    }

    pub fn with_cache_policy(engine: E, policy: CachePolicy) -> Self {
        Self {
            engine,
            groups: ArtifactCache::new(policy),
            direction: DirectionConfig::default(),
            regions: RegionsOfInterest::Discover,
        }
    }

    pub fn with_direction_config(mut self, config: DirectionConfig) -> Self {
        self.direction = config;
        self
    }

    pub fn with_regions(mut self, regions: RegionsOfInterest) -> Self {
        self.regions = regions;
        self
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.groups.stats()
    }

    /// Forget cached groups of a subject, e.g. after re-detection
    pub fn invalidate_subject(&self, subject: &str) -> Result<usize> {
        Ok(self.groups.invalidate_subject(subject)?)
    }

    /// Spindle groups of a recording, from cache when the fingerprint matches
    pub fn groups(&self, recording: &SubjectRecording) -> Result<Arc<Vec<SpindleGroup>>> {
        self.groups
            .get_or_try_insert_with(&recording.cache_key(), recording.fingerprint, || {
                group_spindles(&recording.spindles).map_err(Error::from)
            })
    }

    /// One value per channel of a regional command
    pub fn channel_values(&self, recording: &SubjectRecording, command: Command) -> Result<Vec<f64>> {
        match command {
            Command::Cooccurrence(normalization) => {
                let groups = self.groups(recording)?;
                Ok(channel_values(&recording.channels, &groups, normalization))
            }
            Command::SingleChannel(param) => {
                let minutes = recording.recording_minutes.unwrap_or(f64::NAN);
                Ok(spindle_param(&recording.spindles, &recording.channels, param, minutes)?)
            }
            Command::Direction => Err(Error::InvalidInput(
                "direction does not produce per-channel values".to_string(),
            )),
        }
    }

    /// Run `command` over every recording
    #[instrument(skip(self, command, recordings), fields(command = %command, n_subjects = recordings.len()))]
    pub fn run(&self, command: Command, recordings: &[SubjectRecording]) -> Result<AnalysisOutput> {
        let output = match command {
            Command::Direction => self.run_direction(recordings)?,
            _ => self.run_regional(command, recordings)?,
        };
        let stats = self.cache_stats();
        debug!(hits = stats.hits, misses = stats.misses, "group cache");
        Ok(output)
    }

    fn run_regional(&self, command: Command, recordings: &[SubjectRecording]) -> Result<AnalysisOutput> {
        let mut builder = RegionTable::builder();
        let mut subjects = Vec::with_capacity(recordings.len());

        for recording in recordings {
            let status = if recording.spindles.is_empty() {
                warn!(subject = %recording.subject, "no spindles");
                SubjectStatus::InsufficientData
            } else {
                match self.channel_values(recording, command) {
                    Ok(values) => SubjectStatus::Included {
                        count: builder.add_subject(&recording.subject, &recording.channels, &values)?,
                    },
                    Err(Error::Core(e)) => {
                        warn!(subject = %recording.subject, error = %e, "subject skipped");
                        SubjectStatus::Failed(e.to_string())
                    }
                    Err(e) => return Err(e),
                }
            };
            subjects.push(SubjectOutcome {
                subject: recording.subject.clone(),
                status,
            });
        }

        info!(command = %command, rows = builder.len(), "region table ready");
        Ok(AnalysisOutput::Regional {
            command,
            table: builder.build()?,
            subjects,
        })
    }

    fn run_direction(&self, recordings: &[SubjectRecording]) -> Result<AnalysisOutput> {
        let regions = self.regions.resolve(recordings.iter().map(|r| &r.channels));
        let mut total = DirectionCounts::zeros(regions.clone());
        let mut subjects = Vec::with_capacity(recordings.len());

        for recording in recordings {
            let counts = DirectionCounts::from_spindles(
                &recording.spindles,
                &recording.channels,
                regions.clone(),
            )?;
            let status = if counts.total_pairs() == 0 {
                SubjectStatus::InsufficientData
            } else {
                SubjectStatus::Included {
                    count: counts.total_pairs() as usize,
                }
            };
            total.add(&counts)?;
            subjects.push(SubjectOutcome {
                subject: recording.subject.clone(),
                status,
            });
        }

        let analysis = DirectionAnalysis::new(self.engine.clone(), self.direction.clone())?;
        let report = analysis.run(&total)?;
        Ok(AnalysisOutput::Direction { report, subjects })
    }
}
