//! Isolated versus co-occurring spindle profiles
//!
//! Samples of a recording are ranked by how many spindles are active. The
//! `percent` % least crowded samples (with at least one spindle) pick out the
//! isolated spindles, the `percent` % most crowded pick out the co-occurring
//! ones. Each class is summarised by mean peak frequency, amplitude and
//! duration; across subjects the two classes are compared with a paired
//! t-test per parameter.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;
use tracing::{debug, info, instrument};

use spindle_core::nan::{nanmean, percentile};
use spindle_core::{Error, Result, Spindle, SpindleSet};

use crate::multiplicity::{count_sp_at_any_time, TimeGrid};

/// Parameter compared between classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileParam {
    Frequency,
    Amplitude,
    Duration,
}

impl ProfileParam {
    pub const ALL: [ProfileParam; 3] = [Self::Frequency, Self::Amplitude, Self::Duration];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Frequency => "freq",
            Self::Amplitude => "ampl",
            Self::Duration => "dur",
        }
    }
}

/// Summary of one class of spindles in one subject
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpindleProfile {
    pub n_spindles: usize,
    pub frequency: f64,
    pub amplitude: f64,
    pub duration: f64,
}

impl SpindleProfile {
    fn from_spindles(spindles: &[&Spindle]) -> Self {
        let freq: Vec<f64> = spindles.iter().map(|sp| sp.peak_frequency).collect();
        let ampl: Vec<f64> = spindles.iter().map(|sp| sp.peak_amplitude).collect();
        let dur: Vec<f64> = spindles.iter().map(|sp| sp.duration()).collect();
        Self {
            n_spindles: spindles.len(),
            frequency: nanmean(&freq),
            amplitude: nanmean(&ampl),
            duration: nanmean(&dur),
        }
    }

    pub fn get(&self, param: ProfileParam) -> f64 {
        match param {
            ProfileParam::Frequency => self.frequency,
            ProfileParam::Amplitude => self.amplitude,
            ProfileParam::Duration => self.duration,
        }
    }
}

/// Profiles of the isolated and co-occurring spindles of one recording
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CooccurrenceProfiles {
    pub isolated: SpindleProfile,
    pub cooccurring: SpindleProfile,
}

/// Spindles touching at least one busy sample accepted by `keep`
fn select_spindles<'a>(
    spindles: &'a SpindleSet,
    grid: &TimeGrid,
    crowd: &[u32],
    keep: impl Fn(f64) -> bool,
) -> Vec<&'a Spindle> {
    let selected: Vec<bool> = crowd.iter().map(|&c| c >= 1 && keep(c as f64)).collect();
    spindles
        .iter()
        .filter(|sp| grid.touched_range(sp).any(|k| selected[k]))
        .collect()
}

/// Split a recording into isolated and co-occurring spindles
///
/// The grid runs from the first to the last spindle onset at `s_freq`.
/// A spindle belongs to a class when any selected sample lies within its
/// closed interval; a spindle can belong to both classes.
#[instrument(skip(spindles), fields(n_spindles = spindles.len()))]
pub fn cooccurrence_profiles(
    spindles: &SpindleSet,
    s_freq: f64,
    percent: f64,
) -> Result<CooccurrenceProfiles> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(Error::InvalidParameter(format!(
            "percent {percent} must be in [0, 100]"
        )));
    }
    let grid = TimeGrid::spanning_onsets(spindles, s_freq)?;
    let crowd = count_sp_at_any_time(spindles, &grid);

    let busy: Vec<f64> = crowd.iter().filter(|&&c| c >= 1).map(|&c| c as f64).collect();
    if busy.is_empty() {
        return Err(Error::InsufficientData {
            expected: 1,
            actual: 0,
        });
    }
    let low = percentile(&busy, percent);
    let high = percentile(&busy, 100.0 - percent);

    let isolated = select_spindles(spindles, &grid, &crowd, |c| c <= low);
    let cooccurring = select_spindles(spindles, &grid, &crowd, |c| c >= high);
    info!(
        isolated = isolated.len(),
        cooccurring = cooccurring.len(),
        "classified spindles by crowding"
    );

    Ok(CooccurrenceProfiles {
        isolated: SpindleProfile::from_spindles(&isolated),
        cooccurring: SpindleProfile::from_spindles(&cooccurring),
    })
}

/// Result of a paired t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairedTTest {
    pub mean_a: f64,
    pub mean_b: f64,
    pub t_statistic: f64,
    pub df: f64,
    /// Two-sided
    pub p_value: f64,
}

/// Paired t-test of `a` against `b`
///
/// Pairs with a NaN on either side are dropped.
///
/// # Errors
///
/// `InvalidInput` on length mismatch, `InsufficientData` with fewer than two
/// complete pairs.
pub fn paired_t_test(a: &[f64], b: &[f64]) -> Result<PairedTTest> {
    if a.len() != b.len() {
        return Err(Error::size_mismatch(a.len(), b.len(), "paired samples"));
    }
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: n,
        });
    }

    let diffs: Vec<f64> = pairs.iter().map(|(x, y)| x - y).collect();
    let mean_d = diffs.iter().mean();
    let var_d = diffs.iter().variance();
    let t = mean_d / (var_d / n as f64).sqrt();
    let df = (n - 1) as f64;

    let p_value = if t.is_nan() {
        f64::NAN
    } else if t.is_infinite() {
        0.0
    } else {
        let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| {
            Error::Computation(format!("Failed to create t-distribution: {e}"))
        })?;
        (2.0 * (1.0 - dist.cdf(t.abs()))).min(1.0)
    };

    debug!(n, t, p_value, "paired t-test");
    Ok(PairedTTest {
        mean_a: pairs.iter().map(|p| p.0).mean(),
        mean_b: pairs.iter().map(|p| p.1).mean(),
        t_statistic: t,
        df,
        p_value,
    })
}

/// Paired comparison of isolated against co-occurring profiles, one test per
/// parameter
pub fn compare_profiles(subjects: &[CooccurrenceProfiles]) -> Result<Vec<(ProfileParam, PairedTTest)>> {
    ProfileParam::ALL
        .into_iter()
        .map(|param| {
            let iso: Vec<f64> = subjects.iter().map(|s| s.isolated.get(param)).collect();
            let co: Vec<f64> = subjects.iter().map(|s| s.cooccurring.get(param)).collect();
            let test = paired_t_test(&iso, &co)?;
            info!(
                param = param.name(),
                isolated = test.mean_a,
                cooccurring = test.mean_b,
                t = test.t_statistic,
                df = test.df,
                p = test.p_value,
                "isolated vs co-occurring"
            );
            Ok((param, test))
        })
        .collect()
}
