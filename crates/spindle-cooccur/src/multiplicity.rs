//! Instantaneous spindle multiplicity on a sampled time grid

use tracing::{debug, instrument};

use spindle_core::nan::{nanmean, nanmedian, warn_undefined, Axis};
use spindle_core::{Channels, Error, Result, Spindle, SpindleSet};

use crate::config::Summarize;

/// Sorted sample times of a recording
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    times: Vec<f64>,
}

impl TimeGrid {
    /// Regular grid `start, start + 1/s_freq, …` strictly below `end`
    pub fn regular(start: f64, end: f64, s_freq: f64) -> Result<Self> {
        if !(s_freq > 0.0 && s_freq.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "sampling frequency must be positive, got {s_freq}"
            )));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(Error::non_finite("time grid bounds"));
        }
        let n = ((end - start) * s_freq).ceil().max(0.0) as usize;
        let times = (0..n)
            .map(|k| start + k as f64 / s_freq)
            .filter(|&t| t < end)
            .collect();
        Ok(Self { times })
    }

    /// Grid from explicit sample times, which must be finite and ascending
    pub fn from_samples(times: Vec<f64>) -> Result<Self> {
        if times.iter().any(|t| !t.is_finite()) {
            return Err(Error::non_finite("time grid"));
        }
        if times.windows(2).any(|w| w[1] < w[0]) {
            return Err(Error::InvalidInput(
                "time grid samples must be in ascending order".to_string(),
            ));
        }
        Ok(Self { times })
    }

    /// Regular grid from the first to the last spindle onset
    pub fn spanning_onsets(spindles: &SpindleSet, s_freq: f64) -> Result<Self> {
        let first = spindles.spindles().first().map(|sp| sp.start_time);
        let last = spindles.iter().map(|sp| sp.start_time).fold(f64::NEG_INFINITY, f64::max);
        match first {
            Some(first) => Self::regular(first, last, s_freq),
            None => Ok(Self { times: Vec::new() }),
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Sample indices inside `[start, end)`
    pub(crate) fn active_range(&self, spindle: &Spindle) -> std::ops::Range<usize> {
        let lo = self.times.partition_point(|&t| t < spindle.start_time);
        let hi = self.times.partition_point(|&t| t < spindle.end_time);
        lo..hi
    }

    /// Sample indices inside the closed `[start, end]`
    pub(crate) fn touched_range(&self, spindle: &Spindle) -> std::ops::Range<usize> {
        let lo = self.times.partition_point(|&t| t < spindle.start_time);
        let hi = self.times.partition_point(|&t| t <= spindle.end_time);
        lo..hi
    }
}

/// Number of spindles active at each grid sample, `[start, end)`
pub fn count_sp_at_any_time<'a, I>(spindles: I, grid: &TimeGrid) -> Vec<u32>
where
    I: IntoIterator<Item = &'a Spindle>,
{
    // Difference array over sample indices
    let mut delta = vec![0i64; grid.len() + 1];
    for sp in spindles {
        let range = grid.active_range(sp);
        if range.start < range.end {
            delta[range.start] += 1;
            delta[range.end] -= 1;
        }
    }
    let mut running = 0i64;
    delta[..grid.len()]
        .iter()
        .map(|d| {
            running += d;
            running as u32
        })
        .collect()
}

/// Typical crowd size per channel
///
/// Over samples where at least one spindle is active, and restricted to the
/// samples where the channel itself has a spindle, the mean or median of the
/// number of active spindles. NaN for a channel that is never active.
#[instrument(skip_all, fields(n_channels = channels.len(), n_samples = grid.len(), summarize = summarize.name()))]
pub fn count_cooccur_per_chan(
    spindles: &SpindleSet,
    channels: &Channels,
    grid: &TimeGrid,
    summarize: Summarize,
) -> Vec<f64> {
    let multiplicity = count_sp_at_any_time(spindles, grid);

    let mut active = vec![false; grid.len()];
    let values: Vec<f64> = channels
        .labels()
        .map(|label| {
            active.iter_mut().for_each(|a| *a = false);
            for sp in spindles.on_channel(label) {
                for k in grid.active_range(sp) {
                    active[k] = true;
                }
            }
            let crowd: Vec<f64> = multiplicity
                .iter()
                .zip(&active)
                .filter(|&(&m, &a)| a && m >= 1)
                .map(|(&m, _)| m as f64)
                .collect();
            match summarize {
                Summarize::Mean => nanmean(&crowd),
                Summarize::Median => nanmedian(&crowd),
            }
        })
        .collect();

    debug!(
        busy_samples = multiplicity.iter().filter(|&&m| m >= 1).count(),
        "computed per-channel multiplicity"
    );
    warn_undefined(&values, Axis::Rows);
    values
}
