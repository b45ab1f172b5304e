//! Per-channel spindle descriptives

use spindle_core::nan::nanmean;
use spindle_core::{Channels, Error, Result, Spindle, SpindleSet};

use crate::config::SpindleParam;

/// One descriptive value per channel
///
/// `recording_minutes` is the total analysed recording time and is only used
/// for [`SpindleParam::Density`]. A channel without spindles has density 0 and
/// NaN for every mean.
///
/// ```rust
/// use spindle_core::{Channels, Spindle, SpindleSet};
/// use spindle_cooccur::{spindle_param, SpindleParam};
///
/// let channels = Channels::from_labels(["A", "B"]).unwrap();
/// let set = SpindleSet::new(vec![Spindle::new("A", 0.0, 1.0), Spindle::new("A", 5.0, 5.5)]).unwrap();
///
/// assert_eq!(spindle_param(&set, &channels, SpindleParam::Density, 2.0).unwrap(), vec![1.0, 0.0]);
/// let duration = spindle_param(&set, &channels, SpindleParam::Duration, 2.0).unwrap();
/// assert_eq!(duration[0], 0.75);
/// assert!(duration[1].is_nan());
/// ```
pub fn spindle_param(
    spindles: &SpindleSet,
    channels: &Channels,
    param: SpindleParam,
    recording_minutes: f64,
) -> Result<Vec<f64>> {
    if param == SpindleParam::Density && !(recording_minutes > 0.0) {
        return Err(Error::InvalidParameter(format!(
            "recording length must be positive to compute density, got {recording_minutes} min"
        )));
    }

    let value_of: fn(&Spindle) -> f64 = match param {
        SpindleParam::Density => |_| 1.0,
        SpindleParam::Duration => Spindle::duration,
        SpindleParam::PeakAmplitude => |sp| sp.peak_amplitude,
        SpindleParam::PeakFrequency => |sp| sp.peak_frequency,
    };

    Ok(channels
        .labels()
        .map(|label| {
            let values: Vec<f64> = spindles.on_channel(label).map(value_of).collect();
            match param {
                SpindleParam::Density => values.len() as f64 / recording_minutes,
                _ => nanmean(&values),
            }
        })
        .collect())
}
