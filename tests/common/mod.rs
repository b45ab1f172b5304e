//! Shared fixtures for end-to-end tests

#![allow(dead_code)]

use std::sync::Once;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spindle_stats::{Channel, Channels, Reref, Spindle, SpindleSet, SubjectRecording};

static INIT: Once = Once::new();

/// Install a test subscriber once; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Grid electrodes over three cortical regions plus a depth electrode
pub fn channels() -> Channels {
    Channels::new(vec![
        Channel::new("GR1").with_region_label("ctx-lh-precentral_1").unwrap(),
        Channel::new("GR2").with_region_label("ctx-lh-precentral_1").unwrap(),
        Channel::new("GR3").with_region_label("ctx-lh-supramarginal").unwrap(),
        Channel::new("GR4").with_region_label("ctx-lh-superiortemporal_2").unwrap(),
        Channel::new("DH1").with_region_label("Left-Hippocampus").unwrap(),
    ])
    .unwrap()
}

/// Travelling spindles, 5 s apart
///
/// Three of every four events run GR1 → GR3 → GR4; the fourth runs the other
/// way. Onsets jitter by up to 0.1 s.
pub fn travelling_spindles(n_events: usize, seed: u64) -> SpindleSet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut spindles = Vec::with_capacity(n_events * 3);
    for k in 0..n_events {
        let t = k as f64 * 5.0;
        let jitter: f64 = rng.gen_range(0.0..0.1);
        let order = if k % 4 == 3 {
            ["GR4", "GR3", "GR1"]
        } else {
            ["GR1", "GR3", "GR4"]
        };
        spindles.push(Spindle::new(order[0], t, t + 1.2).with_peak(t + 0.6, 12.5, 40.0));
        spindles.push(
            Spindle::new(order[1], t + 0.3 + jitter, t + 1.4).with_peak(t + 0.8, 13.0, 35.0),
        );
        spindles.push(
            Spindle::new(order[2], t + 0.6 + jitter, t + 1.5).with_peak(t + 1.0, 12.0, 30.0),
        );
    }
    SpindleSet::new(spindles).unwrap()
}

pub fn recording(subject: &str, spindles: SpindleSet) -> SubjectRecording {
    SubjectRecording::new(subject, Reref::Average, spindles, channels()).with_recording_minutes(10.0)
}
