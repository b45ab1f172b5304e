//! Co-occurrence and directionality statistics for sleep spindles
//!
//! This crate re-exports the workspace crates and adds a batch
//! [`Pipeline`](pipeline::Pipeline) that runs named analyses over many
//! subjects.
//!
//! - [`spindle_core`]: data model, regions, NaN reductions, correction,
//!   execution engines and the artifact cache
//! - [`spindle_overlap`]: interval overlap and spindle grouping
//! - [`spindle_cooccur`]: per-channel co-occurrence statistics,
//!   single-channel descriptives and crowding profiles
//! - [`spindle_direction`]: lead/follow counts and the permutation analysis
//! - [`spindle_polars`]: region tables and the statistical oracle boundary
//!
//! # Example
//!
//! ```rust
//! use spindle_stats::prelude::*;
//!
//! let channels = Channels::from_labels(["A", "B", "C", "D", "E"]).unwrap();
//! let spindles = SpindleSet::new(vec![
//!     Spindle::new("A", 0.0, 5.0),
//!     Spindle::new("B", 1.0, 5.0),
//!     Spindle::new("C", 10.0, 15.0),
//!     Spindle::new("D", 11.0, 15.0),
//!     Spindle::new("E", 20.0, 21.0),
//! ])
//! .unwrap();
//!
//! let groups = group_spindles(&spindles).unwrap();
//! assert_eq!(groups.len(), 3);
//! let likelihood = cooccur_likelihood(&channels, &groups, 1);
//! assert_eq!(likelihood, vec![1.0, 1.0, 1.0, 1.0, 0.0]);
//! ```

mod error;
pub mod pipeline;

pub use error::{Error, Result};
pub use pipeline::{AnalysisOutput, Command, Pipeline, SubjectOutcome, SubjectRecording, SubjectStatus};

pub use spindle_cooccur;
pub use spindle_core;
pub use spindle_direction;
pub use spindle_overlap;
pub use spindle_polars;

pub use spindle_cooccur::{
    channel_values, compare_profiles, cooccur_likelihood, cooccurrence_profiles,
    count_cooccur_per_chan, create_cooccurrence_matrix, ratio_spindles_with_chan, spindle_param,
    Normalization, SpindleParam, Summarize, TimeGrid,
};
pub use spindle_core::{
    auto_engine, sequential, ArtifactCache, CachePolicy, Channel, Channels, Correction, Reref,
    Spindle, SpindleSet,
};
pub use spindle_direction::{
    DirectionAnalysis, DirectionConfig, DirectionCounts, DirectionReport, RegionsOfInterest,
};
pub use spindle_overlap::{group_spindles, overlap_matrix, SpindleGroup};
pub use spindle_polars::{fit_regions, ModelSpec, RegionTable, StatisticalOracle};

/// Common imports for analysis scripts
pub mod prelude {
    pub use crate::pipeline::{Command, Pipeline, SubjectRecording};
    pub use spindle_cooccur::{channel_values, cooccur_likelihood, Normalization, SpindleParam};
    pub use spindle_core::prelude::*;
    pub use spindle_direction::{DirectionAnalysis, DirectionConfig, DirectionCounts};
    pub use spindle_overlap::group_spindles;
}
