//! Core types for sleep-spindle statistics
//!
//! This crate holds what every analysis crate in the workspace shares: the
//! spindle and channel data model, structured cortical regions, the error
//! type, NaN-aware reductions, p-value correction, execution engines for
//! batch work and an explicit artifact cache.
//!
//! # Design Philosophy
//!
//! - **Validate at the Boundary**: malformed intervals and labels are rejected
//!   when a [`SpindleSet`] or [`Channels`] is built, never deeper down
//! - **Undefined is NaN**: degenerate statistics are NaN, not zero and not an
//!   error
//! - **Pure Derivations**: groups, matrices and scores are recomputed from
//!   their inputs; the only shared state is the [`ArtifactCache`] the caller
//!   owns
//!
//! # Example
//!
//! ```rust
//! use spindle_core::{Spindle, SpindleSet};
//!
//! let spindles = SpindleSet::new(vec![
//!     Spindle::new("LA1", 12.0, 13.1),
//!     Spindle::new("LA2", 10.5, 11.2),
//! ])
//! .unwrap();
//!
//! // Sorted by start time
//! assert_eq!(spindles.spindles()[0].channel, "LA2");
//! ```

pub mod cache;
pub mod correction;
pub mod error;
pub mod execution;
pub mod nan;
pub mod region;
pub mod types;

// Re-export core types
pub use error::{Error, Result};

pub use cache::{ArtifactCache, CacheKey, CachePolicy, CacheStats, Fingerprint};
pub use correction::Correction;
pub use execution::{
    auto_engine, sequential, DefaultEngine, ExecutionEngine, ExecutionStrategy, SequentialEngine,
};
#[cfg(feature = "parallel")]
pub use execution::{parallel, ParallelEngine};
pub use nan::Axis;
pub use region::{pretty_region_name, Hemisphere, Lobe, Region};
pub use types::{Channel, ChannelSummary, Channels, Reref, Spindle, SpindleSet};

/// Common imports for analysis crates
pub mod prelude {
    pub use crate::{
        Channel, Channels, Correction, Error, ExecutionEngine, Region, Result, Spindle,
        SpindleSet,
    };
}
