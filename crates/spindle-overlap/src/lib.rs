//! Interval overlap and chained spindle grouping
//!
//! Spindles from every channel of a recording are pooled, sorted by start
//! time and linked whenever their closed intervals intersect. The connected
//! components of that graph are the spindle groups every co-occurrence
//! statistic is computed from.
//!
//! # Example
//!
//! ```rust
//! use spindle_core::{Spindle, SpindleSet};
//! use spindle_overlap::group_spindles;
//!
//! let set = SpindleSet::new(vec![
//!     Spindle::new("A", 0.0, 5.0),
//!     Spindle::new("B", 1.0, 4.0),
//!     Spindle::new("C", 10.0, 15.0),
//! ])
//! .unwrap();
//! let groups = group_spindles(&set).unwrap();
//! assert_eq!(groups.len(), 2);
//! ```

pub mod grouping;
pub mod histogram;
pub mod interval;

pub use grouping::{group_spindles, DisjointSet, SpindleGroup};
pub use histogram::{group_sizes_by_lobe, SizeHistogram};
pub use interval::{intervals_overlap, overlap_matrix, OverlapMatrix};
