//! Lead/follow directionality of spindles between cortical regions
//!
//! When a spindle in region `b` starts while a spindle in region `a` is
//! running, `a` led and `b` followed. Counting these pairs over a recording
//! gives a region × region matrix `x`; regions whose spindles lead more often
//! than they follow have a positive asymmetry score. Significance comes from
//! a permutation null that redistributes each pair count between the two
//! directions with a binomial draw.
//!
//! # Example
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use spindle_core::SequentialEngine;
//! use spindle_direction::{DirectionAnalysis, DirectionConfig, DirectionCounts};
//!
//! let regions = vec!["precentral".to_string(), "insula".to_string()];
//! let x = DirectionCounts::from_matrix(regions, &DMatrix::from_row_slice(2, 2, &[0.0, 60.0, 20.0, 0.0]))
//!     .unwrap();
//!
//! let config = DirectionConfig::new().with_permutations(200).with_seed(42);
//! let report = DirectionAnalysis::new(SequentialEngine::new(), config)
//!     .unwrap()
//!     .run(&x)
//!     .unwrap();
//! assert!(report.regions[0].coefficient > 0.0);
//! ```

pub mod analysis;
pub mod asymmetry;
pub mod counts;
pub mod permutation;
pub mod pvalue;
pub mod report;

pub use analysis::{DirectionAnalysis, DirectionConfig};
pub use asymmetry::{asymmetry_scores, log_ratio_matrix};
pub use counts::{DirectionCounts, RegionsOfInterest};
pub use permutation::{NullDistribution, PermutationTest};
pub use pvalue::{permutation_p_values, two_sided_p_value};
pub use report::{summarize_pairs, DirectionReport, PairSummary, RegionDirection};
