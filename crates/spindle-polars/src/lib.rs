//! Polars region tables and the statistical oracle boundary
//!
//! Per-channel values from the co-occurrence crates are collected into a
//! long-format [`RegionTable`] and handed to a [`StatisticalOracle`], which
//! fits a linear mixed model and tests one contrast per region.
//!
//! # Example
//!
//! ```rust
//! use spindle_core::{Channel, Channels};
//! use spindle_polars::RegionTable;
//!
//! let channels = Channels::new(vec![
//!     Channel::new("G1").with_region_label("ctx-lh-precentral").unwrap(),
//!     Channel::new("D1").with_region_label("Left-Hippocampus").unwrap(),
//! ])
//! .unwrap();
//!
//! let mut builder = RegionTable::builder();
//! builder.add_subject("S01", &channels, &[0.4, 0.9]).unwrap();
//! let table = builder.build().unwrap();
//! assert_eq!(table.len(), 1);
//! ```

mod config;
mod contrasts;
mod error;
mod oracle;
mod table;

pub use config::{ModelSpec, DEFAULT_FORMULA};
pub use contrasts::{add_intercept, ContrastMatrix, INTERCEPT};
pub use error::{Error, Result};
pub use oracle::{fit_regions, OracleFit, RegionFit, StatisticalOracle};
pub use table::{RegionTable, RegionTableBuilder, ELEC, REGION, SUBJ, VALUE};
