//! Long-format region tables
//!
//! One row per cortical electrode per subject, with the columns
//! `subj`, `region`, `elec` and `value`. `region` is the bare parcellation
//! name, so electrodes of both hemispheres share a level.

use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use spindle_core::Channels;

use crate::{Error, Result};

pub const SUBJ: &str = "subj";
pub const REGION: &str = "region";
pub const ELEC: &str = "elec";
pub const VALUE: &str = "value";

/// Accumulates rows across subjects
#[derive(Debug, Clone, Default)]
pub struct RegionTableBuilder {
    subj: Vec<String>,
    region: Vec<String>,
    elec: Vec<String>,
    value: Vec<f64>,
}

impl RegionTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value per channel of a subject
    ///
    /// Only channels with a cortical region enter the table. Returns the
    /// number of rows added.
    pub fn add_subject(&mut self, subject: &str, channels: &Channels, values: &[f64]) -> Result<usize> {
        if channels.len() != values.len() {
            return Err(spindle_core::Error::size_mismatch(
                channels.len(),
                values.len(),
                "per-channel values",
            )
            .into());
        }
        let before = self.value.len();
        for (channel, &value) in channels.iter().zip(values) {
            if let Some(region) = &channel.region {
                self.subj.push(subject.to_string());
                self.region.push(region.name.clone());
                self.elec.push(channel.label.clone());
                self.value.push(value);
            }
        }
        let added = self.value.len() - before;
        debug!(subject, added, skipped = channels.len() - added, "added subject to region table");
        Ok(added)
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn build(self) -> Result<RegionTable> {
        let df = df!(
            SUBJ => self.subj,
            REGION => self.region,
            ELEC => self.elec,
            VALUE => self.value,
        )?;
        Ok(RegionTable { df })
    }
}

/// Validated long-format table handed to a statistical oracle
#[derive(Debug, Clone)]
pub struct RegionTable {
    df: DataFrame,
}

impl RegionTable {
    pub fn builder() -> RegionTableBuilder {
        RegionTableBuilder::new()
    }

    /// Wrap an existing frame
    ///
    /// `subj`, `region` and `elec` must be string columns; integer or float
    /// `value` columns are cast to `Float64`. Null values are rejected.
    pub fn from_dataframe(mut df: DataFrame) -> Result<Self> {
        for name in [SUBJ, REGION, ELEC] {
            let column = df
                .column(name)
                .map_err(|_| Error::InvalidColumn(name.to_string()))?;
            if column.dtype() != &DataType::String {
                return Err(Error::TypeMismatch {
                    column: name.to_string(),
                    expected: "string".to_string(),
                    got: format!("{:?}", column.dtype()),
                });
            }
        }

        let value = df
            .column(VALUE)
            .map_err(|_| Error::InvalidColumn(VALUE.to_string()))?;
        let value = match value.dtype() {
            DataType::Float64 => value.clone(),
            DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32 => value.cast(&DataType::Float64)?,
            dt => {
                return Err(Error::TypeMismatch {
                    column: VALUE.to_string(),
                    expected: "numeric".to_string(),
                    got: format!("{dt:?}"),
                })
            }
        };
        if value.null_count() > 0 {
            return Err(Error::InvalidInput(format!(
                "column '{VALUE}' has {} null entries",
                value.null_count()
            )));
        }
        df.with_column(value)?;
        Ok(Self { df })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    fn distinct(&self, name: &str) -> Result<BTreeSet<String>> {
        Ok(self
            .df
            .column(name)?
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect())
    }

    /// Distinct regions in sorted order
    pub fn regions(&self) -> Result<Vec<String>> {
        Ok(self.distinct(REGION)?.into_iter().collect())
    }

    pub fn subjects(&self) -> Result<Vec<String>> {
        Ok(self.distinct(SUBJ)?.into_iter().collect())
    }

    /// Mean value per region, pooled over subjects and electrodes
    pub fn region_means(&self) -> Result<BTreeMap<String, f64>> {
        let means = self
            .df
            .clone()
            .lazy()
            .group_by([col(REGION)])
            .agg([col(VALUE).mean()])
            .collect()?;
        let regions = means.column(REGION)?.str()?;
        let values = means.column(VALUE)?.f64()?;
        Ok(regions
            .into_iter()
            .zip(values)
            .filter_map(|(r, v)| Some((r?.to_string(), v.unwrap_or(f64::NAN))))
            .collect())
    }
}
