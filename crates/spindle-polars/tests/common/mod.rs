//! Common test utilities for spindle-polars tests

use std::sync::Mutex;

use polars::prelude::*;
use spindle_core::{Channel, Channels};
use spindle_polars::{ContrastMatrix, ModelSpec, OracleFit, RegionTable, Result, StatisticalOracle};

/// Oracle that answers with contrasts of the per-region cell means and
/// remembers the model it was asked to fit
#[derive(Default)]
pub struct CellMeansOracle {
    pub seen: Mutex<Vec<(String, usize)>>,
}

impl StatisticalOracle for CellMeansOracle {
    fn name(&self) -> &str {
        "cell-means"
    }

    fn fit(&self, data: &DataFrame, spec: &ModelSpec, contrasts: &ContrastMatrix) -> Result<OracleFit> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((spec.formula.clone(), data.height()));
        }
        let means = RegionTable::from_dataframe(data.clone())?.region_means()?;
        let cell: Vec<f64> = contrasts.regions().iter().map(|r| means[r]).collect();
        let estimates = contrasts.estimate(&cell)?;
        let p_values = estimates
            .iter()
            .map(|(k, v)| (k.clone(), if v.abs() > 1.0 { 0.001 } else { 0.5 }))
            .collect();
        Ok(OracleFit { estimates, p_values })
    }
}

/// Four electrodes over three cortical regions plus one depth electrode
pub fn channels() -> Channels {
    Channels::new(vec![
        Channel::new("GR1").with_region_label("ctx-lh-superiorfrontal_1").unwrap(),
        Channel::new("GR2").with_region_label("ctx-lh-superiorfrontal_1").unwrap(),
        Channel::new("GR3").with_region_label("ctx-rh-precuneus").unwrap(),
        Channel::new("GR4").with_region_label("ctx-rh-fusiform_2").unwrap(),
        Channel::new("DH1").with_region_label("Right-Amygdala").unwrap(),
    ])
    .unwrap()
}
