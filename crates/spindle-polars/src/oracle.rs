//! Boundary to an external mixed-model fitter
//!
//! Fitting the linear mixed model and the simultaneous contrast tests is
//! delegated to a [`StatisticalOracle`]. This module prepares the inputs and
//! validates what comes back; a fit that lacks a region or carries a
//! non-finite p-value is rejected, never patched.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};

use crate::config::ModelSpec;
use crate::contrasts::{add_intercept, ContrastMatrix, INTERCEPT};
use crate::table::RegionTable;
use crate::{Error, Result};

/// Raw contrast estimates, keyed by contrast row label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleFit {
    /// One estimate per row, including `intercept`
    pub estimates: BTreeMap<String, f64>,
    /// Corrected p-value per row
    pub p_values: BTreeMap<String, f64>,
}

/// External statistical fitter
///
/// Implementations report optimizer failures as [`Error::NonConvergence`]
/// and any other failure as [`Error::Oracle`].
pub trait StatisticalOracle: Send + Sync {
    fn name(&self) -> &str;

    /// Fit `spec` on the `subj, region, elec, value` table and test
    /// `contrasts`
    fn fit(&self, data: &DataFrame, spec: &ModelSpec, contrasts: &ContrastMatrix) -> Result<OracleFit>;
}

/// Per-region coefficients and corrected p-values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionFit {
    pub coefficients: BTreeMap<String, f64>,
    pub p_values: BTreeMap<String, f64>,
}

impl RegionFit {
    /// Regions with p below `threshold`, sorted by ascending coefficient
    pub fn significant(&self, threshold: f64) -> Vec<(&str, f64, f64)> {
        let mut hits: Vec<(&str, f64, f64)> = self
            .coefficients
            .iter()
            .filter_map(|(region, &coef)| {
                let p = *self.p_values.get(region)?;
                (p < threshold).then_some((region.as_str(), coef, p))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }
}

fn validate(fit: &OracleFit, contrasts: &ContrastMatrix) -> Result<()> {
    if !fit.estimates.contains_key(INTERCEPT) {
        return Err(Error::IncompleteFit("no intercept estimate".to_string()));
    }
    let missing: Vec<&str> = contrasts
        .regions()
        .iter()
        .filter(|r| !fit.estimates.contains_key(*r) || !fit.p_values.contains_key(*r))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(Error::IncompleteFit(format!(
            "no estimate or p-value for regions {missing:?}"
        )));
    }
    let bad_p: Vec<&str> = contrasts
        .regions()
        .iter()
        .filter(|r| !fit.p_values[*r].is_finite())
        .map(String::as_str)
        .collect();
    if !bad_p.is_empty() {
        return Err(Error::IncompleteFit(format!(
            "non-finite p-values for regions {bad_p:?}"
        )));
    }
    Ok(())
}

/// Fit region effects on `table` through `oracle`
#[instrument(skip_all, fields(oracle = oracle.name(), rows = table.len()))]
pub fn fit_regions<O: StatisticalOracle + ?Sized>(
    oracle: &O,
    table: &RegionTable,
    spec: &ModelSpec,
) -> Result<RegionFit> {
    let regions = table.regions()?;
    let contrasts = ContrastMatrix::new(&regions)?;
    let fit = oracle.fit(table.dataframe(), spec, &contrasts)?;
    validate(&fit, &contrasts)?;

    let coefficients = add_intercept(
        fit.estimates
            .into_iter()
            .filter(|(k, _)| k == INTERCEPT || regions.contains(k))
            .collect(),
    )?;
    let p_values: BTreeMap<String, f64> = fit
        .p_values
        .into_iter()
        .filter(|(k, _)| regions.contains(k))
        .collect();

    info!(
        formula = %spec.formula,
        correction = spec.correction.name(),
        n_regions = regions.len(),
        "region model fitted"
    );
    Ok(RegionFit {
        coefficients,
        p_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use spindle_core::{Channel, Channels};

    /// Cell-means stand-in that can be told to misbehave
    struct Stub {
        drop_region: Option<&'static str>,
        nan_p: bool,
        converge: bool,
    }

    impl StatisticalOracle for Stub {
        fn name(&self) -> &str {
            "stub"
        }

        fn fit(&self, data: &DataFrame, _spec: &ModelSpec, contrasts: &ContrastMatrix) -> Result<OracleFit> {
            if !self.converge {
                return Err(Error::NonConvergence("singular fit".to_string()));
            }
            let table = RegionTable::from_dataframe(data.clone())?;
            let means = table.region_means()?;
            let cell: Vec<f64> = contrasts.regions().iter().map(|r| means[r]).collect();
            let mut estimates = contrasts.estimate(&cell)?;
            let mut p_values: BTreeMap<String, f64> =
                estimates.keys().map(|k| (k.clone(), 0.01)).collect();
            if let Some(r) = self.drop_region {
                estimates.remove(r);
            }
            if self.nan_p {
                p_values.insert(contrasts.regions()[0].clone(), f64::NAN);
            }
            Ok(OracleFit { estimates, p_values })
        }
    }

    fn table() -> RegionTable {
        let channels = Channels::new(vec![
            Channel::new("A").with_region_label("ctx-lh-cuneus").unwrap(),
            Channel::new("B").with_region_label("ctx-lh-insula").unwrap(),
            Channel::new("C").with_region_label("ctx-rh-lingual").unwrap(),
        ])
        .unwrap();
        let mut builder = RegionTable::builder();
        builder.add_subject("S1", &channels, &[1.0, 2.0, 6.0]).unwrap();
        builder.add_subject("S2", &channels, &[3.0, 2.0, 4.0]).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_fit_folds_intercept() {
        let oracle = Stub { drop_region: None, nan_p: false, converge: true };
        let fit = fit_regions(&oracle, &table(), &ModelSpec::default()).unwrap();
        // Cell means 2, 2, 5: intercept 3 plus each region against the others
        assert_abs_diff_eq!(fit.coefficients["cuneus"], 3.0 + (2.0 - 3.5), epsilon = 1e-12);
        assert_abs_diff_eq!(fit.coefficients["lingual"], 3.0 + (5.0 - 2.0), epsilon = 1e-12);
        assert!(!fit.p_values.contains_key(INTERCEPT));
        assert_eq!(fit.significant(0.05).len(), 3);
        assert_eq!(fit.significant(0.05)[0].0, "cuneus");
    }

    #[test]
    fn test_incomplete_fits_rejected() {
        let missing = Stub { drop_region: Some("insula"), nan_p: false, converge: true };
        assert!(matches!(
            fit_regions(&missing, &table(), &ModelSpec::default()),
            Err(Error::IncompleteFit(_))
        ));
        let nan = Stub { drop_region: None, nan_p: true, converge: true };
        assert!(matches!(
            fit_regions(&nan, &table(), &ModelSpec::default()),
            Err(Error::IncompleteFit(_))
        ));
    }

    #[test]
    fn test_non_convergence_surfaces() {
        let oracle = Stub { drop_region: None, nan_p: false, converge: false };
        assert!(matches!(
            fit_regions(&oracle, &table(), &ModelSpec::default()),
            Err(Error::NonConvergence(_))
        ));
    }
}
