//! End-to-end directionality analysis

use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use spindle_core::{Correction, Error, ExecutionEngine, Result};

use crate::asymmetry::asymmetry_scores;
use crate::counts::DirectionCounts;
use crate::permutation::PermutationTest;
use crate::pvalue::permutation_p_values;
use crate::report::{summarize_pairs, DirectionReport, RegionDirection};

/// Settings of a direction analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionConfig {
    pub n_rnd: usize,
    pub null_probability: f64,
    /// Base seed of the permutation null; drawn at random when unset
    pub seed: Option<u64>,
    pub correction: Correction,
    pub p_threshold: f64,
    pub summary_ratio: f64,
    pub summary_min_count: u64,
}

impl Default for DirectionConfig {
    fn default() -> Self {
        Self {
            n_rnd: 10_000,
            null_probability: 0.5,
            seed: None,
            correction: Correction::Fdr,
            p_threshold: 0.05,
            summary_ratio: 2.0,
            summary_min_count: 100,
        }
    }
}

impl DirectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of permutations
    pub fn with_permutations(mut self, n_rnd: usize) -> Self {
        assert!(n_rnd > 0, "Number of permutations must be positive");
        self.n_rnd = n_rnd;
        self
    }

    /// Set the probability of the forward direction under the null
    pub fn with_null_probability(mut self, p: f64) -> Self {
        assert!((0.0..=1.0).contains(&p), "Null probability must be in [0, 1]");
        self.null_probability = p;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }

    /// Set the significance threshold on corrected p-values
    pub fn with_p_threshold(mut self, p_threshold: f64) -> Self {
        assert!(
            p_threshold > 0.0 && p_threshold <= 1.0,
            "P-value threshold must be in (0, 1]"
        );
        self.p_threshold = p_threshold;
        self
    }

    /// Set the pair summary cut-offs
    pub fn with_pair_summary(mut self, min_ratio: f64, min_count: u64) -> Self {
        assert!(min_ratio >= 1.0, "Summary ratio must be at least 1");
        self.summary_ratio = min_ratio;
        self.summary_min_count = min_count;
        self
    }

    /// Check settings that may have come from deserialization
    pub fn validate(&self) -> Result<()> {
        if self.n_rnd == 0 {
            return Err(Error::InvalidParameter(
                "number of permutations must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.null_probability) {
            return Err(Error::invalid_probability("null probability", self.null_probability));
        }
        if !(self.p_threshold > 0.0 && self.p_threshold <= 1.0) {
            return Err(Error::InvalidParameter(format!(
                "p-value threshold {} must be in (0, 1]",
                self.p_threshold
            )));
        }
        if !(self.summary_ratio >= 1.0) {
            return Err(Error::InvalidParameter(format!(
                "summary ratio {} must be at least 1",
                self.summary_ratio
            )));
        }
        Ok(())
    }
}

/// Direction analysis over summed lead/follow counts
#[derive(Debug, Clone)]
pub struct DirectionAnalysis<E> {
    engine: E,
    config: DirectionConfig,
}

impl<E: ExecutionEngine> DirectionAnalysis<E> {
    pub fn new(engine: E, config: DirectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { engine, config })
    }

    pub fn config(&self) -> &DirectionConfig {
        &self.config
    }

    /// Scores, permutation p-values and pair summary
    ///
    /// Without any lead/follow pair the permutation is skipped and the report
    /// is flagged `insufficient_data`, with NaN scores and p-values.
    #[instrument(skip(self, x), fields(n_regions = x.n_regions(), n_rnd = self.config.n_rnd))]
    pub fn run(&self, x: &DirectionCounts) -> Result<DirectionReport> {
        let n_regions = x.n_regions();
        let total = x.total_pairs();

        if total == 0 {
            warn!(n_regions, "no lead/follow pairs; direction is undefined");
            let regions = x
                .regions()
                .iter()
                .map(|name| RegionDirection {
                    region: name.clone(),
                    coefficient: f64::NAN,
                    p_value: f64::NAN,
                    p_uncorrected: f64::NAN,
                    n_pairs: 0,
                })
                .collect();
            return Ok(DirectionReport {
                regions,
                pairs: Vec::new(),
                insufficient_data: true,
                n_permutations: 0,
                p_threshold: self.config.p_threshold,
            });
        }

        let observed = asymmetry_scores(&x.to_f64());

        let seed = self.config.seed.unwrap_or_else(|| thread_rng().gen());
        debug!(seed, total, "running permutation null");
        let test = PermutationTest::new(self.config.n_rnd, self.config.null_probability, seed)?;
        let null = test.null_distribution(x, &self.engine)?;

        let p_uncorrected = permutation_p_values(&observed, &null);
        let p_values = self.config.correction.adjust(&p_uncorrected);

        let regions: Vec<RegionDirection> = x
            .regions()
            .iter()
            .enumerate()
            .map(|(r, name)| RegionDirection {
                region: name.clone(),
                coefficient: observed[r],
                p_value: p_values[r],
                p_uncorrected: p_uncorrected[r],
                n_pairs: x.pair_count(r),
            })
            .collect();

        let report = DirectionReport {
            regions,
            pairs: summarize_pairs(x, self.config.summary_ratio, self.config.summary_min_count),
            insufficient_data: false,
            n_permutations: null.n_iterations(),
            p_threshold: self.config.p_threshold,
        };

        info!(
            correction = self.config.correction.name(),
            threshold = self.config.p_threshold,
            significant = report.significant().len(),
            "direction analysis complete"
        );
        for region in report.significant() {
            info!("{region}");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;
    use spindle_core::SequentialEngine;

    fn regions(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("region_{i}")).collect()
    }

    #[test]
    fn test_defaults() {
        let config = DirectionConfig::default();
        assert_eq!(config.n_rnd, 10_000);
        assert_eq!(config.null_probability, 0.5);
        assert_eq!(config.correction, Correction::Fdr);
        assert_eq!(config.summary_min_count, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[should_panic(expected = "Number of permutations must be positive")]
    fn test_zero_permutations_panics() {
        let _ = DirectionConfig::new().with_permutations(0);
    }

    #[test]
    fn test_invalid_deserialized_config_rejected() {
        let config = DirectionConfig {
            null_probability: 2.0,
            ..DirectionConfig::default()
        };
        assert!(DirectionAnalysis::new(SequentialEngine::new(), config).is_err());
    }

    #[test]
    fn test_empty_counts_flag_insufficient_data() {
        let analysis =
            DirectionAnalysis::new(SequentialEngine::new(), DirectionConfig::new().with_seed(1))
                .unwrap();
        let report = analysis.run(&DirectionCounts::zeros(regions(3))).unwrap();
        assert!(report.insufficient_data);
        assert_eq!(report.regions.len(), 3);
        assert!(report.coefficients().iter().all(|c| c.is_nan()));
        assert!(report.p_values().iter().all(|p| p.is_nan()));
        assert!(report.significant().is_empty());
    }

    #[test]
    fn test_strong_leader_is_significant() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, 400.0, 100.0, 0.0]);
        let x = DirectionCounts::from_matrix(regions(2), &m).unwrap();
        let config = DirectionConfig::new().with_permutations(500).with_seed(3);
        let report = DirectionAnalysis::new(SequentialEngine::new(), config)
            .unwrap()
            .run(&x)
            .unwrap();

        assert!(!report.insufficient_data);
        assert!(report.regions[0].coefficient > 0.0);
        assert!(report.regions[1].coefficient < 0.0);
        // A 4:1 split of 500 pairs is far outside Binomial(500, 0.5)
        assert_eq!(report.regions[0].p_uncorrected, 0.0);
        assert_eq!(report.significant().len(), 2);
        assert_eq!(report.regions[0].n_pairs, 500);
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.pairs[0].ratio, 4.0);
    }
}
