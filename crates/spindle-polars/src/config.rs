//! Model configuration

use serde::{Deserialize, Serialize};

use spindle_core::Correction;

/// Default random-intercept model: one fixed effect per region, subjects as
/// a random intercept
pub const DEFAULT_FORMULA: &str = "value ~ 0 + region + (1|subj)";

/// What the oracle is asked to fit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub formula: String,
    /// Correction the oracle applies across the region contrasts
    pub correction: Correction,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            formula: DEFAULT_FORMULA.to_string(),
            correction: Correction::Fdr,
        }
    }
}

impl ModelSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = formula.into();
        self
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }
}
