//! Multiple-comparison correction of p-values

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

/// Multiple-comparison correction method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Correction {
    /// Benjamini-Hochberg false discovery rate
    #[default]
    Fdr,
    /// Family-wise Bonferroni
    Bonferroni,
    /// No correction (values are still capped at 1)
    None,
}

impl Correction {
    /// Get the name of this method
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fdr => "fdr",
            Self::Bonferroni => "bonferroni",
            Self::None => "none",
        }
    }

    /// Adjust a family of p-values
    ///
    /// NaN entries are left as NaN and do not count towards the family size.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use spindle_core::Correction;
    ///
    /// let adjusted = Correction::Bonferroni.adjust(&[0.01, 0.2, f64::NAN]);
    /// assert_eq!(adjusted[0], 0.02);
    /// assert_eq!(adjusted[1], 0.4);
    /// assert!(adjusted[2].is_nan());
    /// ```
    pub fn adjust(&self, p_values: &[f64]) -> Vec<f64> {
        let defined: Vec<usize> = (0..p_values.len())
            .filter(|&i| !p_values[i].is_nan())
            .collect();
        let n = defined.len() as f64;
        let mut adjusted = vec![f64::NAN; p_values.len()];

        match self {
            Self::None => {
                for &i in &defined {
                    adjusted[i] = p_values[i].min(1.0);
                }
            }
            Self::Bonferroni => {
                for &i in &defined {
                    adjusted[i] = (p_values[i] * n).min(1.0);
                }
            }
            Self::Fdr => {
                // Step-up: walk from the largest p-value down, keeping the
                // running minimum of p * n / rank.
                let mut order = defined;
                order.sort_by_key(|&i| std::cmp::Reverse(OrderedFloat(p_values[i])));
                let mut running = f64::INFINITY;
                for (k, &i) in order.iter().enumerate() {
                    let rank = n - k as f64;
                    running = running.min(p_values[i] * n / rank);
                    adjusted[i] = running.min(1.0);
                }
            }
        }
        adjusted
    }
}

impl FromStr for Correction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fdr" | "bh" => Ok(Self::Fdr),
            "bonferroni" => Ok(Self::Bonferroni),
            "none" => Ok(Self::None),
            other => Err(Error::InvalidParameter(format!(
                "Unknown p-value correction '{other}'"
            ))),
        }
    }
}
