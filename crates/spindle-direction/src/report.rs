//! Direction analysis results

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;

use spindle_core::pretty_region_name;

use crate::counts::DirectionCounts;

/// Result for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDirection {
    pub region: String,
    /// Asymmetry score `d`; positive when the region tends to lead
    pub coefficient: f64,
    /// Corrected p-value
    pub p_value: f64,
    pub p_uncorrected: f64,
    /// Pairs with any other region, either direction
    pub n_pairs: u64,
}

impl RegionDirection {
    /// Lead/follow odds as `A:1` (leads) or `1:A` (follows)
    pub fn odds(&self) -> String {
        if self.coefficient > 0.0 {
            format!("{:5.3}:1", self.coefficient.exp())
        } else {
            format!("1:{:5.3}", (-self.coefficient).exp())
        }
    }
}

impl fmt::Display for RegionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:30} coef = {:7}, p-value = {:.3} ({} pairs)",
            self.region,
            self.odds(),
            self.p_value,
            self.n_pairs
        )
    }
}

/// A strongly directional pair of regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairSummary {
    /// Human-readable name of the leading region
    pub from: String,
    pub to: String,
    /// `x[from, to] + x[to, from]`
    pub count: u64,
    /// `x[from, to] / x[to, from]`
    pub ratio: f64,
}

impl fmt::Display for PairSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<30} {:<30}{:17} {:10.2}:1",
            self.from, self.to, self.count, self.ratio
        )
    }
}

/// Ordered pairs with `ratio > min_ratio` and `count >= min_count`, by
/// descending ratio
///
/// Pairs where either direction was never observed have no defined ratio and
/// are left out.
pub fn summarize_pairs(x: &DirectionCounts, min_ratio: f64, min_count: u64) -> Vec<PairSummary> {
    let r = x.n_regions();
    let mut pairs: Vec<PairSummary> = Vec::new();
    for a in 0..r {
        for b in 0..r {
            if a == b {
                continue;
            }
            let (forward, backward) = (x.get(a, b), x.get(b, a));
            let ratio = forward as f64 / backward as f64;
            if !ratio.is_finite() || ratio <= min_ratio {
                continue;
            }
            let count = forward + backward;
            if count >= min_count {
                pairs.push(PairSummary {
                    from: pretty_region_name(&x.regions()[a]),
                    to: pretty_region_name(&x.regions()[b]),
                    count,
                    ratio,
                });
            }
        }
    }
    pairs.sort_by_key(|p| std::cmp::Reverse(OrderedFloat(p.ratio)));
    pairs
}

/// Full output of a direction analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionReport {
    /// One entry per region of interest, in region order
    pub regions: Vec<RegionDirection>,
    pub pairs: Vec<PairSummary>,
    /// No lead/follow pairs were counted; all scores and p-values are NaN
    pub insufficient_data: bool,
    pub n_permutations: usize,
    pub p_threshold: f64,
}

impl DirectionReport {
    /// Regions with corrected p below the threshold, by descending
    /// `|coefficient|`
    pub fn significant(&self) -> Vec<&RegionDirection> {
        let mut hits: Vec<&RegionDirection> = self
            .regions
            .iter()
            .filter(|r| r.p_value < self.p_threshold)
            .collect();
        hits.sort_by_key(|r| std::cmp::Reverse(OrderedFloat(r.coefficient.abs())));
        hits
    }

    pub fn region(&self, name: &str) -> Option<&RegionDirection> {
        self.regions.iter().find(|r| r.region == name)
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.regions.iter().map(|r| r.coefficient).collect()
    }

    pub fn p_values(&self) -> Vec<f64> {
        self.regions.iter().map(|r| r.p_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn region(name: &str, coefficient: f64, p_value: f64) -> RegionDirection {
        RegionDirection {
            region: name.to_string(),
            coefficient,
            p_value,
            p_uncorrected: p_value,
            n_pairs: 10,
        }
    }

    #[test]
    fn test_odds_formatting() {
        assert_eq!(region("a", 2.0f64.ln(), 0.0).odds(), "2.000:1");
        assert_eq!(region("a", -(4.0f64.ln()), 0.0).odds(), "1:4.000");
        assert_eq!(region("a", 0.0, 0.0).odds(), "1:1.000");
    }

    #[test]
    fn test_significant_sorted_by_magnitude() {
        let report = DirectionReport {
            regions: vec![
                region("a", 0.2, 0.01),
                region("b", -0.9, 0.02),
                region("c", 1.5, 0.2),
                region("d", 0.5, f64::NAN),
                region("e", -0.4, 0.001),
            ],
            pairs: Vec::new(),
            insufficient_data: false,
            n_permutations: 100,
            p_threshold: 0.05,
        };
        let names: Vec<&str> = report.significant().iter().map(|r| r.region.as_str()).collect();
        assert_eq!(names, vec!["b", "e", "a"]);
    }

    #[test]
    fn test_pair_summary() {
        let regions = vec![
            "superiorfrontal_1".to_string(),
            "insula".to_string(),
            "cuneus".to_string(),
        ];
        let m = DMatrix::from_row_slice(3, 3, &[0.0, 300.0, 50.0, 100.0, 0.0, 0.0, 10.0, 90.0, 0.0]);
        let x = DirectionCounts::from_matrix(regions, &m).unwrap();
        let pairs = summarize_pairs(&x, 2.0, 100);
        // superiorfrontal → insula 3:1 over 400; cuneus → insula undefined;
        // superiorfrontal → cuneus 5:1 over 60 is too rare
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].from, "superior frontal (1)");
        assert_eq!(pairs[0].to, "insula");
        assert_eq!(pairs[0].count, 400);
        assert_eq!(pairs[0].ratio, 3.0);

        let all = summarize_pairs(&x, 2.0, 0);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].ratio, 5.0);
    }
}
