//! Property-based tests for NaN-aware reductions and p-value correction

use proptest::prelude::*;
use spindle_core::nan::{nanmean, nanmedian, percentile, ratio};
use spindle_core::Correction;

fn values_with_nan() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![3 => -1000.0f64..1000.0, 1 => Just(f64::NAN)], 0..50)
}

fn p_values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(prop_oneof![4 => 0.0f64..=1.0, 1 => Just(f64::NAN)], 0..40)
}

fn defined(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| !x.is_nan()).collect()
}

proptest! {
    #[test]
    fn prop_reductions_stay_within_defined_range(data in values_with_nan(), q in 0.0f64..=100.0) {
        let values = defined(&data);
        if values.is_empty() {
            prop_assert!(nanmean(&data).is_nan());
            prop_assert!(nanmedian(&data).is_nan());
            prop_assert!(percentile(&data, q).is_nan());
        } else {
            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            for v in [nanmean(&data), nanmedian(&data), percentile(&data, q)] {
                prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
            }
            prop_assert_eq!(percentile(&data, 0.0), lo);
            prop_assert_eq!(percentile(&data, 100.0), hi);
            prop_assert!((percentile(&data, 50.0) - nanmedian(&data)).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_percentile_is_monotone(data in values_with_nan(), a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        prop_assume!(!defined(&data).is_empty());
        let (q_lo, q_hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(percentile(&data, q_lo) <= percentile(&data, q_hi) + 1e-9);
    }

    #[test]
    fn prop_ratio_is_never_infinite(num in -10.0f64..10.0, den in prop_oneof![Just(0.0f64), -10.0f64..10.0]) {
        let r = ratio(num, den);
        prop_assert!(r.is_finite() || r.is_nan());
    }

    #[test]
    fn prop_correction_bounds(p in p_values()) {
        let none = Correction::None.adjust(&p);
        let fdr = Correction::Fdr.adjust(&p);
        let bonferroni = Correction::Bonferroni.adjust(&p);

        for i in 0..p.len() {
            if p[i].is_nan() {
                prop_assert!(none[i].is_nan() && fdr[i].is_nan() && bonferroni[i].is_nan());
                continue;
            }
            prop_assert_eq!(none[i], p[i]);
            prop_assert!(fdr[i] >= p[i] - 1e-12);
            prop_assert!(fdr[i] <= bonferroni[i]);
            prop_assert!(bonferroni[i] <= 1.0);
        }
    }
}
