//! Two-sided permutation p-values

use crate::permutation::NullDistribution;

/// `2 · min(P(null ≥ d), P(null ≤ d))`, capped at 1
///
/// Fractions are over all iterations; NaN null samples never satisfy either
/// comparison. A NaN observed score gives a NaN p-value.
///
/// ```rust
/// use spindle_direction::two_sided_p_value;
///
/// let null = [-2.0, -1.0, 0.0, 1.0, 2.0];
/// assert_eq!(two_sided_p_value(2.0, null.iter().copied()), 0.4);
/// assert_eq!(two_sided_p_value(0.0, null.iter().copied()), 1.0);
/// assert!(two_sided_p_value(f64::NAN, null.iter().copied()).is_nan());
/// ```
pub fn two_sided_p_value<I>(observed: f64, null: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    if observed.is_nan() {
        return f64::NAN;
    }
    let (mut n, mut above, mut below) = (0usize, 0usize, 0usize);
    for v in null {
        n += 1;
        if v >= observed {
            above += 1;
        }
        if v <= observed {
            below += 1;
        }
    }
    if n == 0 {
        return f64::NAN;
    }
    let tail = above.min(below) as f64 / n as f64;
    (2.0 * tail).min(1.0)
}

/// Uncorrected p-value of every region
pub fn permutation_p_values(observed: &[f64], null: &NullDistribution) -> Vec<f64> {
    observed
        .iter()
        .enumerate()
        .map(|(r, &d)| two_sided_p_value(d, null.region(r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tails() {
        let null: Vec<f64> = (0..100).map(|i| i as f64).collect();
        // 5 values ≥ 95
        assert_eq!(two_sided_p_value(95.0, null.iter().copied()), 0.1);
        // 3 values ≤ 2
        assert_eq!(two_sided_p_value(2.0, null.iter().copied()), 0.06);
        // Beyond the null
        assert_eq!(two_sided_p_value(1000.0, null.iter().copied()), 0.0);
    }

    #[test]
    fn test_nan_null_samples_never_count() {
        let null = [f64::NAN, f64::NAN, 1.0, 3.0];
        // One of four samples ≥ 3, two ≤ 3
        assert_eq!(two_sided_p_value(3.0, null.iter().copied()), 0.5);
        assert!(two_sided_p_value(1.0, std::iter::empty()).is_nan());
    }
}
