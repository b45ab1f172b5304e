//! Property-based tests for overlap grouping
//!
//! Grouping by union-find over the overlap matrix must agree with a
//! sweep-line merge of the start-sorted intervals.

use proptest::prelude::*;
use spindle_core::{Spindle, SpindleSet};
use spindle_overlap::{group_spindles, overlap_matrix};

/// Reference grouping: sweep sorted intervals, extending the running end
fn sweep_groups(mut intervals: Vec<(f64, f64)>) -> Vec<usize> {
    intervals.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    let mut sizes = Vec::new();
    let mut current_end = f64::NEG_INFINITY;
    for (s, e) in intervals {
        if s <= current_end {
            *sizes.last_mut().unwrap() += 1;
            current_end = current_end.max(e);
        } else {
            sizes.push(1);
            current_end = e;
        }
    }
    sizes
}

fn interval_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0u32..2000, 1u32..60), 0..80).prop_map(|v| {
        v.into_iter()
            .map(|(s, d)| (s as f64 / 10.0, (s + d) as f64 / 10.0))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_grouping_matches_sweep(intervals in interval_strategy()) {
        let set = SpindleSet::new(
            intervals
                .iter()
                .enumerate()
                .map(|(i, &(s, e))| Spindle::new(format!("ch{}", i % 7), s, e))
                .collect(),
        )
        .unwrap();
        let groups = group_spindles(&set).unwrap();
        let sizes: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        prop_assert_eq!(sizes, sweep_groups(intervals.clone()));

        // Groups partition the spindles and come out in start order
        let total: usize = groups.iter().map(|g| g.len()).sum();
        prop_assert_eq!(total, intervals.len());
        for pair in groups.windows(2) {
            prop_assert!(pair[0].span().unwrap().1 < pair[1].span().unwrap().0);
        }
    }

    #[test]
    fn prop_overlap_is_symmetric_and_reflexive(intervals in interval_strategy()) {
        let starts: Vec<f64> = intervals.iter().map(|i| i.0).collect();
        let ends: Vec<f64> = intervals.iter().map(|i| i.1).collect();
        let m = overlap_matrix(&starts, &ends).unwrap();
        for i in 0..m.len() {
            prop_assert!(m.overlaps(i, i));
            for j in 0..m.len() {
                prop_assert_eq!(m.overlaps(i, j), m.overlaps(j, i));
                let (a, b) = (m.order()[i], m.order()[j]);
                let expected = starts[a] <= ends[b] && starts[b] <= ends[a];
                prop_assert_eq!(m.overlaps(i, j), expected);
            }
        }
    }

    #[test]
    fn prop_isolated_matches_count(intervals in interval_strategy()) {
        let starts: Vec<f64> = intervals.iter().map(|i| i.0).collect();
        let ends: Vec<f64> = intervals.iter().map(|i| i.1).collect();
        let m = overlap_matrix(&starts, &ends).unwrap();
        let counts = m.overlap_counts();
        for (i, &c) in counts.iter().enumerate() {
            prop_assert!(c >= 1);
            prop_assert_eq!(c == 1, m.is_isolated(i));
        }
    }
}
