use approx::assert_abs_diff_eq;
use nalgebra::DMatrix;
use proptest::prelude::*;

use spindle_core::{sequential, Channel, Channels, Correction, Spindle, SpindleSet};
use spindle_direction::{
    DirectionAnalysis, DirectionConfig, DirectionCounts, PermutationTest, RegionsOfInterest,
};

fn regions(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn asymmetric_counts() -> DirectionCounts {
    let m = DMatrix::from_row_slice(
        3,
        3,
        &[0.0, 45.0, 30.0, 15.0, 0.0, 22.0, 28.0, 18.0, 0.0],
    );
    DirectionCounts::from_matrix(regions(&["a", "b", "c"]), &m).unwrap()
}

fn same_bits(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

#[test]
fn test_same_seed_reproduces_report() {
    let config = DirectionConfig::new().with_permutations(300).with_seed(2024);
    let analysis = DirectionAnalysis::new(sequential(), config).unwrap();

    let first = analysis.run(&asymmetric_counts()).unwrap();
    let second = analysis.run(&asymmetric_counts()).unwrap();
    assert!(same_bits(&first.coefficients(), &second.coefficients()));
    assert!(same_bits(&first.p_values(), &second.p_values()));
}

#[test]
fn test_symmetric_counts_have_zero_scores_and_large_p() {
    let m = DMatrix::from_row_slice(3, 3, &[0.0, 20.0, 20.0, 20.0, 0.0, 20.0, 20.0, 20.0, 0.0]);
    let x = DirectionCounts::from_matrix(regions(&["a", "b", "c"]), &m).unwrap();
    let config = DirectionConfig::new()
        .with_permutations(2000)
        .with_seed(11)
        .with_correction(Correction::None);
    let report = DirectionAnalysis::new(sequential(), config).unwrap().run(&x).unwrap();

    for region in &report.regions {
        assert_abs_diff_eq!(region.coefficient, 0.0);
        assert!(region.p_value > 0.8, "p = {}", region.p_value);
    }
    assert!(report.significant().is_empty());
    assert!(report.pairs.is_empty());
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_null_matches_sequential() {
    use spindle_core::ParallelEngine;

    let x = asymmetric_counts();
    let test = PermutationTest::new(400, 0.5, 77).unwrap();
    let seq = test.null_distribution(&x, &sequential()).unwrap();
    let par = test
        .null_distribution(&x, &ParallelEngine::with_num_threads(4).unwrap())
        .unwrap();
    assert_eq!(seq.n_iterations(), par.n_iterations());
    for i in 0..seq.n_iterations() {
        assert!(same_bits(seq.iteration(i), par.iteration(i)));
    }
}

#[test]
fn test_counts_from_recordings_feed_the_analysis() {
    let channels = Channels::new(vec![
        Channel::new("G1").with_region_label("ctx-lh-precentral").unwrap(),
        Channel::new("G2").with_region_label("ctx-rh-precentral").unwrap(),
        Channel::new("S1").with_region_label("ctx-lh-supramarginal").unwrap(),
        Channel::new("H1").with_region_label("Left-Hippocampus").unwrap(),
    ])
    .unwrap();
    let roi = RegionsOfInterest::Discover.resolve([&channels]);
    assert_eq!(roi, regions(&["precentral", "supramarginal"]));

    // Precentral leads supramarginal in every event; the hippocampal
    // spindle has no cortical region
    let mut spindles = Vec::new();
    for k in 0..40 {
        let t = k as f64 * 10.0;
        spindles.push(Spindle::new(if k % 2 == 0 { "G1" } else { "G2" }, t, t + 1.5));
        spindles.push(Spindle::new("S1", t + 0.5, t + 2.0));
        spindles.push(Spindle::new("H1", t + 0.7, t + 1.0));
    }
    let set = SpindleSet::new(spindles).unwrap();

    let mut total = DirectionCounts::zeros(roi.clone());
    for _subject in 0..2 {
        total
            .add(&DirectionCounts::from_spindles(&set, &channels, roi.clone()).unwrap())
            .unwrap();
    }
    assert_eq!(total.get(0, 1), 80);
    assert_eq!(total.get(1, 0), 0);

    // One direction never observed: the ratio is undefined, so is the score
    let config = DirectionConfig::new().with_permutations(100).with_seed(5);
    let report = DirectionAnalysis::new(sequential(), config).unwrap().run(&total).unwrap();
    assert!(!report.insufficient_data);
    assert!(report.regions[0].coefficient.is_nan());
    assert!(report.regions[0].p_value.is_nan());
    assert_eq!(report.regions[0].n_pairs, 80);
}

#[test]
fn test_rejects_invalid_count_matrices() {
    let negative = DMatrix::from_row_slice(2, 2, &[0.0, -3.0, 1.0, 0.0]);
    assert!(DirectionCounts::from_matrix(regions(&["a", "b"]), &negative).is_err());
    let wrong_labels = DMatrix::from_row_slice(2, 2, &[0.0, 3.0, 1.0, 0.0]);
    assert!(DirectionCounts::from_matrix(regions(&["a"]), &wrong_labels).is_err());
}

proptest! {
    #[test]
    fn prop_shuffle_keeps_pair_totals(
        entries in prop::collection::vec(0u64..50, 16),
        seed in any::<u64>(),
        iteration in 0usize..1000,
    ) {
        let m = DMatrix::from_row_slice(4, 4, &entries);
        let x = DirectionCounts::from_counts(regions(&["a", "b", "c", "d"]), m).unwrap();
        let x2 = PermutationTest::new(1, 0.5, seed).unwrap().shuffle(&x, iteration).unwrap();
        for a in 0..4 {
            for b in 0..4 {
                if a != b {
                    prop_assert_eq!(x2[(a, b)] + x2[(b, a)], (x.get(a, b) + x.get(b, a)) as f64);
                    prop_assert!(x2[(a, b)] >= 0.0);
                }
            }
        }
    }
}
