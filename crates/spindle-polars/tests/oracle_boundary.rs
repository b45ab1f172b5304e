mod common;

use approx::assert_abs_diff_eq;
use polars::prelude::*;

use common::{channels, CellMeansOracle};
use spindle_core::Correction;
use spindle_polars::{fit_regions, ModelSpec, RegionTable, DEFAULT_FORMULA, VALUE};

#[test]
fn test_table_to_region_fit() {
    let mut builder = RegionTable::builder();
    for (subject, shift) in [("S01", 0.0), ("S02", 1.0), ("S03", -1.0)] {
        let values = [2.0 + shift, 4.0 + shift, 0.0 + shift, 9.0 + shift, 100.0];
        assert_eq!(builder.add_subject(subject, &channels(), &values).unwrap(), 4);
    }
    let table = builder.build().unwrap();
    assert_eq!(table.len(), 12);
    assert_eq!(table.subjects().unwrap(), vec!["S01", "S02", "S03"]);
    assert_eq!(
        table.regions().unwrap(),
        vec!["fusiform_2", "precuneus", "superiorfrontal_1"]
    );

    let oracle = CellMeansOracle::default();
    let fit = fit_regions(&oracle, &table, &ModelSpec::default()).unwrap();

    // Cell means: fusiform 9, precuneus 0, superiorfrontal 3; intercept 4
    assert_abs_diff_eq!(fit.coefficients["fusiform_2"], 4.0 + 9.0 - 1.5, epsilon = 1e-12);
    assert_abs_diff_eq!(fit.coefficients["precuneus"], 4.0 - 6.0, epsilon = 1e-12);
    assert_eq!(fit.p_values.len(), 3);

    let seen = oracle.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[(DEFAULT_FORMULA.to_string(), 12)]);
}

#[test]
fn test_model_spec_reaches_oracle() {
    let mut builder = RegionTable::builder();
    builder.add_subject("S01", &channels(), &[1.0, 1.0, 2.0, 3.0, 0.0]).unwrap();
    let table = builder.build().unwrap();

    let spec = ModelSpec::new()
        .with_formula("value ~ 0 + region + (1|subj) + (1|elec)")
        .with_correction(Correction::Bonferroni);
    let oracle = CellMeansOracle::default();
    fit_regions(&oracle, &table, &spec).unwrap();
    assert_eq!(
        oracle.seen.lock().unwrap()[0].0,
        "value ~ 0 + region + (1|subj) + (1|elec)"
    );
}

#[test]
fn test_external_frame_is_validated() {
    let df = df!(
        "subj" => ["S01", "S01", "S02"],
        "region" => ["insula", "cuneus", "insula"],
        "elec" => ["A", "B", "A"],
        "value" => [0.5f32, 1.5, 2.5],
    )
    .unwrap();
    let table = RegionTable::from_dataframe(df).unwrap();
    let means = table.region_means().unwrap();
    assert_abs_diff_eq!(means["insula"], 1.5, epsilon = 1e-6);

    let values: Vec<f64> = table
        .dataframe()
        .column(VALUE)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(values.len(), 3);
}
