use spindle_core::execution::{auto_engine, sequential, ExecutionEngine};

#[test]
fn test_auto_engine_matches_feature() {
    let engine = auto_engine();

    #[cfg(feature = "parallel")]
    {
        assert!(
            engine.is_parallel(),
            "auto_engine() should create a parallel engine when parallel feature is enabled"
        );
        let results = engine.execute_batch(4, |i| {
            std::thread::sleep(std::time::Duration::from_millis(5));
            i * 10
        });
        assert_eq!(results, vec![0, 10, 20, 30]);
    }

    #[cfg(not(feature = "parallel"))]
    {
        assert!(!engine.is_parallel());
        assert_eq!(engine.num_threads(), 1);
    }
}

#[test]
fn test_engines_agree_on_fallible_batches() {
    let f = |i: usize| -> Result<u64, String> { Ok((i as u64).pow(2) % 7) };
    let expected = sequential().try_execute_batch(500, f).unwrap();
    let got = auto_engine().try_execute_batch(500, f).unwrap();
    assert_eq!(got, expected);
}
