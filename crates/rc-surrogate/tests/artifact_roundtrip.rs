use rc_surrogate::{
    RbfOptions, RbfSurrogate, Surrogate, fit_metrics, load_json, save_json,
    split_training_validation,
};

fn uv_like_rows() -> Vec<(f64, f64)> {
    (0..120)
        .map(|i| {
            let mgd = 1.0 + 4.0 * (i as f64) / 119.0;
            let wiggle = 0.5 * ((i * 7 % 11) as f64 - 5.0) / 5.0;
            (mgd, 15.0 + 32.0 * mgd + wiggle)
        })
        .collect()
}

fn fit(rows: &[(f64, f64)]) -> RbfSurrogate {
    let xs: Vec<Vec<f64>> = rows.iter().map(|r| vec![r.0]).collect();
    let ys: Vec<Vec<f64>> = rows.iter().map(|r| vec![r.1]).collect();
    RbfSurrogate::fit(
        &xs,
        &ys,
        vec!["UV1_mgd".into()],
        vec!["UV1_kW".into()],
        RbfOptions::default(),
    )
    .unwrap()
}

#[test]
fn saved_artifact_reloads_bit_identical() {
    let rows = uv_like_rows();
    let (training, _) = split_training_validation(&rows, 0.8, rows.len() as u64);
    let surrogate = fit(&training);

    let path = std::env::temp_dir().join("rc_surrogate_roundtrip.json");
    save_json(&path, &surrogate).unwrap();
    let loaded = load_json(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, surrogate);
    assert_eq!(loaded.training_inputs(), surrogate.training_inputs());
    assert_eq!(loaded.input_bounds(), surrogate.input_bounds());
    for x in [1.0, 1.757, 2.5, 4.9] {
        assert_eq!(
            loaded.evaluate(&[x]).unwrap(),
            surrogate.evaluate(&[x]).unwrap()
        );
    }
}

#[test]
fn validation_error_is_near_noise_level() {
    let rows = uv_like_rows();
    let (training, validation) = split_training_validation(&rows, 0.8, rows.len() as u64);
    let surrogate = fit(&training);

    let xs: Vec<Vec<f64>> = validation.iter().map(|r| vec![r.0]).collect();
    let ys: Vec<Vec<f64>> = validation.iter().map(|r| vec![r.1]).collect();
    let metrics = fit_metrics(&surrogate, &xs, &ys).unwrap();

    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].samples, validation.len());
    assert!(metrics[0].rmse < 1.5, "rmse {}", metrics[0].rmse);
    assert!(metrics[0].r2 > 0.99);
    assert_eq!(surrogate.output_index("UV1_kW"), Some(0));
}

#[test]
fn corrupted_artifact_is_rejected() {
    let surrogate = fit(&uv_like_rows());
    let mut json: serde_json::Value = serde_json::to_value(&surrogate).unwrap();
    json["kind"] = serde_json::Value::String("kriging".into());
    let path = std::env::temp_dir().join("rc_surrogate_bad_kind.json");
    std::fs::write(&path, json.to_string()).unwrap();
    let result = load_json(&path);
    let _ = std::fs::remove_file(&path);
    assert!(result.is_err());
}
