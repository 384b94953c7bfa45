//! Fitting the UV power surrogate to the reactor history.

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use proptest::prelude::*;
use rc_batch::{Table, TrainerConfig, train_and_save, train_surrogate};
use rc_surrogate::{Surrogate, load_json};

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn uv_config() -> TrainerConfig {
    TrainerConfig {
        max_rows: Some(100),
        ..TrainerConfig::default()
    }
}

#[test]
fn uv_history_fits_reactor_power() {
    let table = Table::read(&data_dir().join("WRD_UV_Surrogate_Data.csv")).unwrap();
    let (s, report) = train_surrogate(&table, &uv_config()).unwrap();
    assert_eq!(report.input_label, "UV1_mgd");
    assert_eq!(report.output_label, "UV1_kW");
    assert_eq!(report.rows_read, 100);
    assert_eq!(report.rows_used, 97);
    assert_eq!(report.training_rows, 77);
    assert!(report.validation.unwrap().r2 > 0.9);

    let kw = s.evaluate(&[1.757]).unwrap()[0];
    assert_relative_eq!(kw, 18.0 + 13.5 * 1.757, max_relative = 0.05);
}

#[test]
fn saved_artifact_evaluates_like_the_fit() {
    let csv = data_dir().join("WRD_UV_Surrogate_Data.csv");
    let artifact = std::env::temp_dir().join(format!("rc-batch-uv-{}.json", std::process::id()));
    train_and_save(&csv, &artifact, &uv_config()).unwrap();
    let loaded = load_json(&artifact).unwrap();
    std::fs::remove_file(&artifact).unwrap();

    let (fitted, _) = train_surrogate(&Table::read(&csv).unwrap(), &uv_config()).unwrap();
    for q in [1.2, 2.5, 4.0] {
        assert_relative_eq!(
            loaded.evaluate(&[q]).unwrap()[0],
            fitted.evaluate(&[q]).unwrap()[0],
            max_relative = 1e-12
        );
    }
}

fn linear_table(n: usize) -> Table {
    let mut text = String::from("DateTime,UV1_mgd,UV2_mgd,UV1_kW,UV2_kW\n");
    for k in 0..n {
        let q = 1.0 + 0.05 * k as f64;
        text.push_str(&format!("8/1/2021 0:{:02},{q},0,{},0\n", k % 60, 18.0 + 13.5 * q));
    }
    Table::from_reader(text.as_bytes()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn training_share_follows_fraction(n in 5usize..60, fraction in 0.5f64..0.9) {
        let config = TrainerConfig { training_fraction: fraction, ..TrainerConfig::default() };
        let (_, report) = train_surrogate(&linear_table(n), &config).unwrap();
        prop_assert_eq!(report.rows_used, n);
        prop_assert_eq!(report.training_rows, ((n as f64) * fraction).floor() as usize);
    }
}
