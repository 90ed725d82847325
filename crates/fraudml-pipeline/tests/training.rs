use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use fraudml_core::{FEATURE_NAMES, LABEL_COLUMN, NUM_FEATURES};
use fraudml_model_selection::BoosterParamGrid;
use fraudml_pipeline::{run_training, ArtifactPaths, PipelineError, ScoringPipeline, TrainingConfig, TrainingParams};
use fraudml_tree::BoosterParams;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const V4: usize = 4;
const V14: usize = 14;

/// Synthetic transactions: fraud rows have strongly negative V14 and
/// positive V4, everything else is uniform noise. A few rows carry gaps.
fn write_dataset(path: &Path, n: usize) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut out = String::new();
    let mut header: Vec<&str> = FEATURE_NAMES.to_vec();
    header.push(LABEL_COLUMN);
    out.push_str(&header.join(","));
    out.push('\n');

    for i in 0..n {
        let fraud = i % 10 == 0;
        let mut row: Vec<String> = (0..NUM_FEATURES)
            .map(|j| {
                let mut v: f64 = rng.gen_range(-1.0..1.0);
                if fraud && j == V14 {
                    v -= 5.0;
                }
                if fraud && j == V4 {
                    v += 4.0;
                }
                if j == 0 {
                    v = i as f64;
                }
                if j == NUM_FEATURES - 1 {
                    v = rng.gen_range(0.0..500.0);
                }
                format!("{v:.6}")
            })
            .collect();
        if i % 97 == 3 {
            row[7] = "NA".to_string();
        }
        row.push(if fraud { "1" } else { "0" }.to_string());
        out.push_str(&row.join(","));
        out.push('\n');
    }
    fs::write(path, out).unwrap();
}

fn config(data: &Path, out: &Path) -> TrainingConfig {
    TrainingConfig {
        paths: ArtifactPaths {
            data: data.to_path_buf(),
            model: out.join("ml_model").join("fraud_model.json"),
            scaler: out.join("ml_model").join("scaler.json"),
            reports_dir: out.join("reports"),
        },
        params: TrainingParams {
            sample_size: 400,
            n_iter: 3,
            grid: BoosterParamGrid {
                n_estimators: vec![5, 10],
                max_depth: vec![2],
                learning_rate: vec![0.3],
                subsample: vec![0.7, 1.0],
                colsample_bytree: vec![1.0],
                gamma: vec![0.0],
                scale_pos_weight: vec![1.0, 5.0],
                base: BoosterParams::default(),
            },
            ..Default::default()
        },
    }
}

#[test]
fn test_training_writes_artifacts_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("creditcard.csv");
    write_dataset(&data, 400);
    let config = config(&data, dir.path());

    let summary = run_training(&config).unwrap();
    assert_eq!(summary.dropped_rows, 5);
    assert_eq!(summary.loaded_rows, 395);
    assert_eq!(summary.sampled_rows, 400);
    assert_eq!(summary.test_rows, 80);
    assert_eq!(summary.train_rows, 320);

    // oversampling touched the training partition only
    let counts = &summary.resampled_class_counts;
    assert_eq!(counts[&0], counts[&1]);
    assert_eq!(summary.test_class_counts.values().sum::<usize>(), summary.test_rows);
    assert_eq!(summary.sampled_class_counts.values().sum::<usize>(), summary.sampled_rows);

    // the test partition keeps the sample's fraud share, up to one row of rounding
    let sampled_share = summary.sampled_class_counts[&1] as f64 / summary.sampled_rows as f64;
    let expected_fraud = sampled_share * summary.test_rows as f64;
    assert_abs_diff_eq!(summary.test_class_counts[&1] as f64, expected_fraud, epsilon = 1.0);

    for path in [&summary.model_path, &summary.scaler_path, &summary.predictions_path, &summary.top_features_path] {
        assert!(path.exists(), "{} missing", path.display());
    }

    let predictions = fs::read_to_string(&summary.predictions_path).unwrap();
    let mut lines = predictions.lines();
    assert!(lines.next().unwrap().ends_with("Amount,Actual,Predicted,Probability"));
    assert_eq!(lines.count(), summary.test_rows);

    let top = fs::read_to_string(&summary.top_features_path).unwrap();
    let rows: Vec<(String, f64)> = top
        .lines()
        .skip(1)
        .map(|l| {
            let (name, imp) = l.split_once(',').unwrap();
            (name.to_string(), imp.parse().unwrap())
        })
        .collect();
    assert_eq!(rows.len(), 10);
    assert!(rows.windows(2).all(|w| w[0].1 >= w[1].1));
    assert!(rows[..2].iter().any(|(name, _)| name == "V14" || name == "V4"));

    assert!(summary.best_cv_auc > 0.9);
    assert!(summary.test_auc.unwrap() > 0.9);
}

#[test]
fn test_training_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("creditcard.csv");
    write_dataset(&data, 400);

    let first = run_training(&config(&data, &dir.path().join("a"))).unwrap();
    let second = run_training(&config(&data, &dir.path().join("b"))).unwrap();

    let pairs = [
        (&first.model_path, &second.model_path),
        (&first.scaler_path, &second.scaler_path),
        (&first.predictions_path, &second.predictions_path),
        (&first.top_features_path, &second.top_features_path),
    ];
    for (a, b) in pairs {
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap(), "{} differs", a.display());
    }
}

#[test]
fn test_trained_artifacts_load_into_scoring_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("creditcard.csv");
    write_dataset(&data, 400);
    let summary = run_training(&config(&data, dir.path())).unwrap();

    let pipeline = ScoringPipeline::load(&summary.scaler_path, &summary.model_path).unwrap();
    assert_eq!(pipeline.n_features(), NUM_FEATURES);

    let mut legit = vec![0.0; NUM_FEATURES];
    legit[NUM_FEATURES - 1] = 120.0;
    let mut fraud = legit.clone();
    fraud[V14] = -5.0;
    fraud[V4] = 4.0;

    let legit = pipeline.predict_one(&legit).unwrap();
    let fraud = pipeline.predict_one(&fraud).unwrap();
    assert!(fraud.risk_score > legit.risk_score);
    assert_eq!(fraud.label, 1);
    assert_eq!(legit.label, 0);
}

#[test]
fn test_missing_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir.path().join("absent.csv"), dir.path());
    assert!(matches!(run_training(&config), Err(PipelineError::Io(_))));
    assert!(!config.paths.scaler.exists());
}
