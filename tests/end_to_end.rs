//! End-to-end tests: train on the synthetic dataset, then predict.

mod common;

use common::*;
use party_predictor::dataset::CategoricalCodec;
use party_predictor::io::ArtifactStore;
use party_predictor::{FittedModel, MODEL_ARTIFACT};

#[test]
fn test_train_then_predict() {
    let env = TestEnv::new();
    let pipeline = env.pipeline();

    let report = pipeline.train().unwrap();
    assert_eq!(report.num_classes, 3);
    assert_eq!(report.num_train, 80);
    assert_eq!(report.num_test, 20);
    assert_eq!(report.num_features, 5);
    assert!(report.accuracy > 0.8, "accuracy {}", report.accuracy);

    for name in ["party_label_encoder", "state_label_encoder", MODEL_ARTIFACT] {
        assert!(env.artifact_path(name).is_file(), "missing artifact {}", name);
    }

    let party = pipeline.predict("Kerala", 2019, 60.0, 10.0).unwrap();
    assert!(PARTIES.contains(&party.as_str()));

    for (index, expected) in PARTIES.iter().enumerate() {
        let predicted = pipeline
            .predict("Goa", 1990, turnout_centre(index), 5_000.0)
            .unwrap();
        assert_eq!(&predicted, expected);
    }
}

#[test]
fn test_known_states_are_sorted_and_unique() {
    let env = TestEnv::new();
    let states = env.pipeline().list_known_states().unwrap();

    let mut expected: Vec<String> = STATES.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(states, expected);
}

#[test]
fn test_report_display_and_json() {
    let env = TestEnv::new();
    let report = env.pipeline().train().unwrap();

    let text = report.to_string();
    assert!(text.starts_with("Model Accuracy:"));
    assert!(text.contains("Classification Report:"));
    assert!(text.contains("weighted avg"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["num_classes"], 3);
    assert_eq!(json["feature_importance"].as_array().unwrap().len(), 5);
}

#[test]
fn test_retrain_is_deterministic() {
    let env = TestEnv::new();
    let pipeline = env.pipeline();
    let store = ArtifactStore::new(&env.config.artifact_dir);
    let csv = synthetic_csv(100, 7);

    pipeline.replace_dataset(csv.as_bytes()).unwrap();
    let first_report = pipeline.train().unwrap();
    let first: FittedModel = store.load(MODEL_ARTIFACT).unwrap();
    let first_states: CategoricalCodec = store.load("state_label_encoder").unwrap();

    pipeline.replace_dataset(csv.as_bytes()).unwrap();
    let second_report = pipeline.train().unwrap();
    let second: FittedModel = store.load(MODEL_ARTIFACT).unwrap();
    let second_states: CategoricalCodec = store.load("state_label_encoder").unwrap();

    assert_eq!(first.forest(), second.forest());
    assert_eq!(first.schema(), second.schema());
    assert_eq!(first_states.classes(), second_states.classes());
    assert_eq!(first_report.accuracy, second_report.accuracy);
    assert_eq!(first_report.report, second_report.report);
    assert_ne!(first.run_id(), second.run_id());
}

#[test]
fn test_replace_dataset_then_retrain() {
    let env = TestEnv::new();
    let pipeline = env.pipeline();
    pipeline.train().unwrap();

    let replacement = synthetic_csv(60, 99).replace("Punjab", "Sikkim");
    pipeline.replace_dataset(replacement.as_bytes()).unwrap();
    assert!(pipeline
        .list_known_states()
        .unwrap()
        .contains(&"Sikkim".to_string()));

    // the old state codec does not know the new state until retraining
    let before = pipeline.predict("Sikkim", 2019, 45.0, 10.0);
    assert!(before.unwrap_err().is_unknown_category());

    pipeline.train().unwrap();
    assert!(pipeline.predict("Sikkim", 2019, 45.0, 10.0).is_ok());
}

#[test]
fn test_summary_of_synthetic_dataset() {
    let env = TestEnv::new();
    let summary = env.pipeline().summary().unwrap();

    assert_eq!(summary.num_rows, 100);
    assert_eq!(summary.top_parties.len(), 3);
    assert_eq!(summary.top_parties.iter().map(|c| c.count).sum::<usize>(), 100);
    assert_eq!(summary.top_states.len(), 5);
    assert_eq!(summary.margin_histogram.len(), 30);
    assert_eq!(
        summary.margin_histogram.iter().map(|b| b.count).sum::<usize>(),
        100
    );
    assert!(summary
        .turnout_by_year
        .windows(2)
        .all(|w| w[0].year < w[1].year));
}
