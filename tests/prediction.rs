//! Prediction boundary tests.

mod common;

use common::*;
use party_predictor::dataset::{CategoricalCodec, CsvLoader};
use party_predictor::io::ArtifactStore;
use party_predictor::{
    ClassifierTrainer, FeatureAssembler, FittedModel, PipelineError, Predictor, Query,
    TrainingSchema, MODEL_ARTIFACT,
};

fn schema(columns: &[&str]) -> TrainingSchema {
    TrainingSchema::new(columns.iter().map(|c| c.to_string()).collect()).unwrap()
}

#[test]
fn test_assembled_row_matches_documented_example() {
    let schema = schema(&["state", "year", "Turnout", "margin", "electors"]);
    let states = CategoricalCodec::fit("state", ["Kerala", "X", "Goa"]);
    let code = states.encode("X").unwrap() as f64;

    let row = FeatureAssembler::new(&schema, &states)
        .assemble(&Query::new("X", 2019, 60.0, 10.0))
        .unwrap();
    assert_eq!(row.to_vec(), vec![code, 2019.0, 60.0, 10.0, 0.0]);
}

#[test]
fn test_assembled_row_ignores_supply_order() {
    let schema = schema(&["electors", "margin", "Turnout", "year", "state"]);
    let states = CategoricalCodec::fit("state", ["Kerala", "X"]);
    let assembler = FeatureAssembler::new(&schema, &states);

    let supplied = [("state", 1.0), ("year", 2019.0), ("Turnout", 60.0), ("margin", 10.0)];
    let mut reversed = supplied;
    reversed.reverse();

    let a = assembler.assemble_values(supplied).unwrap();
    let b = assembler.assemble_values(reversed).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_vec(), vec![0.0, 10.0, 60.0, 2019.0, 1.0]);
}

#[test]
fn test_unknown_state_is_reported() {
    let env = TestEnv::new();
    let pipeline = env.pipeline();
    pipeline.train().unwrap();

    let err = pipeline.predict("Atlantis", 2019, 60.0, 10.0).unwrap_err();
    assert!(err.is_unknown_category());
    assert!(err.cause().is_recoverable());
    assert!(err.to_string().contains("Atlantis"));
}

#[test]
fn test_dataset_schema_change_is_reported() {
    let env = TestEnv::new();
    let pipeline = env.pipeline();
    pipeline.train().unwrap();

    let renamed = synthetic_csv(30, 3).replacen("electors", "votes", 1);
    pipeline.replace_dataset(renamed.as_bytes()).unwrap();

    let err = pipeline.predict("Kerala", 2019, 60.0, 10.0).unwrap_err();
    assert!(err.is_schema_mismatch());
    assert!(matches!(err.cause(), PipelineError::SchemaMismatch { .. }));
}

#[test]
fn test_predictor_probabilities() {
    let env = TestEnv::new();
    env.pipeline().train().unwrap();

    let predictor = Predictor::from_config(&env.config);
    let query = Query::new("Assam", 2004, turnout_centre(2), 1_000.0);
    let ranked = predictor.predict_proba(&query).unwrap();

    assert_eq!(ranked.len(), 3);
    let total: f64 = ranked.iter().map(|(_, p)| p).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    assert_eq!(ranked[0].0, predictor.predict(&query).unwrap());
}

#[test]
fn test_loaded_model_exposes_codecs() {
    let env = TestEnv::new();
    env.pipeline().train().unwrap();

    let loaded = Predictor::from_config(&env.config).load().unwrap();
    assert_eq!(loaded.state_codec().column(), "state");
    assert_eq!(loaded.label_codec().column(), "party");
    assert_eq!(loaded.label_codec().len(), 3);
    assert_eq!(
        loaded.model().schema().columns(),
        ["state", "year", "Turnout", "margin", "electors"]
    );
    // label codes follow first-seen order of the dataset
    assert_eq!(loaded.label_codec().classes(), PARTIES);
}

#[test]
fn test_model_with_categorical_turnout_is_rejected() {
    let env = TestEnv::new();
    let store = ArtifactStore::new(&env.config.artifact_dir);
    let table = CsvLoader::default()
        .load_table(&env.config.dataset_path)
        .unwrap();
    let trained = ClassifierTrainer::new(env.config.clone(), store.clone())
        .fit(&table)
        .unwrap();

    let mut codecs = trained.model.feature_codecs().clone();
    codecs.insert("Turnout".to_string(), "Turnout_label_encoder".to_string());
    let model = FittedModel::new(
        trained.model.forest().clone(),
        trained.model.schema().clone(),
        trained.model.label_column().to_string(),
        trained.model.label_codec().to_string(),
        codecs,
        trained.model.run_id(),
    )
    .unwrap();
    store.save(MODEL_ARTIFACT, &model).unwrap();

    let err = Predictor::from_config(&env.config)
        .predict(&Query::new("Kerala", 2019, 60.0, 10.0))
        .unwrap_err();
    assert!(err.is_schema_mismatch());
    assert!(err.to_string().contains("Turnout"));
}
