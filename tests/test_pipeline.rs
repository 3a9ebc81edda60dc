//! Integration test: full model card run against the bundled template

use std::fs;
use std::path::PathBuf;

use make_card::config::PipelineConfig;
use make_card::error::CardError;
use make_card::export::ModelCard;
use make_card::pipeline;
use make_card::training::GradientBoostingConfig;
use make_card::visualization::{decode_base64, is_png};
use tempfile::TempDir;

fn bundled_template() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("template/html/my_template.html.jinja")
}

fn quick_config(assets: &TempDir) -> PipelineConfig {
    PipelineConfig::new()
        .with_assets_dir(assets.path())
        .with_template_path(bundled_template())
        .with_random_state(42)
        .with_plot_size(320, 240)
        .with_boosting(GradientBoostingConfig {
            n_estimators: 20,
            ..Default::default()
        })
}

#[test]
fn test_run_writes_card() {
    let assets = TempDir::new().unwrap();
    let report = pipeline::run(&quick_config(&assets)).unwrap();

    assert_eq!(report.output_path, assets.path().join("model_cards/model_card.html"));
    let html = fs::read_to_string(&report.output_path).unwrap();
    assert!(!html.is_empty());
    assert!(html.contains("accuracy"));
    assert!(html.contains("Breast Cancer Wisconsin (Diagnostic) Dataset"));
    assert!(html.contains("426 rows with 30 features"));
    assert!(html.contains("143 rows with 30 features"));
    assert_eq!(html.matches("data:image/png;base64,").count(), 6);

    assert!((0.0..=1.0).contains(&report.accuracy));
    assert!(report.accuracy > 0.8);
    assert_eq!(report.n_train + report.n_test, 569);
    assert_eq!(report.n_features, 30);
}

#[test]
fn test_snapshot_matches_card() {
    let assets = TempDir::new().unwrap();
    let report = pipeline::run(&quick_config(&assets)).unwrap();

    let json = fs::read_to_string(assets.path().join("data/model_card.json")).unwrap();
    let snapshot = ModelCard::from_json(&json).unwrap();
    assert_eq!(snapshot, report.card);

    let recorded = snapshot.metric("accuracy").unwrap();
    assert_eq!(recorded.parse::<f64>().unwrap(), report.accuracy);
    assert_eq!(snapshot.thingstoknow.intervention[0].description, "Assessment");
}

#[test]
fn test_graphics_decode_to_png() {
    let assets = TempDir::new().unwrap();
    let report = pipeline::run(&quick_config(&assets)).unwrap();

    let graphics: Vec<_> = report.card.graphics().collect();
    assert_eq!(graphics.len(), 6);
    for graphic in graphics {
        assert!(!graphic.image.contains('\n'));
        let bytes = decode_base64(&graphic.image).unwrap();
        assert!(is_png(&bytes));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 240));
    }
}

#[test]
fn test_consecutive_runs_both_succeed() {
    let assets = TempDir::new().unwrap();
    let mut config = quick_config(&assets);
    config.random_state = None;

    let first = pipeline::run(&config).unwrap();
    let second = pipeline::run(&config).unwrap();

    assert_eq!(first.output_path, second.output_path);
    assert_ne!(
        first.card.model_details.version.name,
        second.card.model_details.version.name
    );
    let html = fs::read_to_string(&second.output_path).unwrap();
    assert!(html.contains(&second.card.model_details.version.name));
}

#[test]
fn test_missing_template_writes_nothing() {
    let assets = TempDir::new().unwrap();
    let config = quick_config(&assets).with_template_path(assets.path().join("absent.html.jinja"));

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, CardError::IoError(_)));
    assert!(!assets.path().join("model_cards").exists());
    assert!(!assets.path().join("data").exists());
}
