//! End-to-end model card generation
//!
//! Template load, data split, boosting fit, plots, metrics, card population
//! and export, in that order. The template is read before anything else so a
//! bad path fails the run before any file is written.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use tracing::info;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::data::{load_breast_cancer, train_test_split, Partition};
use crate::error::Result;
use crate::export::{
    Dataset, Description, Graphic, GraphicsCollection, ModelCard, ModelCardToolkit, Owner,
    PerformanceMetric, Reference, Risk,
};
use crate::training::{
    accuracy_score, confusion_matrix, roc_curve, round_to, GradientBoostingClassifier,
};
use crate::visualization::{
    confusion_matrix_plot, distribution_plot, encode_png_base64, roc_plot, PlotConfig,
};

/// Features whose per-class distributions are plotted for each partition
pub const PLOTTED_FEATURES: [&str; 2] = ["mean radius", "mean texture"];

const CARD_NAME: &str = "Breast Cancer Wisconsin (Diagnostic) Dataset";
const CARD_OVERVIEW: &str =
    "This model predicts whether breast cancer is benign or malignant based on image measurements.";
const REFERENCES: [&str; 2] = [
    "https://archive.ics.uci.edu/ml/datasets/Breast+Cancer+Wisconsin+(Diagnostic)",
    "https://minds.wisconsin.edu/bitstream/handle/1793/59692/TR1131.pdf",
];

/// Summary of one run
#[derive(Debug, Clone)]
pub struct CardReport {
    pub output_path: PathBuf,
    pub snapshot_path: PathBuf,
    /// Test accuracy rounded to four decimal places
    pub accuracy: f64,
    pub roc_auc: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub elapsed_secs: f64,
    pub card: ModelCard,
}

/// Distribution plots of one partition, one graphic per plotted feature
fn partition_graphics(
    partition: &Partition,
    side: &str,
    class_names: &[String],
    plot: &PlotConfig,
) -> Result<Dataset> {
    let labels = partition.target_vector()?.to_vec();
    let mut collection = Vec::with_capacity(PLOTTED_FEATURES.len());
    for feature in PLOTTED_FEATURES {
        let values = partition.feature_column(feature)?;
        let title = format!("{} ({})", feature, side);
        let png = distribution_plot(&values, &labels, class_names, feature, &title, plot)?;
        collection.push(Graphic::new(title, encode_png_base64(&png)));
    }

    Ok(Dataset {
        name: Some(side.to_string()),
        graphics: GraphicsCollection {
            description: format!(
                "{} rows with {} features",
                partition.n_rows(),
                partition.n_features()
            ),
            collection,
        },
    })
}

/// Metric values print the way a float prints in reports: `0.972`, `1.0`
fn metric_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn describe_model(card: &mut ModelCard) {
    let details = &mut card.model_details;
    details.name = CARD_NAME.to_string();
    details.overview = CARD_OVERVIEW.to_string();
    details.owners = vec![Owner::new("Model Cards Team", "model-cards@google.com")];
    details.references = REFERENCES.iter().map(|r| Reference::new(*r)).collect();
    details.version.name = Uuid::new_v4().to_string();
    details.version.date = Local::now().format("%Y-%m-%d").to_string();

    let considerations = &mut card.considerations;
    considerations.ethical_considerations = vec![Risk::new(
        "Manual selection of image sections to digitize could create selection bias",
        "Automate the selection process",
    )];
    considerations.limitations = vec![Description::new("Breast cancer diagnosis")];
    considerations.use_cases = vec![Description::new("Breast cancer diagnosis")];
    considerations.users = vec![
        Description::new("Medical professionals"),
        Description::new("ML researchers"),
    ];

    card.thingstoknow.intervention = vec![Description::new("Assessment")];
}

/// Run the whole pipeline and write the rendered card
pub fn run(config: &PipelineConfig) -> Result<CardReport> {
    let start = Instant::now();
    config.validate()?;

    let toolkit = ModelCardToolkit::new(&config.assets_dir);
    let template = toolkit.load_template(&config.template_path)?;
    info!(template = %config.template_path.display(), "Template loaded");

    let dataset = load_breast_cancer()?;
    let split = train_test_split(&dataset, config.test_size, config.random_state)?;
    info!(
        rows = dataset.n_rows(),
        features = dataset.n_features(),
        train = split.train.n_rows(),
        test = split.test.n_rows(),
        "Dataset split"
    );

    let x_train = split.train.feature_matrix()?;
    let y_train = split.train.target_vector()?;
    let x_test = split.test.feature_matrix()?;
    let y_test = split.test.target_vector()?;

    let fit_start = Instant::now();
    let mut model = GradientBoostingClassifier::new(config.boosting.clone());
    model.fit(&x_train, &y_train)?;
    info!(
        trees = model.n_trees(),
        learning_rate = model.config().learning_rate,
        elapsed_ms = fit_start.elapsed().as_millis() as u64,
        "Classifier fitted"
    );

    let class_names = &dataset.target_names;
    let train_data = partition_graphics(&split.train, "train", class_names, &config.plot)?;
    let test_data = partition_graphics(&split.test, "test", class_names, &config.plot)?;

    let scores = model.predict_proba(&x_test)?;
    let predictions = model.predict(&x_test)?;
    let curve = roc_curve(&y_test, &scores)?;
    let auc = curve.auc();
    let matrix = confusion_matrix(&y_test, &predictions)?;
    let accuracy = round_to(accuracy_score(&y_test, &predictions)?, 4);

    let roc_png = roc_plot(&curve, auc, "ROC CURVE", &config.plot)?;
    let cm_png = confusion_matrix_plot(&matrix, class_names, "CONFUSION MATRIX", &config.plot)?;
    info!(accuracy, roc_auc = auc, "Model evaluated");

    let mut card = toolkit.scaffold_assets()?;
    toolkit.update_model_card(&card)?;

    describe_model(&mut card);
    card.model_parameters.data = vec![train_data, test_data];
    card.quantitative_analysis.graphics = GraphicsCollection {
        description: "ROC curve and confusion matrix".to_string(),
        collection: vec![
            Graphic::new("ROC curve", encode_png_base64(&roc_png)),
            Graphic::new("Confusion matrix", encode_png_base64(&cm_png)),
        ],
    };
    card.quantitative_analysis.performance_metrics =
        vec![PerformanceMetric::new("accuracy", metric_value(accuracy))];

    let snapshot_path = toolkit.update_model_card(&card)?;
    let output_path = toolkit.export_format(&card, &template, &config.output_file)?;

    let elapsed_secs = start.elapsed().as_secs_f64();
    info!(path = %output_path.display(), elapsed_secs, "Model card written");

    Ok(CardReport {
        output_path,
        snapshot_path,
        accuracy,
        roc_auc: auc,
        n_train: split.train.n_rows(),
        n_test: split.test.n_rows(),
        n_features: dataset.n_features(),
        elapsed_secs,
        card,
    })
}
