//! make-card CLI Module
//!
//! Runs the model card pipeline with optional overrides and prints a summary.

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::pipeline::{self, CardReport};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug, Default)]
#[command(name = "make-card")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a breast cancer classifier and render its model card")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Jinja template used to render the card
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Directory receiving data/ and model_cards/
    #[arg(short, long)]
    pub assets_dir: Option<PathBuf>,

    /// File name of the rendered card
    #[arg(short, long)]
    pub output: Option<String>,

    /// Seed for the train/test split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of rows held out for evaluation
    #[arg(long)]
    pub test_size: Option<f64>,
}

impl Cli {
    /// Resolve the effective configuration: defaults, then file, then flags
    pub fn to_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(template) = &self.template {
            config.template_path = template.clone();
        }
        if let Some(dir) = &self.assets_dir {
            config.assets_dir = dir.clone();
        }
        if let Some(output) = &self.output {
            config.output_file = output.clone();
        }
        if let Some(seed) = self.seed {
            config.random_state = Some(seed);
        }
        if let Some(test_size) = self.test_size {
            config.test_size = test_size;
        }
        config.validate()?;
        Ok(config)
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_generate(cli: &Cli) -> anyhow::Result<CardReport> {
    let config = cli.to_config()?;

    section("Model card");
    kv("Template", &config.template_path.display().to_string());
    kv("Assets", &config.assets_dir.display().to_string());
    kv(
        "Seed",
        &config
            .random_state
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".to_string()),
    );
    println!();

    step_run("Training and rendering");
    let start = Instant::now();
    let report = pipeline::run(&config)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!(
        "  {:<16} {}",
        muted("Accuracy"),
        format!("{:.4}", report.accuracy).white().bold()
    );
    kv("ROC AUC", &format!("{:.4}", report.roc_auc));
    kv("Rows", &format!("{} train / {} test", report.n_train, report.n_test));
    kv("Features", &report.n_features.to_string());
    kv("Card", &report.output_path.display().to_string());
    kv("Snapshot", &report.snapshot_path.display().to_string());
    println!();

    Ok(report)
}
