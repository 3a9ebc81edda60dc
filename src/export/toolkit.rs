//! Asset directory management and template rendering for model cards.
//!
//! Layout under the assets root:
//!
//! ```text
//! <root>/data/model_card.json         JSON snapshot of the card
//! <root>/model_cards/<output_file>    rendered document
//! ```

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use minijinja::Environment;
use tracing::{debug, info};

use super::model_card::ModelCard;
use crate::error::{CardError, Result};

const DATA_DIR: &str = "data";
const MODEL_CARDS_DIR: &str = "model_cards";
const SNAPSHOT_FILE: &str = "model_card.json";

/// Jinja template source. The name decides auto-escaping: names ending in
/// `.html.jinja` (or `.html`) are HTML-escaped.
#[derive(Debug, Clone)]
pub struct CardTemplate {
    pub name: String,
    pub source: String,
}

impl CardTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Render `card` with its top-level sections as the template context
    pub fn render(&self, card: &ModelCard) -> Result<String> {
        let env = Environment::new();
        let template = env.template_from_named_str(&self.name, &self.source)?;
        Ok(template.render(card)?)
    }
}

/// Helper rooted at an assets directory
pub struct ModelCardToolkit {
    root: PathBuf,
}

impl ModelCardToolkit {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn model_cards_dir(&self) -> PathBuf {
        self.root.join(MODEL_CARDS_DIR)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir().join(SNAPSHOT_FILE)
    }

    /// Read a template file. A missing file surfaces as an I/O error.
    pub fn load_template(&self, path: impl AsRef<Path>) -> Result<CardTemplate> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                CardError::TemplateError(format!("Invalid template path: {}", path.display()))
            })?
            .to_string();
        debug!(template = %name, bytes = source.len(), "Loaded template");
        Ok(CardTemplate::new(name, source))
    }

    /// Create the asset directories and hand back an empty card
    pub fn scaffold_assets(&self) -> Result<ModelCard> {
        for dir in [self.data_dir(), self.model_cards_dir()] {
            fs::create_dir_all(&dir)?;
        }
        info!(root = %self.root.display(), "Scaffolded model card assets");
        Ok(ModelCard::default())
    }

    /// Write the card's JSON snapshot, replacing any previous one
    pub fn update_model_card(&self, card: &ModelCard) -> Result<PathBuf> {
        let path = self.snapshot_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), card)?;
        debug!(path = %path.display(), "Updated model card snapshot");
        Ok(path)
    }

    /// Render the card and write it to `model_cards/<output_file>`
    pub fn export_format(
        &self,
        card: &ModelCard,
        template: &CardTemplate,
        output_file: &str,
    ) -> Result<PathBuf> {
        if output_file.is_empty() || Path::new(output_file).file_name().is_none() {
            return Err(CardError::InvalidParameter {
                name: "output_file".to_string(),
                value: output_file.to_string(),
                reason: "must be a file name".to_string(),
            });
        }

        let rendered = template.render(card)?;
        let dir = self.model_cards_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(output_file);
        fs::write(&path, rendered.as_bytes())?;
        info!(path = %path.display(), bytes = rendered.len(), "Exported model card");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::model_card::{Description, PerformanceMetric};
    use tempfile::TempDir;

    fn sample_card() -> ModelCard {
        let mut card = ModelCard::default();
        card.model_details.name = "Tumours <benign & malignant>".to_string();
        card.quantitative_analysis
            .performance_metrics
            .push(PerformanceMetric::new("accuracy", "0.965"));
        card.thingstoknow.intervention.push(Description::new("Assessment"));
        card
    }

    #[test]
    fn test_scaffold_creates_directories() {
        let dir = TempDir::new().unwrap();
        let toolkit = ModelCardToolkit::new(dir.path());
        let card = toolkit.scaffold_assets().unwrap();

        assert_eq!(card, ModelCard::default());
        assert!(dir.path().join("data").is_dir());
        assert!(dir.path().join("model_cards").is_dir());
    }

    #[test]
    fn test_update_writes_snapshot() {
        let dir = TempDir::new().unwrap();
        let toolkit = ModelCardToolkit::new(dir.path());
        let card = sample_card();

        let path = toolkit.update_model_card(&card).unwrap();
        let restored = ModelCard::from_json(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(restored, card);
    }

    #[test]
    fn test_render_uses_sections_as_context() {
        let template = CardTemplate::new(
            "card.txt",
            "{% for m in quantitative_analysis.performance_metrics %}{{ m.type }}={{ m.value }}{% endfor %};{{ thingstoknow.intervention[0].description }}",
        );
        let out = template.render(&sample_card()).unwrap();
        assert_eq!(out, "accuracy=0.965;Assessment");
    }

    #[test]
    fn test_html_template_escapes() {
        let template = CardTemplate::new("card.html.jinja", "<h1>{{ model_details.name }}</h1>");
        let out = template.render(&sample_card()).unwrap();
        assert_eq!(out, "<h1>Tumours &lt;benign &amp; malignant&gt;</h1>");
    }

    #[test]
    fn test_invalid_template_is_template_error() {
        let template = CardTemplate::new("bad.html.jinja", "{% for x in %}");
        let err = template.render(&sample_card()).unwrap_err();
        assert!(matches!(err, CardError::TemplateError(_)));
    }

    #[test]
    fn test_missing_template_is_io_error() {
        let dir = TempDir::new().unwrap();
        let toolkit = ModelCardToolkit::new(dir.path());
        let err = toolkit.load_template(dir.path().join("nope.html.jinja")).unwrap_err();
        assert!(matches!(err, CardError::IoError(_)));
    }

    #[test]
    fn test_export_overwrites() {
        let dir = TempDir::new().unwrap();
        let toolkit = ModelCardToolkit::new(dir.path());
        let template = CardTemplate::new("card.html.jinja", "{{ quantitative_analysis.performance_metrics[0].value }}");

        let mut card = sample_card();
        toolkit.export_format(&card, &template, "model_card.html").unwrap();
        card.quantitative_analysis.performance_metrics[0].value = "0.5".to_string();
        let path = toolkit.export_format(&card, &template, "model_card.html").unwrap();

        assert_eq!(path, dir.path().join("model_cards").join("model_card.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "0.5");
    }

    #[test]
    fn test_export_rejects_empty_name() {
        let dir = TempDir::new().unwrap();
        let toolkit = ModelCardToolkit::new(dir.path());
        let template = CardTemplate::new("t.html", "x");
        assert!(toolkit.export_format(&sample_card(), &template, "").is_err());
    }
}
