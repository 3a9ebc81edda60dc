//! Model card document following the "Model Cards for Model Reporting" layout.
//!
//! Every section defaults to empty so a scaffolded card serialises cleanly and
//! partially filled JSON snapshots load back without error.

use serde::{Deserialize, Serialize};

/// Complete model card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCard {
    pub model_details: ModelDetails,
    pub considerations: Considerations,
    pub model_parameters: ModelParameters,
    pub quantitative_analysis: QuantitativeAnalysis,
    /// Custom section with notes for readers of the card
    pub thingstoknow: ThingsToKnow,
}

/// Model identification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDetails {
    pub name: String,
    pub overview: String,
    pub owners: Vec<Owner>,
    pub references: Vec<Reference>,
    pub version: Version,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub name: String,
    pub contact: String,
}

impl Owner {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    pub reference: String,
}

impl Reference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub name: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Considerations {
    pub ethical_considerations: Vec<Risk>,
    pub limitations: Vec<Description>,
    pub use_cases: Vec<Description>,
    pub users: Vec<Description>,
}

/// Ethical risk and how it is mitigated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Risk {
    pub name: String,
    pub mitigation_strategy: String,
}

impl Risk {
    pub fn new(name: impl Into<String>, mitigation_strategy: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mitigation_strategy: mitigation_strategy.into(),
        }
    }
}

/// Free-text entry used for limitations, use cases, users and interventions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Description {
    pub description: String,
}

impl Description {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub data: Vec<Dataset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub name: Option<String>,
    pub graphics: GraphicsCollection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsCollection {
    pub description: String,
    pub collection: Vec<Graphic>,
}

/// One chart, carried as a base64 PNG
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Graphic {
    pub name: Option<String>,
    pub image: String,
}

impl Graphic {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            image: image.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantitativeAnalysis {
    pub graphics: GraphicsCollection,
    pub performance_metrics: Vec<PerformanceMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceMetric {
    #[serde(rename = "type")]
    pub metric_type: String,
    pub value: String,
}

impl PerformanceMetric {
    pub fn new(metric_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            metric_type: metric_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThingsToKnow {
    pub intervention: Vec<Description>,
}

impl ModelCard {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a performance metric value by its type
    pub fn metric(&self, metric_type: &str) -> Option<&str> {
        self.quantitative_analysis
            .performance_metrics
            .iter()
            .find(|m| m.metric_type == metric_type)
            .map(|m| m.value.as_str())
    }

    /// Every graphic in the card, dataset graphics first
    pub fn graphics(&self) -> impl Iterator<Item = &Graphic> {
        self.model_parameters
            .data
            .iter()
            .flat_map(|d| d.graphics.collection.iter())
            .chain(self.quantitative_analysis.graphics.collection.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_field_name() {
        let metric = PerformanceMetric::new("accuracy", "0.972");
        let json = serde_json::to_value(&metric).unwrap();
        assert_eq!(json["type"], "accuracy");
        assert_eq!(json["value"], "0.972");
    }

    #[test]
    fn test_partial_json_loads() {
        let card = ModelCard::from_json(r#"{"model_details": {"name": "demo"}}"#).unwrap();
        assert_eq!(card.model_details.name, "demo");
        assert!(card.model_details.owners.is_empty());
        assert!(card.thingstoknow.intervention.is_empty());
    }

    #[test]
    fn test_json_roundtrip_preserves_card() {
        let mut card = ModelCard::default();
        card.model_details.owners.push(Owner::new("Team", "team@example.com"));
        card.considerations.ethical_considerations.push(Risk::new("bias", "review"));
        card.thingstoknow.intervention.push(Description::new("Assessment"));
        card.quantitative_analysis
            .performance_metrics
            .push(PerformanceMetric::new("accuracy", "0.9"));

        let restored = ModelCard::from_json(&card.to_json().unwrap()).unwrap();
        assert_eq!(restored, card);
        assert_eq!(restored.metric("accuracy"), Some("0.9"));
        assert_eq!(restored.metric("recall"), None);
    }

    #[test]
    fn test_graphics_order() {
        let mut card = ModelCard::default();
        card.model_parameters.data.push(Dataset {
            name: Some("train".into()),
            graphics: GraphicsCollection {
                description: String::new(),
                collection: vec![Graphic::new("a", "AA==")],
            },
        });
        card.quantitative_analysis.graphics.collection.push(Graphic::new("b", "AQ=="));

        let names: Vec<_> = card.graphics().filter_map(|g| g.name.as_deref()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
