//! Model card export module
//!
//! - [`ModelCard`]: the serde document with every card section
//! - [`ModelCardToolkit`]: asset scaffolding, JSON snapshots and template export

mod model_card;
mod toolkit;

pub use model_card::{
    Considerations, Dataset, Description, Graphic, GraphicsCollection, ModelCard, ModelDetails,
    ModelParameters, Owner, PerformanceMetric, QuantitativeAnalysis, Reference, Risk, ThingsToKnow,
    Version,
};
pub use toolkit::{CardTemplate, ModelCardToolkit};
