//! Fault Classifier Module
//!
//! Two interchangeable strategies behind one capability interface:
//! - [`RuleClassifier`]: ordered deterministic threshold checks
//! - [`ModelClassifier`]: trained per-class Gaussian scorer loaded from JSON
//!
//! The variant is selected once at startup via [`ActiveClassifier::from_config`].
//! A model that fails to load triggers an explicit, logged fallback to rules —
//! there is no per-request probing. The decision engine is indifferent to
//! which variant is active; only the label/confidence result flows downstream.

mod model;
mod rules;

pub use model::{GaussianModel, ModelClassifier};
pub use rules::RuleClassifier;

use tracing::{info, warn};

use crate::config::{ClassifierMode, GridConfig};
use crate::error::ClassifierError;
use crate::types::{Classification, FeatureSchema, FeatureVector};

/// Capability interface for fault classification.
///
/// Implementations must be pure with respect to process state: the same
/// feature vector always yields the same result.
pub trait Classifier: Send + Sync {
    /// Classify one feature vector.
    ///
    /// Errors never reach the control path — the pipeline catches them and
    /// degrades to a Normal verdict.
    fn classify(&self, features: &FeatureVector) -> Result<Classification, ClassifierError>;

    /// Feature layout this classifier was built against.
    fn schema(&self) -> FeatureSchema;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// The classifier variant chosen at startup.
pub enum ActiveClassifier {
    Model(ModelClassifier),
    Rules(RuleClassifier),
}

impl ActiveClassifier {
    /// Select and construct the classifier from configuration.
    ///
    /// In `model` mode, a load failure (missing file, parse error, schema
    /// mismatch with the configured deployment schema) falls back to the rule
    /// classifier with a warning. This is the only fallback trigger.
    pub fn from_config(config: &GridConfig) -> Self {
        match config.classifier.mode {
            ClassifierMode::Model => {
                match ModelClassifier::load(
                    &config.classifier.model_path,
                    config.classifier.feature_schema,
                ) {
                    Ok(model) => {
                        info!(
                            path = %config.classifier.model_path,
                            schema = %model.schema(),
                            classes = model.class_count(),
                            "Trained fault model loaded"
                        );
                        Self::Model(model)
                    }
                    Err(e) => {
                        warn!(
                            path = %config.classifier.model_path,
                            error = %e,
                            "Model load failed — falling back to rule classifier"
                        );
                        Self::Rules(RuleClassifier::new(config.classifier.rules.clone()))
                    }
                }
            }
            ClassifierMode::Rules => {
                info!("Rule classifier selected");
                Self::Rules(RuleClassifier::new(config.classifier.rules.clone()))
            }
        }
    }
}

impl Classifier for ActiveClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<Classification, ClassifierError> {
        match self {
            Self::Model(m) => m.classify(features),
            Self::Rules(r) => r.classify(features),
        }
    }

    fn schema(&self) -> FeatureSchema {
        match self {
            Self::Model(m) => m.schema(),
            Self::Rules(r) => r.schema(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Model(m) => m.name(),
            Self::Rules(r) => r.name(),
        }
    }
}
