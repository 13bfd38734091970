//! Trained fault model: a per-class Gaussian scorer loaded from JSON.
//!
//! Each fault class carries a prior and per-feature mean/std pairs fitted
//! offline from labeled waveform captures. Scoring is naive-Bayes: sum of
//! per-feature log-densities plus the log prior, argmax over classes, with a
//! softmax over the log-posteriors as the reported confidence.
//!
//! The model file is validated once at load. After that, `classify` only
//! fails on malformed input — never on model state.

use std::path::Path;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};

use crate::error::ClassifierError;
use crate::types::{Classification, FaultKind, FeatureSchema, FeatureVector, NORMAL_LABEL};

use super::Classifier;

/// Floor applied to fitted standard deviations. A degenerate class with zero
/// variance on some feature would otherwise produce infinite densities.
const MIN_STD: f64 = 1e-6;

/// One fitted fault class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianClass {
    /// Class label as it appears in fault records ("Normal", "LG", ...)
    pub label: String,
    /// Class prior probability from the training set
    pub prior: f64,
    /// Per-feature means, in schema order
    pub means: Vec<f64>,
    /// Per-feature standard deviations, in schema order
    pub stds: Vec<f64>,
}

/// On-disk model format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianModel {
    /// Feature layout the model was trained against
    pub schema: FeatureSchema,
    pub classes: Vec<GaussianClass>,
}

impl GaussianModel {
    /// Parse and validate a model file.
    ///
    /// Rejects empty models, classes whose parameter vectors do not match the
    /// schema width, labels outside the fault taxonomy, and non-finite or
    /// non-positive fitted parameters.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&raw)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.classes.is_empty() {
            return Err(ClassifierError::EmptyModel);
        }

        let width = self.schema.width();
        for class in &self.classes {
            if class.means.len() != width || class.stds.len() != width {
                return Err(ClassifierError::BadClassWidth {
                    label: class.label.clone(),
                    got: class.means.len().max(class.stds.len()),
                    expected: width,
                });
            }
            // A label downstream consumers cannot map is a training error,
            // caught here rather than in a fault record months later
            let known = class.label.trim().eq_ignore_ascii_case(NORMAL_LABEL)
                || FaultKind::from_label(&class.label).is_some();
            if !known {
                return Err(ClassifierError::MalformedInput(format!(
                    "class `{}` is not a recognized fault label",
                    class.label
                )));
            }
            let params_ok = class.prior.is_finite()
                && class.prior > 0.0
                && class.means.iter().all(|m| m.is_finite())
                && class.stds.iter().all(|s| s.is_finite() && *s >= 0.0);
            if !params_ok {
                return Err(ClassifierError::MalformedInput(format!(
                    "class `{}` has non-finite or invalid fitted parameters",
                    class.label
                )));
            }
        }
        Ok(())
    }
}

/// Classifier wrapping a validated [`GaussianModel`].
pub struct ModelClassifier {
    model: GaussianModel,
}

impl ModelClassifier {
    /// Load a model and check it against the deployment's feature schema.
    ///
    /// A model trained on a different layout than the one the substation is
    /// wired for is a deployment error, rejected here so the caller can fall
    /// back to rules.
    pub fn load(path: &str, deployment_schema: FeatureSchema) -> Result<Self, ClassifierError> {
        let model = GaussianModel::load(Path::new(path))?;
        if model.schema != deployment_schema {
            return Err(ClassifierError::SchemaMismatch {
                expected: deployment_schema,
                got: model.schema,
            });
        }
        Ok(Self { model })
    }

    /// Build directly from an in-memory model. Used by tests and tooling.
    pub fn from_model(model: GaussianModel) -> Result<Self, ClassifierError> {
        model.validate()?;
        Ok(Self { model })
    }

    pub fn class_count(&self) -> usize {
        self.model.classes.len()
    }

    /// Log-posterior (up to the shared evidence constant) for one class.
    fn log_posterior(class: &GaussianClass, x: &[f64]) -> Result<f64, ClassifierError> {
        let mut lp = class.prior.ln();
        for (i, &xi) in x.iter().enumerate() {
            let dist = Normal::new(class.means[i], class.stds[i].max(MIN_STD))
                .map_err(|e| ClassifierError::MalformedInput(e.to_string()))?;
            lp += dist.ln_pdf(xi);
        }
        Ok(lp)
    }
}

impl Classifier for ModelClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<Classification, ClassifierError> {
        let x = features.to_ordered(self.model.schema);
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ClassifierError::MalformedInput(
                "non-finite value in feature vector".to_string(),
            ));
        }

        let mut scores = Vec::with_capacity(self.model.classes.len());
        for class in &self.model.classes {
            scores.push(Self::log_posterior(class, &x)?);
        }

        let (best_idx, best_lp) = scores
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or(ClassifierError::EmptyModel)?;

        // Softmax over log-posteriors, shifted by the max for stability
        let denom: f64 = scores.iter().map(|lp| (lp - best_lp).exp()).sum();
        let confidence = if denom.is_finite() && denom > 0.0 {
            1.0 / denom
        } else {
            1.0
        };

        Ok(Classification {
            label: self.model.classes[best_idx].label.clone(),
            confidence,
        })
    }

    fn schema(&self) -> FeatureSchema {
        self.model.schema
    }

    fn name(&self) -> &'static str {
        "model"
    }
}
