//! Error taxonomy for the ingestion pipeline.
//!
//! Four failure families with distinct handling policies:
//! - [`ValidationError`]: reject before any state mutation (422 to the caller)
//! - [`ClassifierError`]: caught in the pipeline, degrades to Normal
//! - [`StorageError`]: logged, decision still returned to the field device
//! - notification failures carry no type — they are logged and dropped

use crate::types::FeatureSchema;

/// Malformed or out-of-physical-range reading, rejected before the classifier.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("field `{0}` is not a finite number")]
    NonFinite(&'static str),

    #[error("field `{field}` = {value} outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("required field `{0}` is empty")]
    MissingField(&'static str),
}

/// Classifier failure. Never propagates into the control path; the pipeline
/// degrades to a Normal verdict and logs a warning.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("feature schema mismatch: model expects {expected}, got {got}")]
    SchemaMismatch {
        expected: FeatureSchema,
        got: FeatureSchema,
    },

    #[error("malformed feature vector: {0}")]
    MalformedInput(String),

    #[error("model produced no class scores")]
    EmptyModel,

    #[error("model file unreadable: {0}")]
    ModelIo(#[from] std::io::Error),

    #[error("model file malformed: {0}")]
    ModelParse(#[from] serde_json::Error),

    #[error("model class `{label}` carries {got} parameters, schema needs {expected}")]
    BadClassWidth {
        label: String,
        got: usize,
        expected: usize,
    },
}

/// Durable fault-log failure. The already-computed decision is still returned;
/// the failure is surfaced through logs and the dropped-appends counter.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("fault record {0} not found")]
    NotFound(u64),
}
