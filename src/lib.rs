//! GridWarden: Substation Fault Detection and Breaker Control
//!
//! Real-time pipeline from three-phase telemetry to breaker commands:
//!
//! - **Physics**: derives the 14-feature electrical signature of a reading
//! - **Classifier**: rule-based or trained Gaussian model, selected at startup
//! - **Decision Engine**: lock-serialized state machine arbitrating automatic
//!   verdicts against queued manual operator commands
//! - **Fault Log**: durable append-only event history on embedded sled
//! - **API**: axum HTTP surface for field devices and operator tooling

pub mod api;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod physics;
pub mod pipeline;
pub mod storage;
pub mod types;

// Re-export grid configuration
pub use config::GridConfig;

// Re-export commonly used types
pub use types::{
    BreakerCommand, Classification, FaultKind, FaultRecord, FaultStatus, FeatureSchema,
    FeatureVector, GridSnapshot, GridStatus, ManualCommand, TelemetryReading,
};

// Re-export the pipeline components
pub use classifier::{ActiveClassifier, Classifier, ModelClassifier, RuleClassifier};
pub use engine::{CycleOutcome, CycleReason, DecisionEngine};
pub use notify::AlertSink;
pub use pipeline::{DecisionResponse, IngestionPipeline};
pub use storage::FaultLog;

// Re-export errors
pub use error::{ClassifierError, StorageError, ValidationError};
