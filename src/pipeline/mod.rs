//! Ingestion Pipeline Module
//!
//! One reading in, one breaker decision out:
//!
//! ```text
//! validate -> derive features -> classify -> decide -> [append, alert]
//! ```
//!
//! The first three stages are pure and lock-free. `decide` serializes on the
//! engine's cycle lock. The durable append and the alert run strictly after
//! the lock is released, so slow storage never extends the critical section.
//!
//! Failure policy per stage:
//! - validation failure: reading rejected, nothing mutated
//! - classifier failure: logged, verdict degrades to Normal, cycle continues
//! - append failure: logged and counted, the decision is still returned —
//!   the field device must get its command even when the log is sick
//! - alert failure: absorbed inside [`AlertSink`]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::classifier::{ActiveClassifier, Classifier};
use crate::engine::{CycleOutcome, CycleReason, DecisionEngine};
use crate::error::ValidationError;
use crate::notify::AlertSink;
use crate::physics::derive_features;
use crate::storage::FaultLog;
use crate::types::{BreakerCommand, Classification, GridStatus, TelemetryReading};

// ============================================================================
// Decision Response
// ============================================================================

/// What the field device receives for one posted reading.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionResponse {
    pub command: BreakerCommand,
    pub status: GridStatus,
    pub reason: CycleReason,
    pub fault_label: String,
    pub confidence: f64,
    /// Id of the durable fault record this cycle produced, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_id: Option<u64>,
}

/// Counters exposed on the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub readings_processed: u64,
    pub faults_detected: u64,
    pub classifier_degrades: u64,
    pub dropped_appends: u64,
}

// ============================================================================
// Pipeline
// ============================================================================

pub struct IngestionPipeline {
    classifier: ActiveClassifier,
    engine: Arc<DecisionEngine>,
    fault_log: FaultLog,
    alerts: AlertSink,
    nominal_voltage: f64,

    readings_processed: AtomicU64,
    faults_detected: AtomicU64,
    classifier_degrades: AtomicU64,
    dropped_appends: AtomicU64,
}

impl IngestionPipeline {
    pub fn new(
        classifier: ActiveClassifier,
        engine: Arc<DecisionEngine>,
        fault_log: FaultLog,
        alerts: AlertSink,
        nominal_voltage: f64,
    ) -> Arc<Self> {
        info!(
            classifier = classifier.name(),
            schema = %classifier.schema(),
            nominal_voltage,
            "Ingestion pipeline ready"
        );
        Arc::new(Self {
            classifier,
            engine,
            fault_log,
            alerts,
            nominal_voltage,
            readings_processed: AtomicU64::new(0),
            faults_detected: AtomicU64::new(0),
            classifier_degrades: AtomicU64::new(0),
            dropped_appends: AtomicU64::new(0),
        })
    }

    /// Run one full ingestion cycle.
    pub fn process(&self, reading: &TelemetryReading) -> Result<DecisionResponse, ValidationError> {
        reading.validate()?;

        let features = derive_features(reading, self.nominal_voltage);

        let verdict = match self.classifier.classify(&features) {
            Ok(v) => v,
            Err(e) => {
                // A sick classifier never trips a breaker: degrade to Normal
                self.classifier_degrades.fetch_add(1, Ordering::Relaxed);
                warn!(
                    classifier = self.classifier.name(),
                    error = %e,
                    "Classifier failed, degrading verdict to Normal"
                );
                Classification::normal()
            }
        };

        let outcome = self.engine.decide(reading, &verdict);
        self.readings_processed.fetch_add(1, Ordering::Relaxed);

        let fault_id = self.run_side_effects(&outcome);

        Ok(DecisionResponse {
            command: outcome.command,
            status: outcome.status,
            reason: outcome.reason,
            fault_label: verdict.label,
            confidence: verdict.confidence,
            fault_id,
        })
    }

    /// Queue a manual breaker command for the next cycle.
    pub fn queue_manual(&self, command: crate::types::ManualCommand) {
        self.engine.queue_manual(command);
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn fault_log(&self) -> &FaultLog {
        &self.fault_log
    }

    pub fn classifier_name(&self) -> &'static str {
        self.classifier.name()
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            readings_processed: self.readings_processed.load(Ordering::Relaxed),
            faults_detected: self.faults_detected.load(Ordering::Relaxed),
            classifier_degrades: self.classifier_degrades.load(Ordering::Relaxed),
            dropped_appends: self.dropped_appends.load(Ordering::Relaxed),
        }
    }

    /// Durable append and alert dispatch, after the cycle lock is released.
    fn run_side_effects(&self, outcome: &CycleOutcome) -> Option<u64> {
        let fault_id = outcome.fault.clone().and_then(|record| {
            self.faults_detected.fetch_add(1, Ordering::Relaxed);
            match self.fault_log.append(record) {
                Ok(id) => Some(id),
                Err(e) => {
                    self.dropped_appends.fetch_add(1, Ordering::Relaxed);
                    error!(error = %e, "Fault record append failed, decision still issued");
                    None
                }
            }
        });

        if let Some(message) = outcome.alert.clone() {
            self.alerts.dispatch(message);
        }

        fault_id
    }
}
