//! Decision Engine Module
//!
//! The arbitration core: one reading plus one classifier verdict in, one
//! breaker command out. All state transitions happen inside a single mutex so
//! that concurrent readings serialize into well-defined cycles.
//!
//! ## Per-cycle order
//!
//! Under the cycle lock:
//! 1. Fold the reading into the live snapshot (always, even when a fault or
//!    override follows)
//! 2. If a manual command is pending, consume it and obey it — the classifier
//!    verdict for this cycle is logged but produces no record or trip
//! 3. On a fault verdict, go CRITICAL and emit a fault record and alert;
//!    the outbound command is TRIP only when autonomous tripping is enabled
//! 4. Otherwise CONTINUE; a prior CRITICAL clears to STABLE, while a
//!    MANUAL_TRIP status persists until a manual RESET
//!
//! The MANUAL_TRIP status is advisory: the verdict, not the status, drives
//! the command, so no fault evidence is lost after an override.
//!
//! The durable append and the notification are *not* performed here: the
//! engine hands them back in [`CycleOutcome`] so the pipeline can run them
//! after the lock is released.
//!
//! Reads of the live snapshot never take the cycle lock — the snapshot is
//! republished atomically via `ArcSwap` at the end of each critical section.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use chrono::Utc;
use tracing::{info, warn};

use crate::types::{
    BreakerCommand, Classification, FaultRecord, FaultStatus, GridSnapshot, GridStatus,
    ManualCommand, TelemetryReading,
};

// ============================================================================
// Cycle Outcome
// ============================================================================

/// Why the engine chose the command it chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleReason {
    /// Healthy verdict, normal operation
    Nominal,
    /// Fault verdict drove the transition to CRITICAL
    FaultDetected,
    /// Fault verdict recorded, but autonomous tripping is disabled
    FaultDetectOnly,
    /// A queued manual command was consumed this cycle
    ManualOverride,
}

/// Everything a cycle produced. The caller owns the side effects: `fault`
/// must be appended to the durable log and `alert` dispatched, both outside
/// the cycle lock.
#[derive(Debug)]
pub struct CycleOutcome {
    pub command: BreakerCommand,
    pub status: GridStatus,
    pub reason: CycleReason,
    pub fault: Option<FaultRecord>,
    pub alert: Option<String>,
}

// ============================================================================
// Engine
// ============================================================================

/// State shared by every cycle, guarded by one mutex.
struct CycleState {
    /// Single-slot manual command mailbox, last write wins
    pending: Option<ManualCommand>,
    status: GridStatus,
}

/// The arbitration state machine.
///
/// Cheap to clone via `Arc`; one instance serves the whole process.
pub struct DecisionEngine {
    state: Mutex<CycleState>,
    snapshot: ArcSwap<GridSnapshot>,
    autonomous_trip: bool,
}

impl DecisionEngine {
    pub fn new(autonomous_trip: bool) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(CycleState {
                pending: None,
                status: GridStatus::Waiting,
            }),
            snapshot: ArcSwap::from_pointee(GridSnapshot::default()),
            autonomous_trip,
        })
    }

    /// Queue a manual command for the next cycle.
    ///
    /// The mailbox holds one command; queuing a second before a cycle runs
    /// replaces the first.
    pub fn queue_manual(&self, command: ManualCommand) {
        let mut state = self.lock_state();
        if let Some(prev) = state.pending.replace(command) {
            warn!(replaced = %prev, queued = %command, "Manual command replaced before consumption");
        } else {
            info!(queued = %command, "Manual command queued");
        }
    }

    /// Run one arbitration cycle.
    ///
    /// Takes the cycle lock, applies the per-cycle order, republishes the
    /// live snapshot, and returns the outcome. Fault append and alert
    /// dispatch are the caller's responsibility, after this returns.
    pub fn decide(&self, reading: &TelemetryReading, verdict: &Classification) -> CycleOutcome {
        let mut state = self.lock_state();

        // Worst-phase live view: lowest voltage, highest current
        let voltage = reading
            .voltages()
            .into_iter()
            .fold(f64::INFINITY, f64::min);
        let current = reading.currents().into_iter().fold(0.0, f64::max);

        let outcome = if let Some(manual) = state.pending.take() {
            // Absolute priority: the verdict is logged for the record but
            // drives nothing this cycle
            info!(
                command = %manual,
                suppressed_verdict = %verdict.label,
                confidence = verdict.confidence,
                "Manual override consumed"
            );
            state.status = match manual {
                ManualCommand::Trip => GridStatus::ManualTrip,
                ManualCommand::Reset => GridStatus::Stable,
            };
            CycleOutcome {
                command: manual.as_breaker_command(),
                status: state.status,
                reason: CycleReason::ManualOverride,
                fault: None,
                alert: None,
            }
        } else if verdict.is_fault() {
            state.status = GridStatus::Critical;
            let fault = self.build_fault_record(reading, verdict, voltage, current);
            let alert = format!(
                "Fault {} on {}/{} (confidence {:.2}): V={:.1} V, I={:.1} A",
                verdict.label,
                reading.substation_id,
                reading.line_id,
                verdict.confidence,
                voltage,
                current
            );
            let (command, reason) = if self.autonomous_trip {
                (BreakerCommand::Trip, CycleReason::FaultDetected)
            } else {
                (BreakerCommand::Continue, CycleReason::FaultDetectOnly)
            };
            CycleOutcome {
                command,
                status: GridStatus::Critical,
                reason,
                fault: Some(fault),
                alert: Some(alert),
            }
        } else {
            // Healthy verdict clears CRITICAL immediately; no latch. A
            // MANUAL_TRIP status outlives the cycle until an explicit RESET.
            if state.status != GridStatus::ManualTrip {
                state.status = GridStatus::Stable;
            }
            CycleOutcome {
                command: BreakerCommand::Continue,
                status: state.status,
                reason: CycleReason::Nominal,
                fault: None,
                alert: None,
            }
        };

        self.snapshot.store(Arc::new(GridSnapshot {
            voltage,
            current,
            status: outcome.status,
            last_updated: Utc::now(),
        }));

        outcome
    }

    /// Lock-free, torn-free view of the latest published state.
    pub fn snapshot(&self) -> Arc<GridSnapshot> {
        self.snapshot.load_full()
    }

    pub fn status(&self) -> GridStatus {
        self.snapshot.load().status
    }

    fn build_fault_record(
        &self,
        reading: &TelemetryReading,
        verdict: &Classification,
        voltage: f64,
        current: f64,
    ) -> FaultRecord {
        let now = Utc::now();
        FaultRecord {
            id: now.timestamp_millis().max(0) as u64,
            substation_id: reading.substation_id.clone(),
            line_id: reading.line_id.clone(),
            timestamp: now,
            voltage,
            current,
            fault_label: verdict.label.clone(),
            status: FaultStatus::Active,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CycleState> {
        // A poisoned cycle lock means a panic mid-transition; the state is a
        // plain enum plus an Option, both valid under any interleaving
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
