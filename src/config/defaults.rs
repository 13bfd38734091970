//! System-wide default constants.
//!
//! Centralises the magic numbers used by the feature pipeline, the rule
//! classifier, and the API layer. Grouped by subsystem for easy discovery.

// ============================================================================
// Physics
// ============================================================================

/// Nominal phase voltage (V) for a 400 V line-to-line distribution feeder.
pub const NOMINAL_PHASE_VOLTAGE: f64 = 230.0;

// ============================================================================
// Rule Classifier
// ============================================================================

/// Phase current (A) above which a phase is counted as a short-circuit spike.
pub const SHORT_CIRCUIT_AMPS: f64 = 5_000.0;

/// Voltage (V) below which a spiking phase is considered collapsed.
pub const COLLAPSED_VOLTAGE: f64 = 150.0;

/// Phase current (A) below which a conductor is considered open.
pub const OPEN_CONDUCTOR_AMPS: f64 = 0.5;

/// Expected current (A) above which a near-zero phase reading is suspicious
/// rather than simply unloaded.
pub const MIN_LOADED_CURRENT: f64 = 5.0;

/// Voltage (V) that must still be present on an open conductor for the
/// dropped-but-energized (arcing) diagnosis.
pub const ENERGIZED_VOLTAGE_FLOOR: f64 = 200.0;

/// Current deviation band (A) for the high-impedance leakage rule.
pub const HIGH_IMPEDANCE_DEV_MIN: f64 = 15.0;
pub const HIGH_IMPEDANCE_DEV_MAX: f64 = 2_000.0;

/// Minimum voltage sag (V) accompanying a high-impedance leak.
pub const HIGH_IMPEDANCE_SAG_MIN: f64 = 5.0;

// ============================================================================
// Storage
// ============================================================================

/// Default sled database directory for the fault event log.
pub const FAULT_DB_PATH: &str = "data/fault_log";

/// Fault records returned by the dashboard endpoint.
pub const DASHBOARD_FAULT_LIMIT: usize = 20;

/// Hard cap on `?limit=` for fault history queries.
pub const MAX_FAULT_QUERY_LIMIT: usize = 500;

// ============================================================================
// Server
// ============================================================================

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
