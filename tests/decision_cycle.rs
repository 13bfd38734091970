//! Decision Cycle Regression Tests
//!
//! End-to-end scenarios through the full ingestion pipeline (validation,
//! feature derivation, rule classification, arbitration, durable log),
//! exercising the operational sequences field deployments hit.

use std::sync::Arc;

use gridwarden::classifier::{ActiveClassifier, RuleClassifier};
use gridwarden::config::GridConfig;
use gridwarden::engine::{CycleReason, DecisionEngine};
use gridwarden::notify::AlertSink;
use gridwarden::pipeline::IngestionPipeline;
use gridwarden::storage::FaultLog;
use gridwarden::types::{BreakerCommand, GridStatus, ManualCommand, TelemetryReading};

fn build_pipeline(autonomous_trip: bool) -> (tempfile::TempDir, Arc<IngestionPipeline>) {
    let config = GridConfig::default();
    let dir = tempfile::tempdir().expect("tempdir");
    let fault_log = FaultLog::open(dir.path()).expect("open fault log");
    let pipeline = IngestionPipeline::new(
        ActiveClassifier::Rules(RuleClassifier::new(config.classifier.rules.clone())),
        DecisionEngine::new(autonomous_trip),
        fault_log,
        AlertSink::from_config(&config.notify),
        config.physics.nominal_voltage,
    );
    (dir, pipeline)
}

fn reading(load_kw: f64, pf: f64, v: [f64; 3], i: [f64; 3]) -> TelemetryReading {
    TelemetryReading {
        substation_id: "SUB-01".to_string(),
        line_id: "LINE-A".to_string(),
        load_kw,
        power_factor: pf,
        voltage_a: v[0],
        voltage_b: v[1],
        voltage_c: v[2],
        current_a: i[0],
        current_b: i[1],
        current_c: i[2],
    }
}

fn healthy() -> TelemetryReading {
    reading(20.0, 0.9, [230.0, 230.0, 230.0], [31.4, 31.4, 31.4])
}

/// Scenario: a steady healthy stream never trips and never writes records.
#[test]
fn test_healthy_stream_stays_stable() {
    let (_dir, p) = build_pipeline(true);
    for _ in 0..10 {
        let resp = p.process(&healthy()).expect("process");
        assert_eq!(resp.command, BreakerCommand::Continue);
        assert_eq!(resp.status, GridStatus::Stable);
    }
    assert_eq!(p.fault_log().count(), 0);
    assert_eq!(p.stats().readings_processed, 10);
}

/// Scenario: a phase-A short (18.5 kA spike, 200 V sag) classified LG, breaker
/// tripped, fault durably recorded, then a healthy reading clears CRITICAL.
#[test]
fn test_lg_short_trips_then_recovers() {
    let (_dir, p) = build_pipeline(true);
    p.process(&healthy()).expect("process");

    let shorted = reading(20.0, 0.9, [200.0, 230.0, 230.0], [18_500.0, 31.4, 31.4]);
    let resp = p.process(&shorted).expect("process");
    assert_eq!(resp.command, BreakerCommand::Trip);
    assert_eq!(resp.status, GridStatus::Critical);
    assert_eq!(resp.fault_label, "LG");
    let id = resp.fault_id.expect("fault id");

    let record = p.fault_log().get(id).expect("record");
    assert_eq!(record.fault_label, "LG");
    assert!((record.voltage - 200.0).abs() < 1e-9);
    assert!((record.current - 18_500.0).abs() < 1e-9);

    // No latch: the next healthy reading returns to STABLE
    let resp = p.process(&healthy()).expect("process");
    assert_eq!(resp.status, GridStatus::Stable);
    assert_eq!(resp.command, BreakerCommand::Continue);
    assert_eq!(p.fault_log().count(), 1);
}

/// Scenario: operator trips manually. The MANUAL_TRIP status persists across
/// healthy readings, but the command follows the verdict on every cycle, and
/// a manual RESET restores the STABLE status.
#[test]
fn test_manual_trip_status_persists_until_reset() {
    let (_dir, p) = build_pipeline(true);
    p.process(&healthy()).expect("process");

    p.queue_manual(ManualCommand::Trip);
    let resp = p.process(&healthy()).expect("process");
    assert_eq!(resp.reason, CycleReason::ManualOverride);
    assert_eq!(resp.command, BreakerCommand::Trip);
    assert_eq!(resp.status, GridStatus::ManualTrip);

    // The slot was consumed; healthy cycles return CONTINUE while the
    // status keeps showing the manual trip
    for _ in 0..3 {
        let resp = p.process(&healthy()).expect("process");
        assert_eq!(resp.reason, CycleReason::Nominal);
        assert_eq!(resp.command, BreakerCommand::Continue);
        assert_eq!(resp.status, GridStatus::ManualTrip);
    }

    p.queue_manual(ManualCommand::Reset);
    let resp = p.process(&healthy()).expect("process");
    assert_eq!(resp.command, BreakerCommand::Reset);
    assert_eq!(resp.status, GridStatus::Stable);

    let resp = p.process(&healthy()).expect("process");
    assert_eq!(resp.reason, CycleReason::Nominal);
    assert_eq!(resp.status, GridStatus::Stable);
}

/// Scenario: a fault breaks out after a manual trip was consumed. The verdict
/// still drives CRITICAL, a durable record, and the trip command — an
/// operator override never blinds the fault log beyond its own cycle.
#[test]
fn test_fault_after_manual_trip_is_recorded() {
    let (_dir, p) = build_pipeline(true);
    p.queue_manual(ManualCommand::Trip);
    let resp = p.process(&healthy()).expect("process");
    assert_eq!(resp.reason, CycleReason::ManualOverride);
    assert_eq!(p.fault_log().count(), 0);

    let shorted = reading(20.0, 0.9, [200.0, 230.0, 230.0], [18_500.0, 31.4, 31.4]);
    let resp = p.process(&shorted).expect("process");
    assert_eq!(resp.reason, CycleReason::FaultDetected);
    assert_eq!(resp.command, BreakerCommand::Trip);
    assert_eq!(resp.status, GridStatus::Critical);
    let id = resp.fault_id.expect("fault id");
    assert_eq!(p.fault_log().get(id).expect("record").fault_label, "LG");
    assert_eq!(p.fault_log().count(), 1);
}

/// Scenario: a manual command queued just before a faulted reading wins the
/// cycle; the fault verdict is reported but not recorded.
#[test]
fn test_override_preempts_fault_record() {
    let (_dir, p) = build_pipeline(true);
    p.queue_manual(ManualCommand::Trip);

    let shorted = reading(20.0, 0.9, [200.0, 230.0, 230.0], [18_500.0, 31.4, 31.4]);
    let resp = p.process(&shorted).expect("process");
    assert_eq!(resp.reason, CycleReason::ManualOverride);
    assert_eq!(resp.fault_label, "LG");
    assert!(resp.fault_id.is_none());
    assert_eq!(p.fault_log().count(), 0);
}

/// A heavily unloaded line with near-zero currents is not an open conductor:
/// the expected-current clamp keeps the idle case quiet.
#[test]
fn test_unloaded_line_not_flagged_open() {
    let (_dir, p) = build_pipeline(true);
    // Power factor below the clamp floor: expected current is zero
    let idle = reading(15.0, 0.05, [230.0, 230.0, 230.0], [0.1, 0.1, 0.1]);
    let resp = p.process(&idle).expect("process");
    assert_eq!(resp.fault_label, "Normal");
    assert_eq!(resp.command, BreakerCommand::Continue);
}

/// Detect-only deployments record and stay CRITICAL but never trip on their
/// own; a manual TRIP still moves the breaker.
#[test]
fn test_detect_only_deployment() {
    let (_dir, p) = build_pipeline(false);
    let shorted = reading(20.0, 0.9, [40.0, 45.0, 50.0], [15_000.0, 15_000.0, 15_000.0]);
    let resp = p.process(&shorted).expect("process");
    assert_eq!(resp.command, BreakerCommand::Continue);
    assert_eq!(resp.status, GridStatus::Critical);
    assert_eq!(resp.fault_label, "LLL");
    assert!(resp.fault_id.is_some());

    p.queue_manual(ManualCommand::Trip);
    let resp = p.process(&shorted).expect("process");
    assert_eq!(resp.command, BreakerCommand::Trip);
    assert_eq!(resp.status, GridStatus::ManualTrip);
}

/// Concurrent readings race for one queued command: exactly one cycle
/// consumes it, and every fault cycle that loses the race still records.
#[test]
fn test_concurrent_readings_one_override() {
    let (_dir, p) = build_pipeline(true);
    p.queue_manual(ManualCommand::Trip);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let p = Arc::clone(&p);
        handles.push(std::thread::spawn(move || {
            p.process(&healthy()).expect("process").reason
        }));
    }
    let reasons: Vec<CycleReason> = handles
        .into_iter()
        .map(|h| h.join().expect("thread"))
        .collect();

    let overrides = reasons
        .iter()
        .filter(|r| **r == CycleReason::ManualOverride)
        .count();
    assert_eq!(overrides, 1);
    assert_eq!(p.engine().status(), GridStatus::ManualTrip);
    assert_eq!(p.stats().readings_processed, 8);
}

/// Every fault in a burst survives into the durable log even when they land
/// inside the same millisecond.
#[test]
fn test_fault_burst_all_recorded() {
    let (_dir, p) = build_pipeline(true);
    let shorted = reading(20.0, 0.9, [200.0, 230.0, 230.0], [18_500.0, 31.4, 31.4]);
    let mut ids = Vec::new();
    for _ in 0..5 {
        let resp = p.process(&shorted).expect("process");
        ids.push(resp.fault_id.expect("fault id"));
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 5);
    assert_eq!(p.fault_log().count(), 5);
}
