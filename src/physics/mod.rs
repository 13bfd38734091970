//! Physics Engine Module
//!
//! Deterministic 3-phase power calculations for the feature pipeline.
//! All math here is pure physics — no ML involved, no side effects, and the
//! same reading always derives bit-for-bit the same feature vector.

use crate::types::{FeatureVector, TelemetryReading};

/// Power factor at or below which the expected-current formula degenerates.
pub const MIN_POWER_FACTOR: f64 = 0.1;

/// Nominal voltage at or below which the expected-current formula degenerates.
pub const MIN_NOMINAL_VOLTAGE: f64 = 1.0;

/// Theoretical line current (A) for a balanced 3-phase system.
///
/// `P_total = 3 * V_phase * I_phase * PF`, so
/// `I_phase = P_kw * 1000 / (3 * V_phase * PF)`.
///
/// Clamps to `0.0` when `pf <= 0.1` or `nominal_voltage <= 1` — the
/// division-by-near-zero guard. Total function, never fails.
pub fn expected_current(load_kw: f64, pf: f64, nominal_voltage: f64) -> f64 {
    if pf <= MIN_POWER_FACTOR || nominal_voltage <= MIN_NOMINAL_VOLTAGE {
        return 0.0;
    }
    (load_kw * 1000.0) / (3.0 * nominal_voltage * pf)
}

/// Derive the classifier feature vector from a validated reading.
///
/// Voltage deviations are measured against `nominal_voltage`; current
/// deviations against [`expected_current`]. Pure function of the reading and
/// the nominal constant.
pub fn derive_features(reading: &TelemetryReading, nominal_voltage: f64) -> FeatureVector {
    let i_expected = expected_current(reading.load_kw, reading.power_factor, nominal_voltage);

    let voltages = reading.voltages();
    let currents = reading.currents();

    FeatureVector {
        load_kw: reading.load_kw,
        power_factor: reading.power_factor,
        voltages,
        currents,
        voltage_dev: voltages.map(|v| v - nominal_voltage),
        current_dev: currents.map(|i| i - i_expected),
        expected_current: i_expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_expected_current_normal_load() {
        // 20 kW at PF 0.9 on 230 V phases: 20000 / (3 * 230 * 0.9) ≈ 32.2 A
        let i = expected_current(20.0, 0.9, 230.0);
        assert!((i - 32.21).abs() < 0.01, "got {i}");
    }

    #[test]
    fn test_expected_current_clamps_on_low_pf() {
        assert_eq!(expected_current(20.0, 0.1, 230.0), 0.0);
        assert_eq!(expected_current(20.0, 0.05, 230.0), 0.0);
    }

    #[test]
    fn test_expected_current_clamps_on_low_voltage() {
        assert_eq!(expected_current(20.0, 0.9, 1.0), 0.0);
        assert_eq!(expected_current(20.0, 0.9, 0.0), 0.0);
    }

    #[test]
    fn test_expected_current_boundary_just_above_guards() {
        let i = expected_current(20.0, 0.11, 1.01);
        assert!(i > 0.0);
        assert!(i.is_finite());
    }

    #[test]
    fn test_derive_features_deviations() {
        let r = reading(20.0, 0.9, [230.0, 225.0, 235.0], [31.4, 31.4, 31.4]);
        let fv = derive_features(&r, 230.0);

        assert_eq!(fv.voltage_dev[0], 0.0);
        assert_eq!(fv.voltage_dev[1], -5.0);
        assert_eq!(fv.voltage_dev[2], 5.0);

        let i_exp = fv.expected_current;
        for (dev, i) in fv.current_dev.iter().zip(fv.currents.iter()) {
            assert!((dev - (i - i_exp)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_derive_features_is_deterministic() {
        let r = reading(37.5, 0.85, [229.1, 230.7, 228.4], [52.3, 51.9, 52.8]);
        let a = derive_features(&r, 230.0);
        let b = derive_features(&r, 230.0);
        // Bit-for-bit identical, not just approximately equal
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_features_clamped_expectation_passes_raw_currents() {
        let r = reading(20.0, 0.05, [230.0, 230.0, 230.0], [10.0, 11.0, 12.0]);
        let fv = derive_features(&r, 230.0);
        assert_eq!(fv.expected_current, 0.0);
        assert_eq!(fv.current_dev, [10.0, 11.0, 12.0]);
    }
}
