//! Telemetry reading types (canonical v1 three-phase shape)

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper physical bound for a phase voltage (V). 500 kV covers transmission level.
pub const MAX_VOLTAGE_V: f64 = 500_000.0;

/// Upper physical bound for a phase current (A). 100 kA exceeds any credible fault.
pub const MAX_CURRENT_A: f64 = 100_000.0;

/// Upper physical bound for total load (kW). 10 MW for a distribution feeder.
pub const MAX_LOAD_KW: f64 = 10_000.0;

/// One ingestion event from a field device or simulator.
///
/// This is the canonical v1 shape accepted at `/api/v1/telemetry`: total
/// 3-phase load, power factor, and per-phase voltage/current. The legacy
/// 2-channel `{voltage, current, noise}` shape is intentionally not accepted;
/// bridges must upconvert before posting.
///
/// Immutable once received and ephemeral — a reading is only persisted
/// indirectly, when it produces a fault record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub substation_id: String,
    pub line_id: String,
    /// Total 3-phase load (kW)
    pub load_kw: f64,
    /// Power factor, 0-1
    pub power_factor: f64,
    /// Phase voltages (V)
    pub voltage_a: f64,
    pub voltage_b: f64,
    pub voltage_c: f64,
    /// Phase currents (A)
    pub current_a: f64,
    pub current_b: f64,
    pub current_c: f64,
}

impl TelemetryReading {
    /// Phase voltages as an array in A/B/C order.
    pub fn voltages(&self) -> [f64; 3] {
        [self.voltage_a, self.voltage_b, self.voltage_c]
    }

    /// Phase currents as an array in A/B/C order.
    pub fn currents(&self) -> [f64; 3] {
        [self.current_a, self.current_b, self.current_c]
    }

    /// Validate the reading before it reaches the classifier or the live cache.
    ///
    /// Non-finite or out-of-physical-range values are rejected here so that
    /// NaN/Inf never enters the feature pipeline. No state is mutated for a
    /// reading that fails validation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.substation_id.trim().is_empty() {
            return Err(ValidationError::MissingField("substation_id"));
        }
        if self.line_id.trim().is_empty() {
            return Err(ValidationError::MissingField("line_id"));
        }

        let channels = [
            ("load_kw", self.load_kw, 0.0, MAX_LOAD_KW),
            ("power_factor", self.power_factor, 0.0, 1.0),
            ("voltage_a", self.voltage_a, 0.0, MAX_VOLTAGE_V),
            ("voltage_b", self.voltage_b, 0.0, MAX_VOLTAGE_V),
            ("voltage_c", self.voltage_c, 0.0, MAX_VOLTAGE_V),
            ("current_a", self.current_a, 0.0, MAX_CURRENT_A),
            ("current_b", self.current_b, 0.0, MAX_CURRENT_A),
            ("current_c", self.current_c, 0.0, MAX_CURRENT_A),
        ];

        for (name, value, min, max) in channels {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite(name));
            }
            if value < min || value > max {
                return Err(ValidationError::OutOfRange { field: name, value, min, max });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy_reading() -> TelemetryReading {
        TelemetryReading {
            substation_id: "SUB-01".to_string(),
            line_id: "LINE-A".to_string(),
            load_kw: 20.0,
            power_factor: 0.9,
            voltage_a: 230.0,
            voltage_b: 230.0,
            voltage_c: 230.0,
            current_a: 31.4,
            current_b: 31.4,
            current_c: 31.4,
        }
    }

    #[test]
    fn test_valid_reading_passes() {
        assert!(healthy_reading().validate().is_ok());
    }

    #[test]
    fn test_nan_rejected() {
        let mut reading = healthy_reading();
        reading.current_b = f64::NAN;
        assert!(matches!(
            reading.validate(),
            Err(ValidationError::NonFinite("current_b"))
        ));
    }

    #[test]
    fn test_infinite_voltage_rejected() {
        let mut reading = healthy_reading();
        reading.voltage_c = f64::INFINITY;
        assert!(matches!(
            reading.validate(),
            Err(ValidationError::NonFinite("voltage_c"))
        ));
    }

    #[test]
    fn test_power_factor_above_one_rejected() {
        let mut reading = healthy_reading();
        reading.power_factor = 1.2;
        assert!(matches!(
            reading.validate(),
            Err(ValidationError::OutOfRange { field: "power_factor", .. })
        ));
    }

    #[test]
    fn test_negative_current_rejected() {
        let mut reading = healthy_reading();
        reading.current_a = -5.0;
        assert!(reading.validate().is_err());
    }

    #[test]
    fn test_empty_substation_id_rejected() {
        let mut reading = healthy_reading();
        reading.substation_id = "  ".to_string();
        assert!(matches!(
            reading.validate(),
            Err(ValidationError::MissingField("substation_id"))
        ));
    }
}
