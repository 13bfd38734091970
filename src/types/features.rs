//! Derived feature vector and the versioned feature-layout contract.

use serde::{Deserialize, Serialize};

/// Versioned layout of the classifier input vector.
///
/// The trained model is fitted against one exact feature ordering; feeding it a
/// different layout produces silently wrong predictions. Making the layout an
/// explicit enum turns that mistake into a schema-mismatch error at
/// classification time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSchema {
    /// `[load_kw, pf, Va, Vb, Vc, Ia, Ib, Ic, dVa, dVb, dVc, dIa, dIb, dIc]`
    Full14,
    /// `[load_kw, pf, dVa, dVb, dVc, dI_max]` — reduced deployment variant
    Reduced6,
}

impl FeatureSchema {
    /// Number of values a vector of this schema flattens to.
    pub const fn width(self) -> usize {
        match self {
            Self::Full14 => 14,
            Self::Reduced6 => 6,
        }
    }
}

impl std::fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full14 => write!(f, "full14"),
            Self::Reduced6 => write!(f, "reduced6"),
        }
    }
}

/// Physics-derived feature vector for one telemetry reading.
///
/// Raw channels plus deviations of each channel from its expectation:
/// voltages against the configured nominal, currents against the expected
/// current from 3-phase power physics. Produced by
/// [`physics::derive_features`](crate::physics::derive_features); carries no
/// persistent identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub load_kw: f64,
    pub power_factor: f64,
    /// Raw phase voltages, A/B/C order (V)
    pub voltages: [f64; 3],
    /// Raw phase currents, A/B/C order (A)
    pub currents: [f64; 3],
    /// Voltage deviation from nominal per phase (V)
    pub voltage_dev: [f64; 3],
    /// Current deviation from physics-expected per phase (A)
    pub current_dev: [f64; 3],
    /// Expected line current from 3-phase power physics (A)
    pub expected_current: f64,
}

impl FeatureVector {
    /// Flatten to the ordering defined by `schema`.
    pub fn to_ordered(&self, schema: FeatureSchema) -> Vec<f64> {
        match schema {
            FeatureSchema::Full14 => {
                let mut v = Vec::with_capacity(14);
                v.push(self.load_kw);
                v.push(self.power_factor);
                v.extend_from_slice(&self.voltages);
                v.extend_from_slice(&self.currents);
                v.extend_from_slice(&self.voltage_dev);
                v.extend_from_slice(&self.current_dev);
                v
            }
            FeatureSchema::Reduced6 => {
                let di_max = self
                    .current_dev
                    .iter()
                    .fold(0.0_f64, |acc, d| acc.max(d.abs()));
                vec![
                    self.load_kw,
                    self.power_factor,
                    self.voltage_dev[0],
                    self.voltage_dev[1],
                    self.voltage_dev[2],
                    di_max,
                ]
            }
        }
    }

    /// Largest absolute current deviation across phases (A).
    pub fn max_current_dev(&self) -> f64 {
        self.current_dev.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()))
    }

    /// Lowest phase voltage (V).
    pub fn min_voltage(&self) -> f64 {
        self.voltages.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vector() -> FeatureVector {
        FeatureVector {
            load_kw: 20.0,
            power_factor: 0.9,
            voltages: [230.0, 228.0, 231.0],
            currents: [31.0, 32.0, 33.0],
            voltage_dev: [0.0, -2.0, 1.0],
            current_dev: [-1.2, -0.2, 0.8],
            expected_current: 32.2,
        }
    }

    #[test]
    fn test_full14_ordering() {
        let v = sample_vector().to_ordered(FeatureSchema::Full14);
        assert_eq!(v.len(), FeatureSchema::Full14.width());
        assert_eq!(v[0], 20.0);
        assert_eq!(v[1], 0.9);
        assert_eq!(v[2], 230.0); // Va before currents
        assert_eq!(v[5], 31.0); // Ia
        assert_eq!(v[8], 0.0); // dVa
        assert_eq!(v[11], -1.2); // dIa
    }

    #[test]
    fn test_reduced6_ordering() {
        let v = sample_vector().to_ordered(FeatureSchema::Reduced6);
        assert_eq!(v.len(), FeatureSchema::Reduced6.width());
        assert_eq!(v[5], 1.2); // max |dI|
    }

    #[test]
    fn test_min_voltage() {
        assert_eq!(sample_vector().min_voltage(), 228.0);
    }
}
