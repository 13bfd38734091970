//! Rule-based fault classifier.
//!
//! Ordered threshold checks over the physics feature vector. First matching
//! rule wins — order is the tie-break. Each rule carries a fixed confidence.
//!
//! Rule order (most to least severe):
//! 1. Short-circuit current spikes, labeled by how many phases spike and
//!    whether their voltages collapsed (LLL / LLG / LL / LG)
//! 2. Open conductor: near-zero current on an energized phase under load
//! 3. High-impedance leakage: moderate current deviation with moderate sag
//! 4. Normal

use crate::config::RuleThresholds;
use crate::error::ClassifierError;
use crate::types::{Classification, FaultKind, FeatureSchema, FeatureVector};

use super::Classifier;

/// Deterministic threshold classifier, the fallback strategy when no trained
/// model is deployed.
pub struct RuleClassifier {
    thresholds: RuleThresholds,
}

impl RuleClassifier {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// Rule 1: short-circuit spikes.
    ///
    /// Counts phases above the spike threshold; voltage collapse on the
    /// spiking phases separates ground-involved faults from line-to-line.
    fn check_short_circuit(&self, fv: &FeatureVector) -> Option<Classification> {
        let t = &self.thresholds;
        let spiking: Vec<usize> = (0..3)
            .filter(|&p| fv.currents[p] > t.short_circuit_amps)
            .collect();

        if spiking.is_empty() {
            return None;
        }

        let collapsed = spiking
            .iter()
            .filter(|&&p| fv.voltages[p] < t.collapsed_voltage)
            .count();

        let kind = match spiking.len() {
            3 => FaultKind::ThreeLine,
            2 if collapsed == 2 => FaultKind::DoubleLineGround,
            2 => FaultKind::LineLine,
            _ => FaultKind::LineGround,
        };

        let confidence = match kind {
            FaultKind::ThreeLine => 0.99,
            FaultKind::DoubleLineGround => 0.97,
            FaultKind::LineLine => 0.95,
            _ => 0.95,
        };

        Some(Classification::fault(kind, confidence))
    }

    /// Rule 2: open conductor.
    ///
    /// A phase carrying near-zero current while the line is expected to be
    /// loaded and the phase is still energized — the dropped/hanging wire
    /// case, the dangerous one.
    fn check_open_conductor(&self, fv: &FeatureVector) -> Option<Classification> {
        let t = &self.thresholds;
        if fv.expected_current <= t.min_loaded_current {
            return None;
        }

        let open = (0..3).any(|p| {
            fv.currents[p] < t.open_conductor_amps
                && fv.voltages[p] > t.energized_voltage_floor
        });

        open.then(|| Classification::fault(FaultKind::OpenConductor, 0.98))
    }

    /// Rule 3: high-impedance ground fault.
    ///
    /// Leakage current well above expectation but far below a short, with a
    /// matching voltage sag. The hardest category to detect, hence the
    /// lowest confidence.
    fn check_high_impedance(&self, fv: &FeatureVector) -> Option<Classification> {
        let t = &self.thresholds;
        let dev = fv.max_current_dev();
        if dev < t.high_impedance_dev_min || dev > t.high_impedance_dev_max {
            return None;
        }

        let sagging = fv
            .voltage_dev
            .iter()
            .any(|&dv| dv < -t.high_impedance_sag_min);

        sagging.then(|| Classification::fault(FaultKind::HighImpedance, 0.75))
    }
}

impl Classifier for RuleClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<Classification, ClassifierError> {
        let all = features.to_ordered(FeatureSchema::Full14);
        if all.iter().any(|v| !v.is_finite()) {
            return Err(ClassifierError::MalformedInput(
                "non-finite value in feature vector".to_string(),
            ));
        }

        Ok(self
            .check_short_circuit(features)
            .or_else(|| self.check_open_conductor(features))
            .or_else(|| self.check_high_impedance(features))
            .unwrap_or_else(Classification::normal))
    }

    fn schema(&self) -> FeatureSchema {
        FeatureSchema::Full14
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
