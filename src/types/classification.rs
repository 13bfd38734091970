//! Classifier output types and fault labels.

use serde::{Deserialize, Serialize};

/// Sentinel label meaning "no fault". Matched trimmed and case-insensitively.
pub const NORMAL_LABEL: &str = "Normal";

/// Fault categories the classifiers emit.
///
/// The string forms match the labels the model was trained on, so
/// [`FaultKind::as_label`] is the single source of truth for label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    /// Single line to ground
    LineGround,
    /// Line to line
    LineLine,
    /// Double line to ground
    DoubleLineGround,
    /// Three-phase short
    ThreeLine,
    /// Open conductor (dropped/hanging wire)
    OpenConductor,
    /// High-impedance ground fault (leakage, hard to detect)
    HighImpedance,
}

impl FaultKind {
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::LineGround => "LG",
            Self::LineLine => "LL",
            Self::DoubleLineGround => "LLG",
            Self::ThreeLine => "LLL",
            Self::OpenConductor => "Open",
            Self::HighImpedance => "HighImpedance",
        }
    }

    /// Parse a label back into a kind. Used to validate model-file class
    /// labels at load; unknown labels stay `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "LG" => Some(Self::LineGround),
            "LL" => Some(Self::LineLine),
            "LLG" => Some(Self::DoubleLineGround),
            "LLL" | "LLLG" => Some(Self::ThreeLine),
            "Open" => Some(Self::OpenConductor),
            "HighImpedance" => Some(Self::HighImpedance),
            _ => None,
        }
    }
}

/// Result of running one feature vector through a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Fault label, or [`NORMAL_LABEL`]
    pub label: String,
    /// Classifier confidence, 0-1
    pub confidence: f64,
}

impl Classification {
    /// A "no fault" verdict. Also the degrade target when a classifier fails.
    pub fn normal() -> Self {
        Self {
            label: NORMAL_LABEL.to_string(),
            confidence: 0.0,
        }
    }

    pub fn fault(kind: FaultKind, confidence: f64) -> Self {
        Self {
            label: kind.as_label().to_string(),
            confidence,
        }
    }

    /// Anything other than the normal sentinel (trimmed, case-insensitive)
    /// counts as a fault.
    pub fn is_fault(&self) -> bool {
        !self.label.trim().eq_ignore_ascii_case(NORMAL_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_is_not_fault() {
        assert!(!Classification::normal().is_fault());
    }

    #[test]
    fn test_normal_sentinel_case_insensitive() {
        let c = Classification {
            label: "  NORMAL ".to_string(),
            confidence: 0.4,
        };
        assert!(!c.is_fault());
    }

    #[test]
    fn test_any_other_label_is_fault() {
        assert!(Classification::fault(FaultKind::LineGround, 0.9).is_fault());
        let unknown = Classification {
            label: "weird".to_string(),
            confidence: 0.1,
        };
        assert!(unknown.is_fault());
    }

    #[test]
    fn test_label_round_trip() {
        for kind in [
            FaultKind::LineGround,
            FaultKind::LineLine,
            FaultKind::DoubleLineGround,
            FaultKind::ThreeLine,
            FaultKind::OpenConductor,
            FaultKind::HighImpedance,
        ] {
            assert_eq!(FaultKind::from_label(kind.as_label()), Some(kind));
        }
    }
}
