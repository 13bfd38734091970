//! Grid status, breaker commands, live snapshot, and durable fault records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Displayed operating state of the monitored line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GridStatus {
    /// No reading ingested yet since startup
    Waiting,
    /// Last verdict was Normal
    Stable,
    /// Last verdict was a fault
    Critical,
    /// A manual TRIP is in effect and has not been superseded
    ManualTrip,
}

impl std::fmt::Display for GridStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "WAITING"),
            Self::Stable => write!(f, "STABLE"),
            Self::Critical => write!(f, "CRITICAL"),
            Self::ManualTrip => write!(f, "MANUAL_TRIP"),
        }
    }
}

/// Outbound control decision returned to the field device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerCommand {
    Continue,
    Trip,
    Reset,
}

impl std::fmt::Display for BreakerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "CONTINUE"),
            Self::Trip => write!(f, "TRIP"),
            Self::Reset => write!(f, "RESET"),
        }
    }
}

/// Operator command waiting in the single-slot mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManualCommand {
    Trip,
    Reset,
}

impl ManualCommand {
    /// The breaker command this manual action translates to.
    pub const fn as_breaker_command(self) -> BreakerCommand {
        match self {
            Self::Trip => BreakerCommand::Trip,
            Self::Reset => BreakerCommand::Reset,
        }
    }

    /// Wire/log spelling of the command.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trip => "TRIP",
            Self::Reset => "RESET",
        }
    }

    /// Strict parse of the control endpoint's action string.
    /// Anything other than TRIP/RESET (case-insensitive) is rejected.
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_ascii_uppercase().as_str() {
            "TRIP" => Some(Self::Trip),
            "RESET" => Some(Self::Reset),
            _ => None,
        }
    }
}

impl std::fmt::Display for ManualCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most-recent-reading snapshot exposed to dashboard readers.
///
/// Overwritten in place every cycle; readers always see one committed write,
/// never a torn mix of two cycles. Not persisted — lost on restart by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Representative voltage (lowest phase, V)
    pub voltage: f64,
    /// Representative current (highest phase, A)
    pub current: f64,
    pub status: GridStatus,
    pub last_updated: DateTime<Utc>,
}

impl Default for GridSnapshot {
    fn default() -> Self {
        Self {
            voltage: 0.0,
            current: 0.0,
            status: GridStatus::Waiting,
            last_updated: Utc::now(),
        }
    }
}

/// Lifecycle status of a durable fault record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultStatus {
    Active,
    Resolved,
}

/// Durable append-only record of one detected fault.
///
/// Written by the ingestion pipeline when a fault is detected and no manual
/// override preempted that cycle. The ingestion path never mutates existing
/// records; resolution is an administrative action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultRecord {
    /// Storage key: epoch milliseconds of detection (unique per record)
    pub id: u64,
    pub substation_id: String,
    pub line_id: String,
    pub timestamp: DateTime<Utc>,
    pub voltage: f64,
    pub current: f64,
    pub fault_label: String,
    pub status: FaultStatus,
}
