//! Shared data structures for the telemetry-to-decision pipeline
//!
//! - `reading`: canonical v1 three-phase telemetry shape + validation
//! - `features`: derived feature vector and the versioned layout contract
//! - `classification`: classifier verdicts and fault labels
//! - `grid`: grid status, breaker commands, live snapshot, fault records

mod classification;
mod features;
mod grid;
mod reading;

pub use classification::*;
pub use features::*;
pub use grid::*;
pub use reading::*;
