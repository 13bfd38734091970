//! Grid Configuration Module
//!
//! Per-deployment configuration loaded from TOML, replacing hardcoded
//! thresholds with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `GRIDWARDEN_CONFIG` environment variable (path to TOML file)
//! 2. `gridwarden.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The loaded `GridConfig` is passed by value to the components that need it
//! at startup; there is no process-global config.

mod grid_config;
pub mod defaults;

pub use grid_config::*;
