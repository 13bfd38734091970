//! Grid Configuration - all operating thresholds as operator-tunable TOML values
//!
//! Every threshold that would otherwise be hardcoded is a field in this module.
//! Each struct implements `Default` with values from [`defaults`], so behavior
//! is unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::FeatureSchema;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a substation deployment.
///
/// Load with `GridConfig::load()` which searches:
/// 1. `$GRIDWARDEN_CONFIG` env var
/// 2. `./gridwarden.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridConfig {
    /// Substation / line identification
    #[serde(default)]
    pub substation: SubstationInfo,

    /// Feature derivation constants
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// Classifier selection and rule thresholds
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Trip policy
    #[serde(default)]
    pub policy: PolicyConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Fault event log storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Notification sink
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Authorization tokens for mutating endpoints
    #[serde(default)]
    pub auth: AuthConfig,
}

impl GridConfig {
    /// Load configuration using the standard search order:
    /// 1. `$GRIDWARDEN_CONFIG` environment variable
    /// 2. `./gridwarden.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("GRIDWARDEN_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), substation = %config.substation.id,
                              "Loaded grid config from GRIDWARDEN_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e,
                              "Failed to load config from GRIDWARDEN_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "GRIDWARDEN_CONFIG points to non-existent file, falling back");
            }
        }

        let local = Path::new("gridwarden.toml");
        if local.exists() {
            match Self::load_from_file(local) {
                Ok(config) => {
                    info!(substation = %config.substation.id, "Loaded ./gridwarden.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./gridwarden.toml, using defaults");
                }
            }
        }

        info!("No config file found, using built-in defaults");
        Self::default()
    }

    /// Load and parse a specific TOML file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Substation / line identity stamped onto fault records and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstationInfo {
    #[serde(default = "SubstationInfo::default_id")]
    pub id: String,
    #[serde(default = "SubstationInfo::default_line")]
    pub line_id: String,
    /// Free-text location for operator dashboards
    #[serde(default)]
    pub location: String,
}

impl SubstationInfo {
    fn default_id() -> String {
        "SUB-01".to_string()
    }
    fn default_line() -> String {
        "LINE-A".to_string()
    }
}

impl Default for SubstationInfo {
    fn default() -> Self {
        Self {
            id: Self::default_id(),
            line_id: Self::default_line(),
            location: String::new(),
        }
    }
}

/// Feature derivation constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Nominal phase voltage (V) used for voltage deviations and the
    /// expected-current formula
    #[serde(default = "PhysicsConfig::default_nominal_voltage")]
    pub nominal_voltage: f64,
}

impl PhysicsConfig {
    fn default_nominal_voltage() -> f64 {
        defaults::NOMINAL_PHASE_VOLTAGE
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            nominal_voltage: Self::default_nominal_voltage(),
        }
    }
}

/// Which classifier variant is active, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    /// Trained statistical model, falling back to rules if the model file
    /// fails to load at startup
    Model,
    /// Deterministic rule-based thresholds only
    Rules,
}

/// Classifier selection and rule thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "ClassifierConfig::default_mode")]
    pub mode: ClassifierMode,

    /// Path to the trained model JSON (only used in `model` mode)
    #[serde(default = "ClassifierConfig::default_model_path")]
    pub model_path: String,

    /// Feature layout the deployment is wired for. A model trained against a
    /// different layout is rejected at startup.
    #[serde(default = "ClassifierConfig::default_schema")]
    pub feature_schema: FeatureSchema,

    #[serde(default)]
    pub rules: RuleThresholds,
}

impl ClassifierConfig {
    const fn default_mode() -> ClassifierMode {
        ClassifierMode::Rules
    }
    fn default_model_path() -> String {
        "models/fault_model.json".to_string()
    }
    const fn default_schema() -> FeatureSchema {
        FeatureSchema::Full14
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: Self::default_mode(),
            model_path: Self::default_model_path(),
            feature_schema: Self::default_schema(),
            rules: RuleThresholds::default(),
        }
    }
}

/// Thresholds for the rule-based classifier, in rule order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleThresholds {
    /// Phase current (A) counted as a short-circuit spike
    #[serde(default = "RuleThresholds::default_short_circuit_amps")]
    pub short_circuit_amps: f64,

    /// Voltage (V) below which a spiking phase counts as collapsed
    #[serde(default = "RuleThresholds::default_collapsed_voltage")]
    pub collapsed_voltage: f64,

    /// Phase current (A) below which a conductor counts as open
    #[serde(default = "RuleThresholds::default_open_conductor_amps")]
    pub open_conductor_amps: f64,

    /// Expected current (A) above which near-zero phase current is suspicious
    #[serde(default = "RuleThresholds::default_min_loaded_current")]
    pub min_loaded_current: f64,

    /// Voltage (V) still present on a dropped-but-energized conductor
    #[serde(default = "RuleThresholds::default_energized_voltage_floor")]
    pub energized_voltage_floor: f64,

    /// High-impedance leakage band (A) on current deviation
    #[serde(default = "RuleThresholds::default_high_impedance_dev_min")]
    pub high_impedance_dev_min: f64,
    #[serde(default = "RuleThresholds::default_high_impedance_dev_max")]
    pub high_impedance_dev_max: f64,

    /// Minimum voltage sag (V) accompanying a high-impedance leak
    #[serde(default = "RuleThresholds::default_high_impedance_sag_min")]
    pub high_impedance_sag_min: f64,
}

impl RuleThresholds {
    fn default_short_circuit_amps() -> f64 {
        defaults::SHORT_CIRCUIT_AMPS
    }
    fn default_collapsed_voltage() -> f64 {
        defaults::COLLAPSED_VOLTAGE
    }
    fn default_open_conductor_amps() -> f64 {
        defaults::OPEN_CONDUCTOR_AMPS
    }
    fn default_min_loaded_current() -> f64 {
        defaults::MIN_LOADED_CURRENT
    }
    fn default_energized_voltage_floor() -> f64 {
        defaults::ENERGIZED_VOLTAGE_FLOOR
    }
    fn default_high_impedance_dev_min() -> f64 {
        defaults::HIGH_IMPEDANCE_DEV_MIN
    }
    fn default_high_impedance_dev_max() -> f64 {
        defaults::HIGH_IMPEDANCE_DEV_MAX
    }
    fn default_high_impedance_sag_min() -> f64 {
        defaults::HIGH_IMPEDANCE_SAG_MIN
    }
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            short_circuit_amps: Self::default_short_circuit_amps(),
            collapsed_voltage: Self::default_collapsed_voltage(),
            open_conductor_amps: Self::default_open_conductor_amps(),
            min_loaded_current: Self::default_min_loaded_current(),
            energized_voltage_floor: Self::default_energized_voltage_floor(),
            high_impedance_dev_min: Self::default_high_impedance_dev_min(),
            high_impedance_dev_max: Self::default_high_impedance_dev_max(),
            high_impedance_sag_min: Self::default_high_impedance_sag_min(),
        }
    }
}

/// Trip policy selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// When true (default), a classified fault returns TRIP to the device.
    /// When false (detect-only), faults are recorded and alerted but the
    /// outbound command stays CONTINUE; only a manual TRIP moves the breaker.
    #[serde(default = "PolicyConfig::default_autonomous_trip")]
    pub autonomous_trip: bool,
}

impl PolicyConfig {
    const fn default_autonomous_trip() -> bool {
        true
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            autonomous_trip: Self::default_autonomous_trip(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_bind_addr")]
    pub bind_addr: String,
}

impl ServerConfig {
    fn default_bind_addr() -> String {
        defaults::DEFAULT_BIND_ADDR.to_string()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: Self::default_bind_addr(),
        }
    }
}

/// Fault event log storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "StorageConfig::default_db_path")]
    pub db_path: String,
}

impl StorageConfig {
    fn default_db_path() -> String {
        defaults::FAULT_DB_PATH.to_string()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: Self::default_db_path(),
        }
    }
}

/// Notification sink configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Operator contact stamped into alert messages
    #[serde(default)]
    pub recipient: String,

    /// Optional webhook URL; alerts are POSTed as JSON when set.
    /// When empty, alerts go to the structured log only.
    #[serde(default)]
    pub webhook_url: String,
}

/// Bearer tokens accepted on mutating endpoints.
///
/// Credential issuance and user management live in an external system; this
/// is only the enforcement point. An empty token list means open dev mode,
/// which logs a warning at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_tokens: Vec<String>,
}

impl AuthConfig {
    pub fn is_open(&self) -> bool {
        self.api_tokens.is_empty()
    }

    pub fn accepts(&self, token: &str) -> bool {
        self.api_tokens.iter().any(|t| t == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GridConfig::default();
        assert_eq!(config.physics.nominal_voltage, 230.0);
        assert_eq!(config.classifier.mode, ClassifierMode::Rules);
        assert!(config.policy.autonomous_trip);
        assert!(config.auth.is_open());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let toml_str = r#"
            [substation]
            id = "SUB-KCH-09"

            [policy]
            autonomous_trip = false
        "#;
        let config: GridConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.substation.id, "SUB-KCH-09");
        assert!(!config.policy.autonomous_trip);
        // Untouched sections keep defaults
        assert_eq!(config.classifier.rules.short_circuit_amps, 5_000.0);
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_feature_schema_from_toml() {
        let toml_str = r#"
            [classifier]
            mode = "model"
            feature_schema = "reduced6"
        "#;
        let config: GridConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.classifier.mode, ClassifierMode::Model);
        assert_eq!(config.classifier.feature_schema, FeatureSchema::Reduced6);
    }

    #[test]
    fn test_auth_accepts() {
        let auth = AuthConfig {
            api_tokens: vec!["secret-1".to_string()],
        };
        assert!(auth.accepts("secret-1"));
        assert!(!auth.accepts("secret-2"));
        assert!(!auth.is_open());
    }
}
