/// Configuration schema and defaults for the entire citypulse system.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[assistant]`, `[telemetry]`, `[telemetry.sensor_bounds]`, `[history]`,
/// and `[web]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

use crate::assistant::catalog::SelectionPolicy;
use crate::assistant::session::OverlapPolicy;
use crate::telemetry::MetricThresholds;
use crate::telemetry::sensors::{SensorBounds, SensorStatusMode};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level citypulse configuration.
///
/// Maps directly to the `~/.citypulse/config.toml` and `.citypulse.toml`
/// file schemas. All sections and fields are optional — missing values fall
/// back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CityPulseConfig {
    pub assistant: AssistantConfig,
    pub telemetry: TelemetryConfig,
    pub history: HistoryConfig,
    pub web: WebConfig,
}

// ---------------------------------------------------------------------------
// [assistant]
// ---------------------------------------------------------------------------

/// Chat assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Simulated thinking delay before an assistant reply lands (ms).
    pub response_delay_ms: u64,
    /// Payload selection: `deterministic` (enriched) or `random` (short answers).
    pub selection: SelectionPolicy,
    /// Policy for submits that arrive while a reply is in flight:
    /// `reject`, `queue`, or `allow`.
    pub overlap: OverlapPolicy,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            response_delay_ms: 1500,
            selection: SelectionPolicy::default(),
            overlap: OverlapPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// [telemetry]
// ---------------------------------------------------------------------------

/// Synthetic telemetry cadences and thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// City metric updater cadence (ms).
    pub metrics_interval_ms: u64,
    /// Sensor board updater cadence (ms).
    pub sensors_interval_ms: u64,
    /// Progress percentage above which a metric turns warning.
    pub warning_above: u8,
    /// Progress percentage above which a metric turns critical.
    pub critical_above: u8,
    /// Sensor status assignment: `random` (source-faithful) or `derived`.
    pub sensor_status: SensorStatusMode,
    /// Per-channel walk steps and clamp bounds.
    pub sensor_bounds: SensorBoundsConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_interval_ms: 5000,
            sensors_interval_ms: 3000,
            warning_above: 65,
            critical_above: 80,
            sensor_status: SensorStatusMode::default(),
            sensor_bounds: SensorBoundsConfig::default(),
        }
    }
}

impl TelemetryConfig {
    pub fn metric_thresholds(&self) -> MetricThresholds {
        MetricThresholds {
            warning_above: self.warning_above,
            critical_above: self.critical_above,
        }
    }
}

/// `[telemetry.sensor_bounds]` — walk steps and clamps per sensor channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorBoundsConfig {
    pub noise_min: f64,
    pub noise_max: f64,
    pub noise_step: f64,
    pub crowd_min: f64,
    pub crowd_max: f64,
    pub crowd_step: f64,
    pub flow_min: f64,
    pub flow_max: f64,
    pub flow_step: f64,
}

impl Default for SensorBoundsConfig {
    fn default() -> Self {
        let b = SensorBounds::default();
        Self {
            noise_min: b.noise_min,
            noise_max: b.noise_max,
            noise_step: b.noise_step,
            crowd_min: b.crowd_min,
            crowd_max: b.crowd_max,
            crowd_step: b.crowd_step,
            flow_min: b.flow_min,
            flow_max: b.flow_max,
            flow_step: b.flow_step,
        }
    }
}

impl SensorBoundsConfig {
    pub fn to_bounds(&self) -> SensorBounds {
        SensorBounds {
            noise_min: self.noise_min,
            noise_max: self.noise_max,
            noise_step: self.noise_step,
            crowd_min: self.crowd_min,
            crowd_max: self.crowd_max,
            crowd_step: self.crowd_step,
            flow_min: self.flow_min,
            flow_max: self.flow_max,
            flow_step: self.flow_step,
        }
    }
}

// ---------------------------------------------------------------------------
// [history]
// ---------------------------------------------------------------------------

/// Exchange log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Whether exchanges are appended to the JSONL log.
    pub enabled: bool,
    /// Path to the exchange log. `~` is expanded to the home directory.
    pub path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.citypulse/chat-log.jsonl".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Default listen address for `citypulse web`.
    pub addr: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9748".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl CityPulseConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `citypulse config init` to create a starting config file with
    /// all settings documented.
    pub fn default_toml() -> String {
        r#"# citypulse Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CITYPULSE_*)
#   2. Project config (.citypulse.toml in current directory)
#   3. User global config (~/.citypulse/config.toml)
#   4. Built-in defaults

[assistant]
response_delay_ms = 1500        # Simulated thinking delay
selection = "deterministic"     # deterministic | random
overlap = "reject"              # reject | queue | allow

[telemetry]
metrics_interval_ms = 5000
sensors_interval_ms = 3000
warning_above = 65              # progress > 65  -> warning
critical_above = 80             # progress > 80  -> critical
sensor_status = "random"        # random (source-faithful) | derived

[telemetry.sensor_bounds]
noise_min = 40.0
noise_max = 100.0
noise_step = 10.0
crowd_min = 0.0
crowd_max = 200.0
crowd_step = 20.0
flow_min = 0.0
flow_max = 100.0
flow_step = 15.0

[history]
enabled = true
path = "~/.citypulse/chat-log.jsonl"

[web]
addr = "127.0.0.1:9748"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = CityPulseConfig::default();
        assert_eq!(config.assistant.response_delay_ms, 1500);
        assert_eq!(config.assistant.selection, SelectionPolicy::Deterministic);
        assert_eq!(config.assistant.overlap, OverlapPolicy::Reject);
        assert_eq!(config.telemetry.metrics_interval_ms, 5000);
        assert_eq!(config.telemetry.sensors_interval_ms, 3000);
        assert_eq!(config.telemetry.warning_above, 65);
        assert_eq!(config.telemetry.critical_above, 80);
        assert_eq!(config.telemetry.sensor_status, SensorStatusMode::Random);
        assert!(config.history.enabled);
        assert_eq!(config.web.addr, "127.0.0.1:9748");
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[assistant]
selection = "random"
"#;
        let config: CityPulseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.assistant.selection, SelectionPolicy::Random);
        // All other fields fall back to defaults.
        assert_eq!(config.assistant.response_delay_ms, 1500);
        assert_eq!(config.telemetry.metrics_interval_ms, 5000);
    }

    #[test]
    fn deserialize_full_toml() {
        let toml_str = r#"
[assistant]
response_delay_ms = 500
selection = "random"
overlap = "queue"

[telemetry]
metrics_interval_ms = 1000
sensors_interval_ms = 750
warning_above = 60
critical_above = 85
sensor_status = "derived"

[telemetry.sensor_bounds]
noise_min = 30.0
noise_max = 90.0

[history]
enabled = false
path = "/tmp/chat.jsonl"

[web]
addr = "0.0.0.0:8080"
"#;
        let config: CityPulseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.assistant.response_delay_ms, 500);
        assert_eq!(config.assistant.overlap, OverlapPolicy::Queue);
        assert_eq!(config.telemetry.warning_above, 60);
        assert_eq!(config.telemetry.sensor_status, SensorStatusMode::Derived);
        assert_eq!(config.telemetry.sensor_bounds.noise_min, 30.0);
        // Unset bounds keep their defaults.
        assert_eq!(config.telemetry.sensor_bounds.crowd_max, 200.0);
        assert!(!config.history.enabled);
        assert_eq!(config.web.addr, "0.0.0.0:8080");
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: CityPulseConfig = toml::from_str("").unwrap();
        assert_eq!(config.assistant.response_delay_ms, 1500);
        assert_eq!(config.telemetry.critical_above, 80);
    }

    #[test]
    fn default_toml_parses_back() {
        let toml_str = CityPulseConfig::default_toml();
        let config: CityPulseConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.assistant.response_delay_ms, 1500);
        assert_eq!(config.telemetry.sensor_status, SensorStatusMode::Random);
    }

    #[test]
    fn thresholds_and_bounds_convert() {
        let config = CityPulseConfig::default();
        let thresholds = config.telemetry.metric_thresholds();
        assert_eq!(thresholds.warning_above, 65);
        assert_eq!(thresholds.critical_above, 80);

        let bounds = config.telemetry.sensor_bounds.to_bounds();
        assert_eq!(bounds.noise_max, 100.0);
        assert_eq!(bounds.crowd_step, 20.0);
    }
}
