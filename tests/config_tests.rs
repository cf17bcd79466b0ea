/// Configuration schema tests.
///
/// Covers default values, partial TOML overlays, and the annotated default
/// config document. Loader-internal helpers (env parsing, dotted-key
/// updates) are unit-tested inside `config`.
use citypulse::assistant::catalog::SelectionPolicy;
use citypulse::assistant::session::OverlapPolicy;
use citypulse::config::CityPulseConfig;
use citypulse::telemetry::sensors::SensorStatusMode;

#[test]
fn defaults_match_the_dashboard_behavior() {
    let cfg = CityPulseConfig::default();
    assert_eq!(cfg.assistant.response_delay_ms, 1500);
    assert_eq!(cfg.assistant.selection, SelectionPolicy::Deterministic);
    assert_eq!(cfg.assistant.overlap, OverlapPolicy::Reject);
    assert_eq!(cfg.telemetry.metrics_interval_ms, 5000);
    assert_eq!(cfg.telemetry.sensors_interval_ms, 3000);
    assert_eq!(cfg.telemetry.warning_above, 65);
    assert_eq!(cfg.telemetry.critical_above, 80);
    assert_eq!(cfg.telemetry.sensor_status, SensorStatusMode::Random);
    assert!(cfg.history.enabled);
    assert_eq!(cfg.web.addr, "127.0.0.1:9748");
}

#[test]
fn partial_toml_keeps_defaults_for_missing_sections() {
    let toml_str = r#"
[assistant]
response_delay_ms = 250
overlap = "queue"
"#;
    let cfg: CityPulseConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.assistant.response_delay_ms, 250);
    assert_eq!(cfg.assistant.overlap, OverlapPolicy::Queue);
    // Untouched sections fall back to defaults.
    assert_eq!(cfg.assistant.selection, SelectionPolicy::Deterministic);
    assert_eq!(cfg.telemetry.metrics_interval_ms, 5000);
    assert!(cfg.history.enabled);
}

#[test]
fn sensor_bounds_override_converts_into_board_bounds() {
    let toml_str = r#"
[telemetry.sensor_bounds]
noise_min = 30.0
noise_max = 90.0
"#;
    let cfg: CityPulseConfig = toml::from_str(toml_str).unwrap();
    let bounds = cfg.telemetry.sensor_bounds.to_bounds();
    assert_eq!(bounds.noise_min, 30.0);
    assert_eq!(bounds.noise_max, 90.0);
    // Unspecified channels stay at the dashboard clamps.
    assert_eq!(bounds.crowd_max, 200.0);
    assert_eq!(bounds.flow_step, 15.0);
}

#[test]
fn selection_and_status_variants_parse_from_toml() {
    let toml_str = r#"
[assistant]
selection = "random"

[telemetry]
sensor_status = "derived"
"#;
    let cfg: CityPulseConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.assistant.selection, SelectionPolicy::Random);
    assert_eq!(cfg.telemetry.sensor_status, SensorStatusMode::Derived);
}

#[test]
fn unknown_overlap_value_is_a_parse_error() {
    let toml_str = r#"
[assistant]
overlap = "sometimes"
"#;
    assert!(toml::from_str::<CityPulseConfig>(toml_str).is_err());
}

#[test]
fn default_toml_document_round_trips_to_defaults() {
    let cfg: CityPulseConfig = toml::from_str(&CityPulseConfig::default_toml()).unwrap();
    let defaults = CityPulseConfig::default();
    assert_eq!(cfg.assistant.response_delay_ms, defaults.assistant.response_delay_ms);
    assert_eq!(cfg.telemetry.sensors_interval_ms, defaults.telemetry.sensors_interval_ms);
    assert_eq!(cfg.history.path, defaults.history.path);
    assert_eq!(cfg.web.addr, defaults.web.addr);
}

#[test]
fn effective_config_serializes_back_to_toml() {
    let cfg = CityPulseConfig::default();
    let text = toml::to_string_pretty(&cfg).unwrap();
    assert!(text.contains("[assistant]"));
    assert!(text.contains("[telemetry]"));
    assert!(text.contains("[history]"));
    assert!(text.contains("[web]"));
}
