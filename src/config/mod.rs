/// Configuration system for citypulse.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::CityPulseConfig::default()`]
/// 2. **User global config** — `~/.citypulse/config.toml`
/// 3. **Project local config** — `.citypulse.toml` in the current working directory
/// 4. **Environment variables** — `CITYPULSE_*` overrides (highest precedence)
///
/// Later layers override earlier ones. Missing sections in a TOML file fall
/// back to the previous layer's values.
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::assistant::catalog::SelectionPolicy;
use crate::assistant::session::OverlapPolicy;
use crate::telemetry::sensors::SensorStatusMode;

pub use schema::CityPulseConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved citypulse configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the primary entry point for all modules that need
/// configuration.
pub fn load() -> CityPulseConfig {
    let mut config = CityPulseConfig::default();

    // Layer 2: user global config (~/.citypulse/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        config = global;
    }

    // Layer 3: project local config (.citypulse.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        config = project;
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. A malformed config must never take the demo down,
/// so parse failures are silently ignored.
fn load_toml_file(path: Option<PathBuf>) -> Option<CityPulseConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.citypulse/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".citypulse").join("config.toml"))
}

/// Path to the project local config: `.citypulse.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".citypulse.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `CITYPULSE_RESPONSE_DELAY_MS` — assistant thinking delay
/// - `CITYPULSE_SELECTION` — `deterministic` | `random`
/// - `CITYPULSE_OVERLAP` — `reject` | `queue` | `allow`
/// - `CITYPULSE_SENSOR_STATUS` — `random` | `derived`
/// - `CITYPULSE_HISTORY` — exchange logging (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut CityPulseConfig) {
    if let Ok(val) = std::env::var("CITYPULSE_RESPONSE_DELAY_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.assistant.response_delay_ms = ms;
    }
    if let Ok(val) = std::env::var("CITYPULSE_SELECTION")
        && let Some(selection) = parse_selection(&val)
    {
        config.assistant.selection = selection;
    }
    if let Ok(val) = std::env::var("CITYPULSE_OVERLAP")
        && let Some(overlap) = parse_overlap(&val)
    {
        config.assistant.overlap = overlap;
    }
    if let Ok(val) = std::env::var("CITYPULSE_SENSOR_STATUS")
        && let Some(mode) = parse_sensor_status(&val)
    {
        config.telemetry.sensor_status = mode;
    }
    if let Ok(val) = std::env::var("CITYPULSE_HISTORY") {
        config.history.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a selection policy string.
fn parse_selection(val: &str) -> Option<SelectionPolicy> {
    match val.to_ascii_lowercase().as_str() {
        "deterministic" => Some(SelectionPolicy::Deterministic),
        "random" => Some(SelectionPolicy::Random),
        _ => None,
    }
}

/// Parse an overlap policy string.
fn parse_overlap(val: &str) -> Option<OverlapPolicy> {
    match val.to_ascii_lowercase().as_str() {
        "reject" => Some(OverlapPolicy::Reject),
        "queue" => Some(OverlapPolicy::Queue),
        "allow" => Some(OverlapPolicy::Allow),
        _ => None,
    }
}

/// Parse a sensor status mode string.
fn parse_sensor_status(val: &str) -> Option<SensorStatusMode> {
    match val.to_ascii_lowercase().as_str() {
        "random" => Some(SensorStatusMode::Random),
        "derived" => Some(SensorStatusMode::Derived),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.citypulse/config.toml`.
///
/// Creates the `~/.citypulse/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.citypulse/ directory")?;
    }

    fs::write(&path, CityPulseConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like
/// `assistant.selection` or `telemetry.sensor_bounds.noise_max`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let toml_str = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&CityPulseConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&toml_str).context("failed to parse config as TOML value")?;

    set_toml_value(&mut value_table, key, value)?;

    let output = toml::to_string_pretty(&value_table).context("failed to serialize config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.is_empty() {
        anyhow::bail!("empty config key");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // Determine the type of the existing value to parse correctly.
    let existing = table.get(leaf);
    let new_value = match existing {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

/// Expand a leading `~/` in a configured path to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn parse_selection_handles_variants() {
        assert_eq!(
            parse_selection("deterministic"),
            Some(SelectionPolicy::Deterministic)
        );
        assert_eq!(parse_selection("RANDOM"), Some(SelectionPolicy::Random));
        assert_eq!(parse_selection("invalid"), None);
    }

    #[test]
    fn parse_overlap_handles_variants() {
        assert_eq!(parse_overlap("reject"), Some(OverlapPolicy::Reject));
        assert_eq!(parse_overlap("queue"), Some(OverlapPolicy::Queue));
        assert_eq!(parse_overlap("allow"), Some(OverlapPolicy::Allow));
        assert_eq!(parse_overlap("invalid"), None);
    }

    #[test]
    fn parse_sensor_status_handles_variants() {
        assert_eq!(parse_sensor_status("random"), Some(SensorStatusMode::Random));
        assert_eq!(
            parse_sensor_status("derived"),
            Some(SensorStatusMode::Derived)
        );
        assert_eq!(parse_sensor_status("invalid"), None);
    }

    #[test]
    fn set_toml_value_updates_string() {
        let toml_str = r#"
[assistant]
selection = "deterministic"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "assistant.selection", "random").unwrap();

        let table = root.as_table().unwrap();
        let assistant = table["assistant"].as_table().unwrap();
        assert_eq!(assistant["selection"].as_str(), Some("random"));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let toml_str = r#"
[assistant]
response_delay_ms = 1500
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "assistant.response_delay_ms", "500").unwrap();

        let table = root.as_table().unwrap();
        let assistant = table["assistant"].as_table().unwrap();
        assert_eq!(assistant["response_delay_ms"].as_integer(), Some(500));
    }

    #[test]
    fn set_toml_value_updates_nested_float() {
        let toml_str = r#"
[telemetry.sensor_bounds]
noise_max = 100.0
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "telemetry.sensor_bounds.noise_max", "90.0").unwrap();

        let bounds = root["telemetry"]["sensor_bounds"].as_table().unwrap();
        assert!((bounds["noise_max"].as_float().unwrap() - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn set_toml_value_rejects_invalid_key() {
        let toml_str = r#"
[assistant]
selection = "deterministic"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        let result = set_toml_value(&mut root, "nonexistent.key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn expand_home_leaves_absolute_paths_alone() {
        assert_eq!(
            expand_home("/tmp/chat.jsonl"),
            PathBuf::from("/tmp/chat.jsonl")
        );
    }
}
