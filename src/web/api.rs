//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content.

use std::io::Cursor;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::account::{self, Profile};
use crate::assistant::catalog::QUICK_QUERIES;
use crate::assistant::session::SubmitOutcome;
use crate::config;
use crate::history;
use crate::runtime::Simulation;

use super::content_type_json;

// ---------------------------------------------------------------------------
// JSON request/response types
// ---------------------------------------------------------------------------

/// Chat submit request body.
#[derive(serde::Deserialize)]
struct ChatRequest {
    #[serde(default)]
    query: String,
}

/// Config API response — the full config as a JSON value + the raw TOML.
#[derive(Serialize)]
struct ConfigResponse {
    config: config::CityPulseConfig,
    toml_text: String,
}

/// Config update request — a list of key-value pairs.
#[derive(serde::Deserialize)]
struct ConfigUpdateRequest {
    updates: Vec<ConfigKeyValue>,
}

#[derive(serde::Deserialize)]
struct ConfigKeyValue {
    key: String,
    value: String,
}

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    config_exists: bool,
    history_enabled: bool,
    log_exists: bool,
    metric_count: usize,
    sensor_count: usize,
    alert_count: usize,
    awaiting_response: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response_with_status(data, 200)
}

/// Build a JSON response with an explicit status code.
fn json_response_with_status<T: Serialize>(
    data: &T,
    status: u16,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status)))
}

// ---------------------------------------------------------------------------
// API Handlers — simulation state
// ---------------------------------------------------------------------------

/// `GET /api/metrics` — current metric cards.
pub fn get_metrics(sim: &Simulation) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&serde_json::json!({ "metrics": sim.metrics() }))
}

/// `GET /api/sensors` — current sensor board.
pub fn get_sensors(sim: &Simulation) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&serde_json::json!({ "sensors": sim.sensors() }))
}

/// `GET /api/alerts` — public safety alert feed.
pub fn get_alerts(sim: &Simulation) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&serde_json::json!({ "alerts": sim.alerts() }))
}

// ---------------------------------------------------------------------------
// API Handlers — assistant chat
// ---------------------------------------------------------------------------

/// `GET /api/chat` — the full message log.
pub fn get_chat(sim: &Simulation) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&serde_json::json!({
        "messages": sim.messages(),
        "awaiting_response": sim.is_awaiting_response(),
    }))
}

/// `POST /api/chat` — submit a query and resolve one exchange.
///
/// Blocks through the simulated thinking delay so the new assistant message
/// is in the response. Blank queries are a silent no-op in the library but a
/// visible 422 at this boundary; an in-flight reply under the `reject`
/// overlap policy is a 409.
pub fn post_chat(body: &str, sim: &mut Simulation) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ChatRequest =
        serde_json::from_str(body).context("invalid JSON in chat request")?;

    match sim.submit(&req.query, Utc::now()) {
        SubmitOutcome::IgnoredEmpty => {
            return json_response_with_status(
                &serde_json::json!({ "error": "query must not be empty" }),
                422,
            );
        }
        SubmitOutcome::RejectedBusy => {
            return json_response_with_status(
                &serde_json::json!({ "error": "a reply is already in flight" }),
                409,
            );
        }
        SubmitOutcome::Accepted | SubmitOutcome::Queued => {}
    }

    let delay = config::load().assistant.response_delay_ms;
    std::thread::sleep(std::time::Duration::from_millis(delay));

    let report = sim.advance(Utc::now());
    json_response(&serde_json::json!({
        "messages": report.replies,
        "awaiting_response": sim.is_awaiting_response(),
    }))
}

/// `POST /api/chat/clear` — reset the session to the seed greeting.
pub fn post_chat_clear(sim: &mut Simulation) -> Result<Response<Cursor<Vec<u8>>>> {
    sim.clear_chat(Utc::now());
    json_response(&serde_json::json!({
        "messages": sim.messages(),
        "awaiting_response": false,
    }))
}

/// `GET /api/quick-queries` — the static shortcut list.
pub fn get_quick_queries() -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&serde_json::json!({ "quick_queries": QUICK_QUERIES }))
}

// ---------------------------------------------------------------------------
// API Handlers — account mock
// ---------------------------------------------------------------------------

/// Sign-in request body. No real authentication: the password is checked
/// for presence only.
#[derive(serde::Deserialize)]
struct SignInRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// `GET /api/account` — current profile, if signed in.
pub fn get_account(profile: &Option<Profile>) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&serde_json::json!({ "profile": profile }))
}

/// `POST /api/account/sign-in` — validate the form and store the profile.
pub fn post_sign_in(
    body: &str,
    profile: &mut Option<Profile>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: SignInRequest =
        serde_json::from_str(body).context("invalid JSON in sign-in request")?;

    match account::sign_in(&req.name, &req.email, &req.password) {
        Ok(new_profile) => {
            *profile = Some(new_profile.clone());
            json_response(&serde_json::json!({ "profile": new_profile }))
        }
        Err(e) => json_response_with_status(&serde_json::json!({ "error": e.to_string() }), 422),
    }
}

/// `POST /api/account/sign-out` — drop the profile and reset the chat.
pub fn post_sign_out(
    sim: &mut Simulation,
    profile: &mut Option<Profile>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    *profile = None;
    sim.clear_chat(Utc::now());
    json_response(&serde_json::json!({ "profile": null, "signed_out": true }))
}

// ---------------------------------------------------------------------------
// API Handlers — configuration
// ---------------------------------------------------------------------------

/// `GET /api/config` — current effective configuration.
pub fn get_config() -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let toml_text = toml::to_string_pretty(&cfg).unwrap_or_default();

    let resp = ConfigResponse {
        config: cfg,
        toml_text,
    };

    json_response(&resp)
}

/// `PUT /api/config` — update configuration keys.
///
/// Expects JSON body: `{ "updates": [{ "key": "assistant.overlap", "value": "queue" }] }`
pub fn put_config(body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ConfigUpdateRequest =
        serde_json::from_str(body).context("invalid JSON in config update request")?;

    let mut errors: Vec<String> = Vec::new();
    let mut applied: Vec<String> = Vec::new();

    for kv in &req.updates {
        match config::set_config_value(&kv.key, &kv.value) {
            Ok(()) => applied.push(format!("{} = {}", kv.key, kv.value)),
            Err(e) => errors.push(format!("{}: {}", kv.key, e)),
        }
    }

    let result = serde_json::json!({
        "applied": applied,
        "errors": errors,
        "success": errors.is_empty(),
    });

    json_response(&result)
}

/// `POST /api/config/reset` — reset config to defaults.
pub fn post_config_reset() -> Result<Response<Cursor<Vec<u8>>>> {
    config::reset_config().context("failed to reset config")?;

    let result = serde_json::json!({
        "success": true,
        "message": "Configuration reset to defaults",
    });

    json_response(&result)
}

// ---------------------------------------------------------------------------
// API Handlers — health
// ---------------------------------------------------------------------------

/// `GET /api/health` — system health summary.
pub fn get_health(sim: &Simulation) -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = config::load();
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let log_exists = history::exchange_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = HealthResponse {
        config_exists,
        history_enabled: cfg.history.enabled,
        log_exists,
        metric_count: sim.metrics().len(),
        sensor_count: sim.sensors().len(),
        alert_count: sim.alerts().len(),
        awaiting_response: sim.is_awaiting_response(),
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_deserializes() {
        let req: ChatRequest = serde_json::from_str(r#"{"query": "traffic now"}"#).unwrap();
        assert_eq!(req.query, "traffic now");
    }

    #[test]
    fn chat_request_defaults_missing_query_to_empty() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query.is_empty());
    }

    #[test]
    fn config_update_request_deserializes() {
        let json = r#"{"updates": [{"key": "assistant.overlap", "value": "queue"}]}"#;
        let req: ConfigUpdateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.updates.len(), 1);
        assert_eq!(req.updates[0].key, "assistant.overlap");
        assert_eq!(req.updates[0].value, "queue");
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            config_exists: true,
            history_enabled: true,
            log_exists: false,
            metric_count: 8,
            sensor_count: 4,
            alert_count: 3,
            awaiting_response: false,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"metric_count\":8"));
        assert!(json.contains("\"config_exists\":true"));
    }
}
