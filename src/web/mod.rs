//! Embedded web dashboard for citypulse.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page city dashboard with assistant chat and live metric cards
//! - JSON API endpoints for metrics, sensors, alerts, chat, and config
//!
//! Launched via `citypulse web` (default: `http://127.0.0.1:9748`).
//!
//! The server owns one [`Simulation`] for its whole lifetime. Every request
//! advances the simulation clock first, so due telemetry ticks and assistant
//! replies resolve on the next poll rather than on background timers.

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use chrono::Utc;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::account::Profile;
use crate::config;
use crate::rng::ThreadRandom;
use crate::runtime::Simulation;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on the given address.
///
/// Blocks the current thread. Handles requests sequentially (sufficient for
/// a local single-user dashboard). Gracefully handles errors per-request
/// without crashing the server.
pub fn serve(addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let cfg = config::load();
    let mut sim = Simulation::new(&cfg, Box::new(ThreadRandom), Utc::now());
    let mut profile: Option<Profile> = None;

    println!("citypulse dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    // Try to open in default browser (best-effort)
    let url = format!("http://{addr}");
    let _ = open_browser(&url);

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        // Catch up on every due tick and pending reply before answering.
        sim.advance(Utc::now());

        let result = dispatch(&method, &url, body.as_deref(), &mut sim, &mut profile);

        match result {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                let body = serde_json::json!({ "error": e.to_string() }).to_string();
                let resp = Response::from_data(body.into_bytes())
                    .with_header(content_type_json())
                    .with_status_code(StatusCode(500));
                let _ = request.respond(resp);
            }
        }

        // Brief access log
        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    method: &Method,
    url: &str,
    body: Option<&str>,
    sim: &mut Simulation,
    profile: &mut Option<Profile>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API — Simulation state
        (&Method::Get, "/api/metrics") => api::get_metrics(sim),
        (&Method::Get, "/api/sensors") => api::get_sensors(sim),
        (&Method::Get, "/api/alerts") => api::get_alerts(sim),

        // API — Assistant chat
        (&Method::Get, "/api/chat") => api::get_chat(sim),
        (&Method::Post, "/api/chat") => {
            let body = body.unwrap_or("{}");
            api::post_chat(body, sim)
        }
        (&Method::Post, "/api/chat/clear") => api::post_chat_clear(sim),
        (&Method::Get, "/api/quick-queries") => api::get_quick_queries(),

        // API — Account mock
        (&Method::Get, "/api/account") => api::get_account(profile),
        (&Method::Post, "/api/account/sign-in") => {
            let body = body.unwrap_or("{}");
            api::post_sign_in(body, profile)
        }
        (&Method::Post, "/api/account/sign-out") => api::post_sign_out(sim, profile),

        // API — Configuration
        (&Method::Get, "/api/config") => api::get_config(),
        (&Method::Put, "/api/config") => {
            let body = body.unwrap_or("{}");
            api::put_config(body)
        }
        (&Method::Post, "/api/config/reset") => api::post_config_reset(),

        // API — Health
        (&Method::Get, "/api/health") => api::get_health(sim),

        // 404
        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    let html = frontend::INDEX_HTML;
    Response::from_data(html.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
