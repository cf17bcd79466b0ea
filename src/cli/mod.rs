//! CLI command implementations for the citypulse console.
//!
//! Provides subcommand handlers for:
//! - `citypulse ask "question"` — one-shot assistant query
//! - `citypulse chat` — interactive assistant REPL
//! - `citypulse overview` — city metric cards
//! - `citypulse safety` — recent alert feed
//! - `citypulse watch --duration-secs N` — live telemetry loop
//! - `citypulse health` — check config, history log, seed data
//! - `citypulse history --days N` — logged exchange summary
//! - `citypulse config show|init|set|reset` — configuration management

use std::io::{self, BufRead, Write as _};

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;

use crate::assistant::catalog::{Attachment, QUICK_QUERIES, Trend};
use crate::assistant::classifier::{self, Category};
use crate::assistant::session::SubmitOutcome;
use crate::config;
use crate::history;
use crate::rng::ThreadRandom;
use crate::runtime::Simulation;
use crate::telemetry::MetricStatus;
use crate::telemetry::sensors::AlertSeverity;

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

fn new_simulation() -> Simulation {
    let cfg = config::load();
    Simulation::new(&cfg, Box::new(ThreadRandom), Utc::now())
}

/// Fast-forward `ticks` updater rounds without waiting on the wall clock.
/// One round covers the longer of the two cadences so both updaters fire.
fn advance_ticks(sim: &mut Simulation, ticks: u32) {
    let cfg = config::load();
    let step = cfg
        .telemetry
        .metrics_interval_ms
        .max(cfg.telemetry.sensors_interval_ms) as i64;
    let mut now = Utc::now();
    for _ in 0..ticks {
        now += chrono::Duration::milliseconds(step);
        sim.advance(now);
    }
}

// ---------------------------------------------------------------------------
// citypulse ask
// ---------------------------------------------------------------------------

/// Ask the assistant one question and print the answer.
pub fn run_ask(query: &str, format: OutputFormat) -> Result<()> {
    let cfg = config::load();
    let mut sim = new_simulation();

    if sim.submit(query, Utc::now()) == SubmitOutcome::IgnoredEmpty {
        println!("{}", "Nothing to ask: the query is empty.".yellow());
        return Ok(());
    }

    if format == OutputFormat::Table {
        let category = classifier::classify(query);
        println!(
            "  {} {}",
            "Thinking…".dimmed(),
            format!("[{}]", colorize_category(category)).dimmed()
        );
    }
    std::thread::sleep(std::time::Duration::from_millis(
        cfg.assistant.response_delay_ms,
    ));

    let report = sim.advance(Utc::now());
    let Some(reply) = report.replies.first() else {
        anyhow::bail!("assistant reply did not resolve");
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reply)?);
        }
        OutputFormat::Csv | OutputFormat::Table => {
            println!();
            println!("{}", reply.text);
            if let Some(attachment) = &reply.attachment {
                print_attachment(attachment);
            }
        }
    }

    Ok(())
}

fn print_attachment(attachment: &Attachment) {
    if !attachment.locations.is_empty() {
        println!();
        println!("  {}", "Affected locations".bold());
        for location in &attachment.locations {
            println!("    {} {}", "·".dimmed(), location);
        }
    }
    if !attachment.metrics.is_empty() {
        println!();
        println!("  {}", "Key metrics".bold());
        for metric in &attachment.metrics {
            let arrow = match metric.trend {
                Trend::Up => "↑".red(),
                Trend::Down => "↓".green(),
            };
            println!("    {:<28} {:>8} {}", metric.label, metric.value, arrow);
        }
    }
    if !attachment.recommendations.is_empty() {
        println!();
        println!("  {}", "Recommendations".bold());
        for rec in &attachment.recommendations {
            println!("    {} {}", "→".cyan(), rec);
        }
    }
}

// ---------------------------------------------------------------------------
// citypulse chat
// ---------------------------------------------------------------------------

/// Interactive assistant REPL.
///
/// `clear` resets the session, `quit`/`exit` (or EOF) leaves. Numbers 1-6
/// expand to the corresponding quick query.
pub fn run_chat() -> Result<()> {
    let cfg = config::load();
    let mut sim = new_simulation();

    println!("{}", "CityPulse Assistant".bold().cyan());
    println!("{}", "=".repeat(50));
    println!("{}", sim.messages()[0].text);
    println!();
    println!("{}", "Quick queries:".dimmed());
    for quick in QUICK_QUERIES {
        println!(
            "  {} {} {}",
            format!("{}.", quick.id).dimmed(),
            quick.title,
            format!("[{}]", quick.category).dimmed()
        );
    }
    println!();

    let stdin = io::stdin();
    loop {
        print!("{} ", ">".bold().cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "/quit" | "quit" | "exit" => break,
            "/clear" | "clear" => {
                sim.clear_chat(Utc::now());
                println!("{}", "Session cleared.".dimmed());
                continue;
            }
            _ => {}
        }

        // Expand a bare quick-query number into its full question.
        let query = QUICK_QUERIES
            .iter()
            .find(|q| q.id == input)
            .map(|q| q.query)
            .unwrap_or(input);

        match sim.submit(query, Utc::now()) {
            SubmitOutcome::IgnoredEmpty => continue,
            SubmitOutcome::RejectedBusy => {
                println!("{}", "Still thinking — wait for the reply.".yellow());
                continue;
            }
            SubmitOutcome::Accepted | SubmitOutcome::Queued => {}
        }

        std::thread::sleep(std::time::Duration::from_millis(
            cfg.assistant.response_delay_ms,
        ));

        for reply in sim.advance(Utc::now()).replies {
            println!();
            println!("{}", reply.text);
            if let Some(attachment) = &reply.attachment {
                print_attachment(attachment);
            }
            println!();
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// citypulse overview
// ---------------------------------------------------------------------------

/// Show the city metric cards, after applying `ticks` updater rounds.
pub fn run_overview(format: OutputFormat, ticks: u32) -> Result<()> {
    let mut sim = new_simulation();
    advance_ticks(&mut sim, ticks);
    let metrics = sim.metrics();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
        OutputFormat::Csv => {
            println!("key,title,value,change_pct,progress_pct,status");
            for m in metrics {
                println!(
                    "{},{},{},{:.1},{},{}",
                    m.key, m.title, m.display_value, m.percent_change, m.progress_percent, m.status,
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", "CityPulse Overview".bold().cyan());
            println!("{}", "=".repeat(60));
            println!(
                "  {:<22} {:>10} {:>8} {:>6} Status",
                "Metric", "Value", "Change", "Load"
            );
            println!("  {}", "-".repeat(58));

            for (i, m) in metrics.iter().enumerate() {
                let change = format!("{:+.1}%", m.percent_change);
                let line = format!(
                    "  {:<22} {:>10} {:>8} {:>5}% {}",
                    truncate(m.title, 22),
                    m.display_value,
                    change,
                    m.progress_percent,
                    colorize_metric_status(m.status),
                );
                if i % 2 == 0 {
                    println!("{}", line);
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// citypulse safety
// ---------------------------------------------------------------------------

/// Show the recent alert feed and sensor board, after `ticks` updater rounds.
pub fn run_safety(format: OutputFormat, ticks: u32) -> Result<()> {
    let mut sim = new_simulation();
    advance_ticks(&mut sim, ticks);

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "alerts": sim.alerts(),
                "sensors": sim.sensors(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => {
            println!("id,kind,severity,title,location,minutes_ago,state");
            for alert in sim.alerts() {
                println!(
                    "{},{},{},{},{},{},{}",
                    alert.id,
                    alert.kind,
                    alert.severity,
                    alert.title,
                    alert.location,
                    alert.minutes_ago,
                    alert.state,
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", "Public Safety Alerts".bold().cyan());
            println!("{}", "=".repeat(60));
            for alert in sim.alerts() {
                println!(
                    "  {} {} {}",
                    colorize_severity(alert.severity),
                    alert.title.bold(),
                    format!("({} min ago)", alert.minutes_ago).dimmed(),
                );
                println!("    {} — {}", alert.location, alert.description);
                println!(
                    "    {} {}",
                    format!("[{}]", alert.state).dimmed(),
                    alert.sources.join(", ").dimmed()
                );
                println!();
            }

            println!("{}", "Sensor Board".bold().cyan());
            println!(
                "  {:<20} {:>6} {:>7} {:>6} Status",
                "Location", "Noise", "Crowd", "Flow"
            );
            println!("  {}", "-".repeat(52));
            for sensor in sim.sensors() {
                println!(
                    "  {:<20} {:>4}dB {:>7} {:>5}% {}",
                    sensor.location,
                    sensor.noise_level.round() as i64,
                    sensor.crowd_density.round() as i64,
                    sensor.traffic_flow.round() as i64,
                    sensor.status,
                );
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// citypulse watch
// ---------------------------------------------------------------------------

/// Run the live telemetry loop against the real clock for a bounded time.
pub fn run_watch(duration_secs: u64) -> Result<()> {
    let mut sim = new_simulation();

    println!("{}", "CityPulse Live Telemetry".bold().cyan());
    println!(
        "{}",
        format!("Watching for {}s (Ctrl-C to stop early)…", duration_secs).dimmed()
    );
    println!();

    let deadline = Utc::now() + chrono::Duration::seconds(duration_secs as i64);
    loop {
        let next = sim.next_event_at();
        if next > deadline {
            break;
        }
        let wait = (next - Utc::now()).to_std().unwrap_or_default();
        std::thread::sleep(wait);

        let report = sim.advance(Utc::now());
        if report.is_quiet() {
            continue;
        }

        let stamp = Utc::now().format("%H:%M:%S");
        if report.metric_ticks > 0 {
            let traffic = sim.metric("traffic").map(|m| m.progress_percent).unwrap_or(0);
            let incidents = sim
                .metric("incidents")
                .map(|m| m.display_value.clone())
                .unwrap_or_default();
            println!(
                "  {} {} traffic {}%  incidents {}",
                stamp.to_string().dimmed(),
                "metrics".cyan(),
                traffic,
                incidents,
            );
        }
        if report.sensor_ticks > 0 {
            for sensor in sim.sensors() {
                println!(
                    "  {} {} {:<20} noise {:>3.0}dB  crowd {:>3.0}  flow {:>3.0}%  {}",
                    stamp.to_string().dimmed(),
                    "sensors".blue(),
                    sensor.location,
                    sensor.noise_level,
                    sensor.crowd_density,
                    sensor.traffic_flow,
                    sensor.status,
                );
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// citypulse health
// ---------------------------------------------------------------------------

/// Check system health: config files, history log, web address, seed data.
pub fn run_health() -> Result<()> {
    println!("{}", "CityPulse Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.citypulse/config.toml found"
        } else {
            "not found (run `citypulse config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".citypulse.toml found"
        } else {
            "none (optional)"
        },
    );
    print_health_item(
        "Assistant",
        true,
        &format!(
            "delay {}ms, selection {}, overlap {}",
            cfg.assistant.response_delay_ms, cfg.assistant.selection, cfg.assistant.overlap,
        ),
    );
    print_health_item(
        "Telemetry",
        true,
        &format!(
            "metrics every {}ms, sensors every {}ms, status {}",
            cfg.telemetry.metrics_interval_ms,
            cfg.telemetry.sensors_interval_ms,
            cfg.telemetry.sensor_status,
        ),
    );

    let addr_ok = cfg.web.addr.parse::<std::net::SocketAddr>().is_ok();
    print_health_item(
        "Web address",
        addr_ok,
        &if addr_ok {
            cfg.web.addr.clone()
        } else {
            format!("invalid: {}", cfg.web.addr)
        },
    );

    let log_exists = history::exchange_log_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    let log_entries = if log_exists {
        history::read_all_entries().len()
    } else {
        0
    };
    print_health_item(
        "Exchange log",
        cfg.history.enabled,
        &if !cfg.history.enabled {
            "disabled".to_string()
        } else if log_exists {
            format!("{} entries", log_entries)
        } else {
            "no log file yet".to_string()
        },
    );

    let sim = new_simulation();
    print_health_item(
        "Seed data",
        sim.metrics().len() == 8 && sim.sensors().len() == 4 && sim.alerts().len() == 3,
        &format!(
            "{} metrics, {} sensors, {} alerts",
            sim.metrics().len(),
            sim.sensors().len(),
            sim.alerts().len(),
        ),
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// citypulse history
// ---------------------------------------------------------------------------

/// Show logged exchange statistics grouped by category.
pub fn run_history(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let entries = history::read_entries_since_days(days);

    if entries.is_empty() {
        println!(
            "{}",
            "No exchanges logged yet. Ask the assistant something first.".yellow()
        );
        return Ok(());
    }

    let stats = history::aggregate_by_category(&entries);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Csv => {
            println!("category,exchanges,enriched,avg_response_chars");
            for s in &stats {
                println!(
                    "{},{},{},{}",
                    s.category, s.exchanges, s.enriched, s.avg_response_chars,
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", "CityPulse Exchange History".bold().cyan());
            println!("{}", "=".repeat(54));
            println!("  {} {}", "Total exchanges:".bold(), entries.len());
            println!();
            println!(
                "  {:<12} {:>10} {:>10} {:>12}",
                "Category", "Exchanges", "Enriched", "Avg chars"
            );
            println!("  {}", "-".repeat(50));
            for s in &stats {
                println!(
                    "  {:<12} {:>10} {:>10} {:>12}",
                    s.category, s.exchanges, s.enriched, s.avg_response_chars,
                );
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// citypulse config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective CityPulse Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.citypulse/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.citypulse/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".citypulse.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            ".citypulse.toml (not found)".dimmed()
        );
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "CITYPULSE_* environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.citypulse/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to customize CityPulse behavior.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}…", &s[..max_len.saturating_sub(1)])
    }
}

fn colorize_category(category: Category) -> colored::ColoredString {
    let name = category.to_string();
    match category {
        Category::Traffic => name.yellow(),
        Category::Safety => name.red(),
        Category::Planning => name.green(),
        Category::Transit => name.blue(),
        Category::General => name.normal(),
    }
}

fn colorize_metric_status(status: MetricStatus) -> colored::ColoredString {
    let name = status.to_string();
    match status {
        MetricStatus::Normal => name.green(),
        MetricStatus::Warning => name.yellow(),
        MetricStatus::Critical => name.red().bold(),
    }
}

fn colorize_severity(severity: AlertSeverity) -> colored::ColoredString {
    let name = format!("[{severity}]");
    match severity {
        AlertSeverity::Critical => name.red().bold(),
        AlertSeverity::High => name.red(),
        AlertSeverity::Medium => name.yellow(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("ab", 2), "ab");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }
}
