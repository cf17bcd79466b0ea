use std::collections::BTreeMap;
use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::assistant::catalog::SelectionPolicy;
use crate::assistant::classifier::Category;

// ---------------------------------------------------------------------------
// Exchange log entry (JSONL history)
// ---------------------------------------------------------------------------

/// A single entry in the structured exchange log (`~/.citypulse/chat-log.jsonl`).
///
/// Each entry records one resolved question/answer exchange: the query text,
/// the category it routed to, the selection policy in effect, and the size of
/// the answer. Used by `citypulse history` for aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeLogEntry {
    pub timestamp: String,
    pub query: String,
    pub category: String,
    #[serde(default)]
    pub selection: String,
    pub response_chars: usize,
    /// Whether the answer carried a structured attachment.
    #[serde(default)]
    pub enriched: bool,
}

// ---------------------------------------------------------------------------
// Logging functions
// ---------------------------------------------------------------------------

/// Log a resolved exchange. Failures are swallowed: history is best-effort
/// and must never break a chat.
pub fn log_exchange(
    query: &str,
    category: Category,
    selection: SelectionPolicy,
    response_chars: usize,
    enriched: bool,
) {
    let entry = ExchangeLogEntry {
        timestamp: Utc::now().to_rfc3339(),
        query: query.to_string(),
        category: category.to_string(),
        selection: selection.to_string(),
        response_chars,
        enriched,
    };

    let _ = append_log_entry(&entry);
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read all exchange log entries from `~/.citypulse/chat-log.jsonl`.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_all_entries() -> Vec<ExchangeLogEntry> {
    let Some(path) = exchange_log_path() else {
        return Vec::new();
    };

    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let reader = BufReader::new(file);
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<ExchangeLogEntry>(&line).ok())
        .collect()
}

/// Read log entries filtered to a time window (last N days).
///
/// If `days` is `None`, returns all entries.
pub fn read_entries_since_days(days: Option<u32>) -> Vec<ExchangeLogEntry> {
    let entries = read_all_entries();

    let Some(days) = days else {
        return entries;
    };

    let cutoff = Utc::now() - chrono::Duration::days(i64::from(days));
    let cutoff_str = cutoff.to_rfc3339();

    entries
        .into_iter()
        .filter(|e| e.timestamp >= cutoff_str)
        .collect()
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Per-category aggregate of logged exchanges.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub exchanges: usize,
    pub enriched: usize,
    pub avg_response_chars: usize,
}

/// Aggregate exchanges by category, sorted by exchange count descending.
pub fn aggregate_by_category(entries: &[ExchangeLogEntry]) -> Vec<CategoryStats> {
    let mut buckets: BTreeMap<&str, (usize, usize, usize)> = BTreeMap::new();

    for entry in entries {
        let bucket = buckets.entry(entry.category.as_str()).or_default();
        bucket.0 += 1;
        if entry.enriched {
            bucket.1 += 1;
        }
        bucket.2 += entry.response_chars;
    }

    let mut stats: Vec<CategoryStats> = buckets
        .into_iter()
        .map(|(category, (exchanges, enriched, total_chars))| CategoryStats {
            category: category.to_string(),
            exchanges,
            enriched,
            avg_response_chars: total_chars / exchanges.max(1),
        })
        .collect();

    stats.sort_by(|a, b| b.exchanges.cmp(&a.exchanges));
    stats
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_log_entry(entry: &ExchangeLogEntry) -> Result<()> {
    let Some(path) = exchange_log_path() else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Return the path to the exchange log file.
pub fn exchange_log_path() -> Option<PathBuf> {
    let config = crate::config::load();
    if !config.history.enabled {
        return None;
    }
    Some(crate::config::expand_home(&config.history.path))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
