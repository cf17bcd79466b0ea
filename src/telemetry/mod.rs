//! Telemetry: synthetic city metrics and the periodic updater.
//!
//! Eight metric cards are seeded once and then mutated in place on every
//! tick. All "live" behavior is bounded pseudo-random jitter drawn through
//! the injected [`RandomSource`]: percent changes drift every tick, and the
//! two volatile metrics (`traffic`, `incidents`) redraw their value within a
//! fixed range and recompute status from fixed thresholds.

pub mod sensors;

use serde::Serialize;

use crate::rng::RandomSource;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Health status of a metric card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Normal,
    Warning,
    Critical,
}

impl std::fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// One tracked city metric. Created once at seed time, mutated on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub key: &'static str,
    pub title: &'static str,
    pub display_value: String,
    pub percent_change: f64,
    pub progress_percent: u8,
    pub status: MetricStatus,
}

/// Derive a status from a progress-style percentage using the shared
/// thresholds (default: >80 critical, >65 warning).
pub fn status_from_progress(progress: u8, warning_above: u8, critical_above: u8) -> MetricStatus {
    if progress > critical_above {
        MetricStatus::Critical
    } else if progress > warning_above {
        MetricStatus::Warning
    } else {
        MetricStatus::Normal
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Tuning knobs for the updater, sourced from `[telemetry]` config.
#[derive(Debug, Clone, Copy)]
pub struct MetricThresholds {
    pub warning_above: u8,
    pub critical_above: u8,
}

impl Default for MetricThresholds {
    fn default() -> Self {
        Self {
            warning_above: 65,
            critical_above: 80,
        }
    }
}

/// Holds the current value of each tracked metric.
#[derive(Debug)]
pub struct MetricStore {
    metrics: Vec<Metric>,
    thresholds: MetricThresholds,
}

impl MetricStore {
    /// Seed the store with the initial dashboard values.
    pub fn new(thresholds: MetricThresholds) -> Self {
        Self {
            metrics: seed_metrics(),
            thresholds,
        }
    }

    /// Current metrics, in card display order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn get(&self, key: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.key == key)
    }

    /// One updater tick: jitter every percent change by `(r - 0.5) * 10`,
    /// then redraw the volatile metrics and recompute their status.
    pub fn tick(&mut self, rng: &mut dyn RandomSource) {
        let thresholds = self.thresholds;
        for metric in &mut self.metrics {
            metric.percent_change = (rng.next_f64() - 0.5) * 10.0;

            match metric.key {
                "traffic" => {
                    // Congestion redraws uniformly in [50, 80).
                    let value = (rng.next_f64() * 30.0 + 50.0).floor() as u8;
                    metric.display_value = format!("{value}%");
                    metric.progress_percent = value;
                    metric.status = status_from_progress(
                        value,
                        thresholds.warning_above,
                        thresholds.critical_above,
                    );
                }
                "incidents" => {
                    // Active incident count redraws uniformly in [15, 35).
                    let value = (rng.next_f64() * 20.0 + 15.0).floor() as u32;
                    metric.display_value = value.to_string();
                    metric.progress_percent = (value * 5).min(100) as u8;
                    metric.status = if value > 30 {
                        MetricStatus::Critical
                    } else if value > 20 {
                        MetricStatus::Warning
                    } else {
                        MetricStatus::Normal
                    };
                }
                _ => {}
            }
        }
    }
}

/// Initial dashboard seed values.
fn seed_metrics() -> Vec<Metric> {
    let seed = |key, title, display_value: &str, percent_change, progress_percent, status| Metric {
        key,
        title,
        display_value: display_value.to_string(),
        percent_change,
        progress_percent,
        status,
    };

    vec![
        seed("population", "Active Population", "2.4M", 2.1, 78, MetricStatus::Normal),
        seed("traffic", "Traffic Congestion", "68%", -5.2, 68, MetricStatus::Warning),
        seed("connectivity", "Network Coverage", "94%", 1.8, 94, MetricStatus::Normal),
        seed("energy", "Energy Consumption", "1.2GW", -3.1, 85, MetricStatus::Normal),
        seed("water", "Water Quality", "98%", 0.5, 98, MetricStatus::Normal),
        seed("air_quality", "Air Quality", "Good", 12.3, 76, MetricStatus::Normal),
        seed("incidents", "Active Incidents", "23", -15.4, 15, MetricStatus::Critical),
        seed("response", "Emergency Response", "4.2 min", -8.5, 88, MetricStatus::Normal),
    ]
}
