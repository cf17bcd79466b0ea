//! Safety panel data: static alerts and the jittered sensor board.
//!
//! Sensor readings random-walk within fixed clamps on each tick. Sensor
//! status is, by default, redrawn with fixed probabilities (20% warning,
//! else 5% error, else normal) independently of the walked values — the
//! observed behavior of the source system. The `derived` mode computes
//! status from thresholds on the new values instead.

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// An incident card on the safety panel. Static for the session lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct SafetyAlert {
    pub id: &'static str,
    pub kind: &'static str,
    pub severity: AlertSeverity,
    pub title: &'static str,
    pub location: &'static str,
    pub minutes_ago: u32,
    pub description: &'static str,
    pub state: &'static str,
    pub sources: &'static [&'static str],
}

/// Seed alert list, in display order.
pub const SEED_ALERTS: &[SafetyAlert] = &[
    SafetyAlert {
        id: "1",
        kind: "incident",
        severity: AlertSeverity::High,
        title: "Crowd Gathering Detected",
        location: "Central Park West",
        minutes_ago: 2,
        description: "Unusual crowd density detected via camera network and social media analysis",
        state: "active",
        sources: &["CCTV Network", "Social Media", "Foot Traffic Sensors"],
    },
    SafetyAlert {
        id: "2",
        kind: "emergency",
        severity: AlertSeverity::Critical,
        title: "Traffic Accident Reported",
        location: "5th Avenue & 42nd St",
        minutes_ago: 5,
        description: "Multi-vehicle accident blocking major intersection",
        state: "responding",
        sources: &["911 Dispatch", "Traffic Cameras", "Citizen Reports"],
    },
    SafetyAlert {
        id: "3",
        kind: "anomaly",
        severity: AlertSeverity::Medium,
        title: "Noise Level Spike",
        location: "Times Square",
        minutes_ago: 8,
        description: "Noise levels 40% above normal, possible event or disturbance",
        state: "active",
        sources: &["Noise Sensors", "Audio Analysis"],
    },
];

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Normal,
    Warning,
    Error,
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// How sensor status is assigned after a walk tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatusMode {
    /// Redraw with fixed probabilities, independent of the values
    /// (source-faithful default).
    #[default]
    Random,
    /// Derive from thresholds on the freshly walked values.
    Derived,
}

impl std::fmt::Display for SensorStatusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::Derived => write!(f, "derived"),
        }
    }
}

/// One neighborhood sensor cluster. Mutated in place on each tick.
#[derive(Debug, Clone, Serialize)]
pub struct SensorReading {
    pub location: &'static str,
    pub noise_level: f64,
    pub crowd_density: f64,
    pub traffic_flow: f64,
    pub status: SensorStatus,
}

/// Walk steps and clamp bounds per channel.
#[derive(Debug, Clone, Copy)]
pub struct SensorBounds {
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

impl Default for SensorBounds {
    fn default() -> Self {
        Self {
            noise_min: 40.0,
            noise_max: 100.0,
            noise_step: 10.0,
            crowd_min: 0.0,
            crowd_max: 200.0,
            crowd_step: 20.0,
            flow_min: 0.0,
            flow_max: 100.0,
            flow_step: 15.0,
        }
    }
}

/// Sensor board: seeded readings plus the walk/redraw tick.
#[derive(Debug)]
pub struct SensorBoard {
    readings: Vec<SensorReading>,
    bounds: SensorBounds,
    status_mode: SensorStatusMode,
}

impl SensorBoard {
    pub fn new(bounds: SensorBounds, status_mode: SensorStatusMode) -> Self {
        Self {
            readings: seed_readings(),
            bounds,
            status_mode,
        }
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    /// One sensor tick: random-walk each channel within its clamp, then
    /// assign status per the configured mode.
    pub fn tick(&mut self, rng: &mut dyn RandomSource) {
        let b = self.bounds;
        for reading in &mut self.readings {
            reading.noise_level = walk(reading.noise_level, b.noise_step, b.noise_min, b.noise_max, rng);
            reading.crowd_density =
                walk(reading.crowd_density, b.crowd_step, b.crowd_min, b.crowd_max, rng);
            reading.traffic_flow = walk(reading.traffic_flow, b.flow_step, b.flow_min, b.flow_max, rng);

            reading.status = match self.status_mode {
                SensorStatusMode::Random => redraw_status(rng),
                SensorStatusMode::Derived => derive_status(reading),
            };
        }
    }
}

/// Bounded random-walk step: `clamp(value + (r - 0.5) * step, min, max)`.
fn walk(value: f64, step: f64, min: f64, max: f64, rng: &mut dyn RandomSource) -> f64 {
    (value + (rng.next_f64() - 0.5) * step).clamp(min, max)
}

/// Fixed-probability status redraw: 20% warning, else 5% error, else normal.
fn redraw_status(rng: &mut dyn RandomSource) -> SensorStatus {
    if rng.next_f64() > 0.8 {
        SensorStatus::Warning
    } else if rng.next_f64() > 0.95 {
        SensorStatus::Error
    } else {
        SensorStatus::Normal
    }
}

/// Threshold-derived status for the `derived` mode: error when a channel is
/// saturated, warning when it is elevated or traffic flow has collapsed.
fn derive_status(reading: &SensorReading) -> SensorStatus {
    if reading.noise_level >= 95.0 || reading.crowd_density >= 180.0 {
        SensorStatus::Error
    } else if reading.noise_level >= 80.0
        || reading.crowd_density >= 120.0
        || reading.traffic_flow <= 20.0
    {
        SensorStatus::Warning
    } else {
        SensorStatus::Normal
    }
}

fn seed_readings() -> Vec<SensorReading> {
    let seed = |location, noise_level, crowd_density, traffic_flow, status| SensorReading {
        location,
        noise_level,
        crowd_density,
        traffic_flow,
        status,
    };

    vec![
        seed("Downtown", 65.0, 78.0, 85.0, SensorStatus::Normal),
        seed("Financial District", 72.0, 45.0, 92.0, SensorStatus::Warning),
        seed("Central Park", 55.0, 95.0, 35.0, SensorStatus::Error),
        seed("Times Square", 88.0, 150.0, 75.0, SensorStatus::Error),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;

    fn board(mode: SensorStatusMode) -> SensorBoard {
        SensorBoard::new(SensorBounds::default(), mode)
    }

    #[test]
    fn seeds_four_readings() {
        let b = board(SensorStatusMode::Random);
        assert_eq!(b.readings().len(), 4);
        assert_eq!(b.readings()[0].location, "Downtown");
    }

    #[test]
    fn noise_stays_clamped_across_many_ticks() {
        let mut b = board(SensorStatusMode::Random);
        // Always walk upward as hard as possible.
        let mut rng = SequenceRandom::constant(0.999);
        for _ in 0..200 {
            b.tick(&mut rng);
        }
        for reading in b.readings() {
            assert!(reading.noise_level <= 100.0);
            assert!(reading.crowd_density <= 200.0);
            assert!(reading.traffic_flow <= 100.0);
        }

        // And downward.
        let mut rng = SequenceRandom::constant(0.0);
        for _ in 0..200 {
            b.tick(&mut rng);
        }
        for reading in b.readings() {
            assert!(reading.noise_level >= 40.0);
            assert!(reading.crowd_density >= 0.0);
            assert!(reading.traffic_flow >= 0.0);
        }
    }

    #[test]
    fn random_status_redraw_hits_each_branch() {
        // Draw > 0.8 on the status roll -> warning.
        let mut rng = SequenceRandom::constant(0.9);
        assert_eq!(redraw_status(&mut rng), SensorStatus::Warning);

        // First roll low, second roll > 0.95 -> error.
        let mut rng = SequenceRandom::new(vec![0.1, 0.99]);
        assert_eq!(redraw_status(&mut rng), SensorStatus::Error);

        // Both rolls low -> normal.
        let mut rng = SequenceRandom::constant(0.1);
        assert_eq!(redraw_status(&mut rng), SensorStatus::Normal);
    }

    #[test]
    fn derived_status_follows_thresholds() {
        let reading = |noise, crowd, flow| SensorReading {
            location: "x",
            noise_level: noise,
            crowd_density: crowd,
            traffic_flow: flow,
            status: SensorStatus::Normal,
        };

        assert_eq!(derive_status(&reading(96.0, 50.0, 60.0)), SensorStatus::Error);
        assert_eq!(derive_status(&reading(60.0, 185.0, 60.0)), SensorStatus::Error);
        assert_eq!(derive_status(&reading(85.0, 50.0, 60.0)), SensorStatus::Warning);
        assert_eq!(derive_status(&reading(60.0, 130.0, 60.0)), SensorStatus::Warning);
        assert_eq!(derive_status(&reading(60.0, 50.0, 10.0)), SensorStatus::Warning);
        assert_eq!(derive_status(&reading(60.0, 50.0, 60.0)), SensorStatus::Normal);
    }

    #[test]
    fn derived_mode_consumes_no_status_draws() {
        let mut b = board(SensorStatusMode::Derived);
        // Exactly 3 draws per reading per tick (one per channel).
        let mut rng = SequenceRandom::new(vec![0.5]);
        b.tick(&mut rng);
        // A mid-point draw leaves values unchanged; Central Park's channels
        // are all inside the normal bands, clearing its seeded error status.
        let central_park = &b.readings()[2];
        assert_eq!(central_park.traffic_flow, 35.0);
        assert_eq!(central_park.status, SensorStatus::Normal);
        // Times Square's crowd density stays elevated.
        assert_eq!(b.readings()[3].status, SensorStatus::Warning);
    }
}
