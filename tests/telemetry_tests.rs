/// Telemetry and simulation-lifecycle tests.
///
/// Exercises the metric updater and sensor board through the `Simulation`
/// root against a scripted clock, so cadence (5 s metrics, 3 s sensors) and
/// catch-up behavior are covered end to end. Pure tick math is covered by
/// the unit tests inside `telemetry`.
use chrono::{DateTime, Duration, TimeZone, Utc};

use citypulse::config::CityPulseConfig;
use citypulse::rng::SequenceRandom;
use citypulse::runtime::Simulation;
use citypulse::telemetry::MetricStatus;
use citypulse::telemetry::sensors::{SensorStatus, SensorStatusMode};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

fn config() -> CityPulseConfig {
    let mut cfg = CityPulseConfig::default();
    cfg.history.enabled = false;
    cfg
}

fn sim_with(r: f64) -> Simulation {
    Simulation::new(&config(), Box::new(SequenceRandom::constant(r)), t0())
}

// ---------------------------------------------------------------------------
// Seed state
// ---------------------------------------------------------------------------

#[test]
fn seed_dashboard_matches_the_initial_cards() {
    let sim = sim_with(0.5);

    let traffic = sim.metric("traffic").unwrap();
    assert_eq!(traffic.display_value, "68%");
    assert_eq!(traffic.status, MetricStatus::Warning);

    let incidents = sim.metric("incidents").unwrap();
    assert_eq!(incidents.display_value, "23");
    assert_eq!(incidents.status, MetricStatus::Critical);

    assert_eq!(sim.sensors()[0].location, "Downtown");
    assert_eq!(sim.alerts()[1].title, "Traffic Accident Reported");
}

// ---------------------------------------------------------------------------
// Cadence
// ---------------------------------------------------------------------------

#[test]
fn metrics_only_change_on_their_five_second_cadence() {
    let mut sim = sim_with(0.999);
    let seed_value = sim.metric("traffic").unwrap().display_value.clone();

    sim.advance(t0() + Duration::seconds(4));
    assert_eq!(sim.metric("traffic").unwrap().display_value, seed_value);

    sim.advance(t0() + Duration::seconds(5));
    assert_eq!(sim.metric("traffic").unwrap().display_value, "79%");
}

#[test]
fn sensors_only_change_on_their_three_second_cadence() {
    let mut sim = sim_with(0.0);
    let seed_noise = sim.sensors()[0].noise_level;

    sim.advance(t0() + Duration::seconds(2));
    assert_eq!(sim.sensors()[0].noise_level, seed_noise);

    // Constant low draw walks each channel down by half a step.
    sim.advance(t0() + Duration::seconds(3));
    assert_eq!(sim.sensors()[0].noise_level, seed_noise - 5.0);
}

#[test]
fn a_long_gap_applies_every_missed_tick() {
    let mut sim = sim_with(0.0);
    // 30 s gap: 6 metric ticks, 10 sensor ticks.
    let report = sim.advance(t0() + Duration::seconds(30));
    assert_eq!(report.metric_ticks, 6);
    assert_eq!(report.sensor_ticks, 10);

    // Downtown noise walked down 5 per tick from 65, clamped at 40.
    assert_eq!(sim.sensors()[0].noise_level, 40.0);
}

// ---------------------------------------------------------------------------
// Tick semantics through the simulation
// ---------------------------------------------------------------------------

#[test]
fn volatile_metrics_redraw_but_stable_ones_keep_their_value() {
    let mut sim = sim_with(0.999);
    sim.advance(t0() + Duration::seconds(5));

    assert_eq!(sim.metric("traffic").unwrap().display_value, "79%");
    assert_eq!(sim.metric("incidents").unwrap().display_value, "34");
    assert_eq!(sim.metric("incidents").unwrap().progress_percent, 100);

    // Non-volatile cards only jitter their percent change.
    assert_eq!(sim.metric("population").unwrap().display_value, "2.4M");
    assert_eq!(sim.metric("energy").unwrap().display_value, "1.2GW");
}

#[test]
fn random_status_mode_ignores_walked_values() {
    // Aggressive upward walk, but status draws stay low -> normal everywhere.
    let mut cfg = config();
    cfg.telemetry.sensor_status = SensorStatusMode::Random;
    let mut sim = Simulation::new(&cfg, Box::new(SequenceRandom::constant(0.7)), t0());

    sim.advance(t0() + Duration::seconds(3));
    for sensor in sim.sensors() {
        assert_eq!(sensor.status, SensorStatus::Normal);
    }
}

#[test]
fn derived_status_mode_reflects_walked_values() {
    let mut cfg = config();
    cfg.telemetry.sensor_status = SensorStatusMode::Derived;
    // Constant high draws push every channel to its max over many ticks.
    let mut sim = Simulation::new(&cfg, Box::new(SequenceRandom::constant(0.999)), t0());

    sim.advance(t0() + Duration::seconds(60));
    // Noise saturates at 100 dB -> error on every sensor.
    for sensor in sim.sensors() {
        assert_eq!(sensor.status, SensorStatus::Error);
    }
}

#[test]
fn custom_thresholds_change_metric_status_bands() {
    let mut cfg = config();
    cfg.telemetry.warning_above = 40;
    cfg.telemetry.critical_above = 60;
    let mut sim = Simulation::new(&cfg, Box::new(SequenceRandom::constant(0.999)), t0());

    sim.advance(t0() + Duration::seconds(5));
    // 79% congestion is critical under the tightened bands.
    assert_eq!(sim.metric("traffic").unwrap().status, MetricStatus::Critical);
}
