//! Simulation root.
//!
//! [`Simulation`] owns the chat session, the metric store, and the sensor
//! board, and advances all of them from a single explicit clock. Nothing in
//! here spawns a timer: callers (the CLI watch loop, the web server) decide
//! when time passes and call [`Simulation::advance`].

use chrono::{DateTime, Duration, Utc};

use crate::assistant::catalog::SelectionPolicy;
use crate::assistant::classifier;
use crate::assistant::session::{ChatMessage, ChatSession, SubmitOutcome};
use crate::config::CityPulseConfig;
use crate::history;
use crate::rng::RandomSource;
use crate::telemetry::sensors::{SEED_ALERTS, SafetyAlert, SensorBoard, SensorReading};
use crate::telemetry::{Metric, MetricStore};

// ---------------------------------------------------------------------------
// Advance report
// ---------------------------------------------------------------------------

/// What happened during one [`Simulation::advance`] call.
#[derive(Debug, Default)]
pub struct AdvanceReport {
    /// Number of metric jitter/redraw ticks applied.
    pub metric_ticks: u32,
    /// Number of sensor random-walk ticks applied.
    pub sensor_ticks: u32,
    /// Assistant replies that became due and were appended.
    pub replies: Vec<ChatMessage>,
}

impl AdvanceReport {
    pub fn is_quiet(&self) -> bool {
        self.metric_ticks == 0 && self.sensor_ticks == 0 && self.replies.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// The whole demo state under one explicit lifecycle.
pub struct Simulation {
    session: ChatSession,
    metrics: MetricStore,
    sensors: SensorBoard,
    rng: Box<dyn RandomSource>,
    selection: SelectionPolicy,
    history_enabled: bool,
    metrics_interval: Duration,
    sensors_interval: Duration,
    next_metrics_at: DateTime<Utc>,
    next_sensors_at: DateTime<Utc>,
    /// Queries whose replies are still in flight, in submit order.
    in_flight: Vec<String>,
}

impl Simulation {
    pub fn new(config: &CityPulseConfig, rng: Box<dyn RandomSource>, now: DateTime<Utc>) -> Self {
        let metrics_interval =
            Duration::milliseconds(config.telemetry.metrics_interval_ms as i64);
        let sensors_interval =
            Duration::milliseconds(config.telemetry.sensors_interval_ms as i64);

        Self {
            session: ChatSession::new(
                config.assistant.response_delay_ms,
                config.assistant.selection,
                config.assistant.overlap,
                now,
            ),
            metrics: MetricStore::new(config.telemetry.metric_thresholds()),
            sensors: SensorBoard::new(
                config.telemetry.sensor_bounds.to_bounds(),
                config.telemetry.sensor_status,
            ),
            rng,
            selection: config.assistant.selection,
            history_enabled: config.history.enabled,
            metrics_interval,
            sensors_interval,
            next_metrics_at: now + metrics_interval,
            next_sensors_at: now + sensors_interval,
            in_flight: Vec::new(),
        }
    }

    // -- views --------------------------------------------------------------

    pub fn messages(&self) -> &[ChatMessage] {
        self.session.messages()
    }

    pub fn metrics(&self) -> &[Metric] {
        self.metrics.metrics()
    }

    pub fn metric(&self, key: &str) -> Option<&Metric> {
        self.metrics.get(key)
    }

    pub fn sensors(&self) -> &[SensorReading] {
        self.sensors.readings()
    }

    /// Static alert feed shown on the safety panel.
    pub fn alerts(&self) -> &'static [SafetyAlert] {
        SEED_ALERTS
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.session.is_awaiting_response()
    }

    // -- chat ---------------------------------------------------------------

    /// Submit a user query against the shared session.
    pub fn submit(&mut self, text: &str, now: DateTime<Utc>) -> SubmitOutcome {
        let outcome = self.session.submit(text, now);
        if matches!(outcome, SubmitOutcome::Accepted | SubmitOutcome::Queued) {
            self.in_flight.push(text.trim().to_string());
        }
        outcome
    }

    /// Drop the chat log back to the seed greeting (sign-out semantics).
    pub fn clear_chat(&mut self, now: DateTime<Utc>) {
        self.session.clear(now);
        self.in_flight.clear();
    }

    // -- clock --------------------------------------------------------------

    /// The next moment anything becomes due, if the simulation has pending
    /// work or periodic ticks at all.
    pub fn next_event_at(&self) -> DateTime<Utc> {
        let mut next = self.next_metrics_at.min(self.next_sensors_at);
        if let Some(due) = self.session.next_due() {
            next = next.min(due);
        }
        next
    }

    /// Advance the clock to `now`: apply every telemetry tick that became
    /// due since the last call and resolve every due assistant reply.
    pub fn advance(&mut self, now: DateTime<Utc>) -> AdvanceReport {
        let mut report = AdvanceReport::default();

        while self.next_metrics_at <= now {
            self.metrics.tick(self.rng.as_mut());
            self.next_metrics_at += self.metrics_interval;
            report.metric_ticks += 1;
        }

        while self.next_sensors_at <= now {
            self.sensors.tick(self.rng.as_mut());
            self.next_sensors_at += self.sensors_interval;
            report.sensor_ticks += 1;
        }

        let replies = self.session.poll(now, self.rng.as_mut());
        for reply in &replies {
            if let Some(query) = self.pop_in_flight() {
                self.record_exchange(&query, reply);
            }
        }
        report.replies = replies;

        report
    }

    fn pop_in_flight(&mut self) -> Option<String> {
        if self.in_flight.is_empty() {
            None
        } else {
            Some(self.in_flight.remove(0))
        }
    }

    fn record_exchange(&self, query: &str, reply: &ChatMessage) {
        if !self.history_enabled {
            return;
        }
        history::log_exchange(
            query,
            classifier::classify(query),
            self.selection,
            reply.text.chars().count(),
            reply.attachment.is_some(),
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn quiet_config() -> CityPulseConfig {
        let mut config = CityPulseConfig::default();
        // History writes to the home directory; keep unit tests hermetic.
        config.history.enabled = false;
        config
    }

    fn sim() -> Simulation {
        Simulation::new(
            &quiet_config(),
            Box::new(SequenceRandom::constant(0.5)),
            t0(),
        )
    }

    #[test]
    fn fresh_simulation_has_seed_state() {
        let sim = sim();
        assert_eq!(sim.messages().len(), 1);
        assert_eq!(sim.metrics().len(), 8);
        assert_eq!(sim.sensors().len(), 4);
        assert_eq!(sim.alerts().len(), 3);
        assert!(!sim.is_awaiting_response());
    }

    #[test]
    fn advance_before_any_interval_is_quiet() {
        let mut sim = sim();
        let report = sim.advance(t0() + Duration::milliseconds(2999));
        assert!(report.is_quiet());
    }

    #[test]
    fn sensors_tick_before_metrics() {
        let mut sim = sim();
        // Sensors fire every 3 s, metrics every 5 s.
        let report = sim.advance(t0() + Duration::seconds(3));
        assert_eq!(report.sensor_ticks, 1);
        assert_eq!(report.metric_ticks, 0);

        let report = sim.advance(t0() + Duration::seconds(5));
        assert_eq!(report.sensor_ticks, 0);
        assert_eq!(report.metric_ticks, 1);
    }

    #[test]
    fn advance_catches_up_on_missed_ticks() {
        let mut sim = sim();
        let report = sim.advance(t0() + Duration::seconds(15));
        assert_eq!(report.sensor_ticks, 5);
        assert_eq!(report.metric_ticks, 3);
    }

    #[test]
    fn submit_and_advance_resolve_a_reply() {
        let mut sim = sim();
        assert_eq!(sim.submit("traffic report", t0()), SubmitOutcome::Accepted);
        assert!(sim.is_awaiting_response());

        let report = sim.advance(t0() + Duration::milliseconds(1500));
        assert_eq!(report.replies.len(), 1);
        assert!(report.replies[0].attachment.is_some());
        assert!(!sim.is_awaiting_response());
    }

    #[test]
    fn next_event_prefers_the_pending_reply() {
        let mut sim = sim();
        sim.submit("traffic report", t0());
        // Reply due at +1.5 s beats the sensor tick at +3 s.
        assert_eq!(sim.next_event_at(), t0() + Duration::milliseconds(1500));
    }

    #[test]
    fn clear_chat_resets_the_log() {
        let mut sim = sim();
        sim.submit("traffic report", t0());
        sim.clear_chat(t0() + Duration::seconds(1));
        assert_eq!(sim.messages().len(), 1);
        assert!(!sim.is_awaiting_response());
    }
}
