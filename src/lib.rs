//! CityPulse — a simulated smart-city operations console.
//!
//! The crate is a deterministic demo engine: a keyword-routed assistant with
//! canned enriched answers, a synthetic metric board that jitters on a fixed
//! cadence, and a sensor random walk, all driven by an explicit clock and an
//! injectable randomness source so every behavior is testable without timers.

pub mod account;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod history;
pub mod rng;
pub mod runtime;
pub mod telemetry;
pub mod web;
