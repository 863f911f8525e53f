//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wavefleet_registry_operations_total` (counter): store calls by op, outcome
//! - `wavefleet_registry_devices` (gauge): records held by the store
//! - `wavefleet_lifecycle_transitions_total` (counter): state changes by target state
//! - `wavefleet_heartbeats_total` (counter): device heartbeats by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade, a no-op until an exporter is installed
//! - The Prometheus listener only starts when an address is configured

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn install_exporter(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| e.to_string())?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_store_op(op: &'static str, outcome: &'static str) {
    counter!("wavefleet_registry_operations_total", "op" => op, "outcome" => outcome).increment(1);
}

pub fn record_device_count(count: usize) {
    gauge!("wavefleet_registry_devices").set(count as f64);
}

pub fn record_transition(state: &'static str) {
    counter!("wavefleet_lifecycle_transitions_total", "state" => state).increment(1);
}

pub fn record_heartbeat(outcome: &'static str) {
    counter!("wavefleet_heartbeats_total", "outcome" => outcome).increment(1);
}
