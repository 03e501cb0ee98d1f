//! Controller metrics.
//!
//! # Metrics
//! - `sidecar_reconcile_ticks_total` (counter): reconciliation passes
//! - `sidecar_config_changes_total` (counter): documents persisted
//! - `sidecar_process_starts_total` (counter): proxy launches
//! - `sidecar_process_stops_total` (counter): owner-initiated stops
//! - `sidecar_endpoints` (gauge): size of the last resolved pool

pub fn record_tick() {
    ::metrics::counter!("sidecar_reconcile_ticks_total").increment(1);
}

pub fn record_config_change() {
    ::metrics::counter!("sidecar_config_changes_total").increment(1);
}

pub fn record_process_start() {
    ::metrics::counter!("sidecar_process_starts_total").increment(1);
}

pub fn record_process_stop() {
    ::metrics::counter!("sidecar_process_stops_total").increment(1);
}

pub fn record_endpoints(pool: &str, count: usize) {
    ::metrics::gauge!("sidecar_endpoints", "pool" => pool.to_string()).set(count as f64);
}
