//! Metric descriptions for the catalog engine.
//!
//! The library only records through the `metrics` facade; installing an
//! exporter is up to the application.
//!
//! ## Counters
//! - `store.commands.total` - Actions sent to the store
//! - `store.effects.executed{type}` - Effects executed by kind
//! - `store.shutdown.rejected_actions` - Actions refused while shutting down
//! - `catalog.requests.total{operation}` - Requests issued to the catalog service
//! - `catalog.requests.failed{operation}` - Requests that ended rejected
//!
//! ## Histograms
//! - `catalog.request.duration_seconds{operation}` - Request latency
//! - `store.reducer.duration_seconds` - Time spent in the reducer

use metrics::{describe_counter, describe_histogram};

/// Register descriptions for every metric the engine records.
///
/// Call once at startup, after installing a recorder (the demo binary installs
/// the Prometheus exporter first).
pub fn register_metrics() {
    describe_counter!("store.commands.total", "Number of actions sent to the store");
    describe_counter!("store.effects.executed", "Number of effects executed, by effect type");
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions refused because the store was shutting down"
    );
    describe_histogram!("store.reducer.duration_seconds", "Time spent running the reducer");

    describe_counter!("catalog.requests.total", "Requests issued to the catalog service, by operation");
    describe_counter!(
        "catalog.requests.failed",
        "Requests that ended in the rejected state, by operation"
    );
    describe_histogram!(
        "catalog.request.duration_seconds",
        "Catalog service request latency, by operation"
    );

    tracing::debug!("Catalog metrics registered");
}
