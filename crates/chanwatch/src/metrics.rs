//! Metric names exported by the watcher.
//!
//! Everything is emitted through the `metrics` facade; install any
//! compatible recorder (e.g. a Prometheus exporter) to collect them. Without
//! a recorder the counters are no-ops.

/// Metric names as constants for consistency.
pub mod names {
    /// Counter: conditional fetches by outcome
    /// (`success`, `not_modified`, `not_found`, `error`).
    pub const FETCHES_TOTAL: &str = "chanwatch_fetches_total";
    /// Counter: poll ticks by outcome (`update`, `not_modified`, `error`).
    pub const TICKS_TOTAL: &str = "chanwatch_ticks_total";
    /// Counter: updates delivered to handlers.
    pub const UPDATES_DELIVERED_TOTAL: &str = "chanwatch_updates_delivered_total";
    /// Counter: errors delivered to handlers.
    pub const ERRORS_DELIVERED_TOTAL: &str = "chanwatch_errors_delivered_total";
}

/// Label keys used across metrics.
pub mod labels {
    /// Fetch or tick outcome.
    pub const OUTCOME: &str = "outcome";
}
