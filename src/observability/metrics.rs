use prometheus::{
    Counter, Histogram, Registry, register_counter_with_registry,
    register_histogram_with_registry,
};

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    pub runs_completed: Counter,
    pub runs_failed: Counter,
    pub candidates_scored: Counter,
    pub signal_rows_discarded: Counter,
    pub run_duration: Histogram,
    pub collect_duration: Histogram,
    pub persist_duration: Histogram,
}

impl Metrics {
    /// Registers the worker's metric families.
    ///
    /// # Errors
    /// Returns an error when a metric name collides inside the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            runs_completed: register_counter_with_registry!(
                "trending_runs_completed_total",
                "Total number of trending score runs completed",
                registry
            )?,
            runs_failed: register_counter_with_registry!(
                "trending_runs_failed_total",
                "Total number of trending score runs that aborted",
                registry
            )?,
            candidates_scored: register_counter_with_registry!(
                "trending_candidates_scored_total",
                "Total number of candidate scores upserted",
                registry
            )?,
            signal_rows_discarded: register_counter_with_registry!(
                "trending_signal_rows_discarded_total",
                "Signal rows dropped because their kind is outside the trending pool",
                registry
            )?,
            run_duration: register_histogram_with_registry!(
                "trending_run_duration_seconds",
                "Duration of one full trending recomputation",
                registry
            )?,
            collect_duration: register_histogram_with_registry!(
                "trending_collect_duration_seconds",
                "Duration of signal and candidate collection",
                registry
            )?,
            persist_duration: register_histogram_with_registry!(
                "trending_persist_duration_seconds",
                "Duration of the trending score upsert transaction",
                registry
            )?,
        })
    }
}
