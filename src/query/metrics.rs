//! Prometheus metrics for query evaluation.

use crate::error::{Error, Result};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::info;

lazy_static::lazy_static! {
    /// Metrics registry for the query layer
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    pub static ref QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("photondb_reql_queries_total", "Total number of queries"),
        &["response"]
    ).unwrap();

    pub static ref QUERY_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "photondb_reql_query_duration_seconds",
            "Query compile and evaluation time in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["response"]
    ).unwrap();

    pub static ref TERMS_EVALUATED: IntCounterVec = IntCounterVec::new(
        Opts::new("photondb_reql_terms_evaluated_total", "Total term evaluations"),
        &["term"]
    ).unwrap();
}

/// Register the query metrics. Safe to call more than once.
pub fn init_metrics() {
    info!("Initializing query metrics");

    METRICS_REGISTRY.register(Box::new(QUERIES_TOTAL.clone())).ok();
    METRICS_REGISTRY.register(Box::new(QUERY_DURATION.clone())).ok();
    METRICS_REGISTRY.register(Box::new(TERMS_EVALUATED.clone())).ok();
}

/// Record one finished query.
pub fn record_query(response: &str, duration_secs: f64) {
    QUERIES_TOTAL.with_label_values(&[response]).inc();
    QUERY_DURATION
        .with_label_values(&[response])
        .observe(duration_secs);
}

/// Prometheus text exposition of the registered metrics.
pub fn export_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&METRICS_REGISTRY.gather(), &mut buffer)
        .map_err(|e| Error::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| Error::Internal(format!("Invalid metrics output: {}", e)))
}
