// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order operations by outcome (ok, validation_error, not_found, error)
// - Operation latency
// - Validation rejections
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// on the dedicated metrics listener.
// ============================================================================

/// Central metrics registry for the service
pub struct Metrics {
    registry: Registry,

    pub operations_total: IntCounterVec,
    pub operation_duration: HistogramVec,
    pub validation_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let operations_total = IntCounterVec::new(
            Opts::new("orders_operations_total", "Total order operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "orders_operation_duration_seconds",
                "Order operation duration",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let validation_failures = IntCounter::new(
            "orders_validation_failures_total",
            "Requests rejected by order validation",
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            operation_duration,
            validation_failures,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one order operation
    pub fn record_operation(&self, operation: &str, outcome: &str, duration_secs: f64) {
        self.operations_total
            .with_label_values(&[operation, outcome])
            .inc();
        self.operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);

        if outcome == "validation_error" {
            self.validation_failures.inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_operation("list", "ok", 0.001);
        assert!(!metrics.registry.gather().is_empty());
    }

    #[test]
    fn test_record_operation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_operation("create", "ok", 0.002);
        metrics.record_operation("create", "ok", 0.003);

        let gathered = metrics.registry.gather();
        let ops = gathered
            .iter()
            .find(|m| m.name() == "orders_operations_total")
            .unwrap();
        assert_eq!(ops.metric[0].counter.value, Some(2.0));
    }

    #[test]
    fn test_validation_failures_counted() {
        let metrics = Metrics::new().unwrap();
        metrics.record_operation("create", "validation_error", 0.0);
        metrics.record_operation("update", "validation_error", 0.0);
        metrics.record_operation("update", "not_found", 0.0);

        let gathered = metrics.registry.gather();
        let failures = gathered
            .iter()
            .find(|m| m.name() == "orders_validation_failures_total")
            .unwrap();
        assert_eq!(failures.metric[0].counter.value, Some(2.0));
    }
}
