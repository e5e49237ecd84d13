//! Prometheus metrics definitions for churninsight
//!
//! All metrics use the `churninsight_` prefix and are read-only.

use prometheus::{
    CounterVec, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Prometheus metrics for the prediction path
#[derive(Clone)]
pub struct PredictionMetrics {
    registry: Arc<Registry>,
    /// Predictions by final outcome (`success` or an error kind)
    pub predictions_total: CounterVec,
    /// Individual calls made to the ML service, retries included
    pub predictor_attempts_total: IntCounter,
    /// Latency of a single ML service call in seconds
    pub predictor_latency_seconds: Histogram,
}

impl PredictionMetrics {
    /// Create a new metrics set with all counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let predictions_total = CounterVec::new(
            Opts::new(
                "churninsight_predictions_total",
                "Predictions by final outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let predictor_attempts_total = IntCounter::with_opts(Opts::new(
            "churninsight_predictor_attempts_total",
            "Calls made to the ML service, retries included",
        ))?;
        registry.register(Box::new(predictor_attempts_total.clone()))?;

        let predictor_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "churninsight_predictor_latency_seconds",
                "Latency of a single ML service call",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        registry.register(Box::new(predictor_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            predictions_total,
            predictor_attempts_total,
            predictor_latency_seconds,
        })
    }

    pub fn record_outcome(&self, outcome: &str) {
        self.predictions_total.with_label_values(&[outcome]).inc();
    }

    pub fn outcome_count(&self, outcome: &str) -> f64 {
        self.predictions_total.with_label_values(&[outcome]).get()
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        Ok(encoder.encode_to_string(&families)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration_and_encoding() {
        let metrics = PredictionMetrics::new().unwrap();
        metrics.record_outcome("success");
        metrics.record_outcome("success");
        metrics.record_outcome("timeout");
        metrics.predictor_attempts_total.inc();

        assert_eq!(metrics.outcome_count("success"), 2.0);
        assert_eq!(metrics.outcome_count("timeout"), 1.0);

        let text = metrics.encode().unwrap();
        assert!(text.contains("churninsight_predictions_total"));
        assert!(text.contains("churninsight_predictor_attempts_total 1"));
    }
}
