use crate::infrastructure::observability::PredictionMetrics;
use std::time::Instant;

/// RAII guard around one ML service call.
///
/// Counts the attempt when created and records its latency when dropped,
/// whether the call succeeded, failed or was abandoned.
pub struct AttemptGuard<'a> {
    start: Instant,
    metrics: &'a PredictionMetrics,
}

impl<'a> AttemptGuard<'a> {
    pub fn start(metrics: &'a PredictionMetrics) -> Self {
        metrics.predictor_attempts_total.inc();
        Self {
            start: Instant::now(),
            metrics,
        }
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.metrics
            .predictor_latency_seconds
            .observe(self.start.elapsed().as_secs_f64());
    }
}
