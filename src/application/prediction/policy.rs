use reqwest_retry::policies::ExponentialBackoff;
use std::time::Duration;

/// Timeout and retry bounds applied to every prediction.
///
/// Fixed for the lifetime of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionPolicy {
    /// Upper bound of a single call to the ML service
    pub timeout: Duration,
    /// Extra attempts after a transport failure or timeout (0 = no retry)
    pub max_retries: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for PredictionPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(3000),
            max_retries: 2,
            min_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(1000),
        }
    }
}

impl PredictionPolicy {
    pub fn no_retry(timeout: Duration) -> Self {
        Self {
            timeout,
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Exponential backoff between attempts, bounded by `[min_backoff, max_backoff]`
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .retry_bounds(self.min_backoff, self.max_backoff.max(self.min_backoff))
            .build_with_max_retries(self.max_retries)
    }

    /// Longest time a caller can wait for `predict`, persistence excluded
    pub fn worst_case_latency(&self) -> Duration {
        self.timeout
            .saturating_mul(self.max_attempts())
            .saturating_add(self.max_backoff.saturating_mul(self.max_retries))
    }
}
