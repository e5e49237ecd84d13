use crate::application::prediction::PredictionPolicy;
use crate::domain::customer::PredictionRequest;
use crate::domain::errors::{PredictionError, PredictorError};
use crate::domain::history::HistoryRecord;
use crate::domain::ports::ChurnPredictor;
use crate::domain::prediction::PredictionResult;
use crate::domain::repositories::HistoryRepository;
use crate::infrastructure::observability::{AttemptGuard, PredictionMetrics};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{RetryDecision, RetryPolicy};
use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Calls the ML service under the configured timeout/retry policy and
/// records every successful prediction in the history.
///
/// # Guarantees
/// - Only transport failures and timeouts are retried, sequentially.
/// - Exactly one history record is written per successful prediction and
///   none on any failure path.
/// - The result is returned only once it has been persisted.
pub struct PredictionOrchestrator {
    predictor: Arc<dyn ChurnPredictor>,
    history: Arc<dyn HistoryRepository>,
    policy: PredictionPolicy,
    backoff: ExponentialBackoff,
    metrics: Option<PredictionMetrics>,
}

impl PredictionOrchestrator {
    pub fn new(
        predictor: Arc<dyn ChurnPredictor>,
        history: Arc<dyn HistoryRepository>,
        policy: PredictionPolicy,
    ) -> Self {
        Self {
            predictor,
            history,
            backoff: policy.backoff(),
            policy,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: PredictionMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> &PredictionPolicy {
        &self.policy
    }

    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        self.predict_with_cancel(request, std::future::pending()).await
    }

    /// Like [`predict`](Self::predict), but gives up as soon as `cancel`
    /// completes. A cancelled prediction writes nothing.
    pub async fn predict_with_cancel<C>(
        &self,
        request: &PredictionRequest,
        cancel: C,
    ) -> Result<PredictionResult, PredictionError>
    where
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let trace_id = Uuid::new_v4();
        let customer_id = request.customer_id.as_str();
        info!("Prediction {} started for customer {}", trace_id, customer_id);
        debug!(
            "Prediction {} features: subscription={}, watch_hours={}, last_login_days={}",
            trace_id,
            request.features.subscription_type,
            request.features.watch_hours,
            request.features.last_login_days
        );

        let started = SystemTime::now();
        let mut attempts: u32 = 0;

        let result = loop {
            attempts += 1;

            let outcome = tokio::select! {
                biased;
                _ = &mut cancel => return Err(self.cancelled(customer_id, attempts)),
                outcome = self.attempt(request) => outcome,
            };

            let failure = match outcome {
                Ok(result) => break result,
                Err(failure) => failure,
            };

            if !failure.is_transient() {
                return Err(self.fail(customer_id, failure, attempts));
            }

            match self.backoff.should_retry(started, attempts - 1) {
                RetryDecision::Retry { execute_after } => {
                    let wait = execute_after
                        .duration_since(SystemTime::now())
                        .unwrap_or_default();
                    warn!(
                        "Prediction {} attempt {}/{} failed for customer {}: {}. Retrying in {:?}",
                        trace_id,
                        attempts,
                        self.policy.max_attempts(),
                        customer_id,
                        failure,
                        wait
                    );
                    tokio::select! {
                        biased;
                        _ = &mut cancel => return Err(self.cancelled(customer_id, attempts)),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                RetryDecision::DoNotRetry => {
                    return Err(self.fail(customer_id, failure, attempts));
                }
            }
        };

        info!(
            "Prediction {} succeeded for customer {}: {} with probability {}",
            trace_id, customer_id, result.label, result.probability
        );

        self.persist(request, result).await
    }

    /// One call bounded by the per-attempt timeout
    async fn attempt(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError> {
        let _guard = self.metrics.as_ref().map(AttemptGuard::start);
        match tokio::time::timeout(self.policy.timeout, self.predictor.predict(request)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(PredictorError::Timeout),
        }
    }

    async fn persist(
        &self,
        request: &PredictionRequest,
        result: PredictionResult,
    ) -> Result<PredictionResult, PredictionError> {
        let record = HistoryRecord::from_prediction(request, &result, None);

        match self.history.insert(&record).await {
            Ok(stored) => {
                debug!(
                    "Stored prediction #{:?} for customer {} ({})",
                    stored.id, stored.customer_id, stored.risk_tier
                );
                self.record_outcome("success");
                Ok(result)
            }
            Err(e) => {
                error!(
                    "Failed to persist prediction for customer {}: {:#}",
                    request.customer_id, e
                );
                let error = PredictionError::PersistenceFailure {
                    customer_id: request.customer_id.clone(),
                    result,
                    reason: format!("{:#}", e),
                };
                self.record_outcome(error.kind());
                Err(error)
            }
        }
    }

    fn fail(&self, customer_id: &str, failure: PredictorError, attempts: u32) -> PredictionError {
        let customer_id = customer_id.to_string();
        let error = match failure {
            PredictorError::Unreachable { reason } => {
                PredictionError::ServiceUnreachable { customer_id, reason }
            }
            PredictorError::Timeout => PredictionError::Timeout {
                customer_id,
                attempts,
                timeout_ms: u64::try_from(self.policy.timeout.as_millis()).unwrap_or(u64::MAX),
            },
            PredictorError::Rejected { status, body } => PredictionError::UpstreamRejected {
                customer_id,
                status,
                body,
            },
            PredictorError::Unavailable { status } => {
                PredictionError::UpstreamUnavailable { customer_id, status }
            }
            PredictorError::Protocol { reason } => {
                PredictionError::ProtocolViolation { customer_id, reason }
            }
            PredictorError::Empty => PredictionError::EmptyResponse { customer_id },
        };

        error!("Prediction failed after {} attempt(s): {}", attempts, error);
        self.record_outcome(error.kind());
        error
    }

    fn cancelled(&self, customer_id: &str, attempts: u32) -> PredictionError {
        warn!(
            "Prediction for customer {} cancelled during attempt {}",
            customer_id, attempts
        );
        let error = PredictionError::Cancelled {
            customer_id: customer_id.to_string(),
            attempts,
        };
        self.record_outcome(error.kind());
        error
    }

    fn record_outcome(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(outcome);
        }
    }
}
