use crate::domain::customer::PredictionRequest;
use crate::domain::errors::PredictorError;
use crate::domain::prediction::PredictionResult;
use async_trait::async_trait;

// Need async_trait for async functions in traits
#[async_trait]
pub trait ChurnPredictor: Send + Sync {
    /// Perform exactly one prediction call. Timeouts and retries are applied
    /// by the caller.
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError>;

    /// Best-effort liveness probe; never fails.
    async fn is_healthy(&self) -> bool;

    /// Address of the service, for reporting
    fn endpoint(&self) -> &str;
}
