use crate::domain::customer::PredictionRequest;
use crate::domain::errors::PredictorError;
use crate::domain::ports::ChurnPredictor;
use crate::domain::prediction::{PredictionLabel, PredictionResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// One scripted reply of the mock predictor
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(Result<PredictionResult, PredictorError>),
    /// Wait before answering; used to trigger timeouts
    Delay(Duration, Result<PredictionResult, PredictorError>),
}

/// Scripted predictor. Replies are consumed in order; once the script is
/// exhausted every call gets the fallback reply.
#[derive(Clone)]
pub struct MockChurnPredictor {
    script: Arc<Mutex<VecDeque<MockReply>>>,
    fallback: Result<PredictionResult, PredictorError>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<PredictionRequest>>>,
    healthy: bool,
}

impl MockChurnPredictor {
    pub fn new(fallback: Result<PredictionResult, PredictorError>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            healthy: true,
        }
    }

    /// Always answer with the given label and probability
    pub fn answering(label: PredictionLabel, probability: f64) -> Self {
        Self::new(Ok(PredictionResult { label, probability }))
    }

    /// Always fail with the given error
    pub fn failing(error: PredictorError) -> Self {
        Self::new(Err(error))
    }

    pub fn with_script(self, replies: impl IntoIterator<Item = MockReply>) -> Self {
        let script = replies.into_iter().collect();
        Self {
            script: Arc::new(Mutex::new(script)),
            ..self
        }
    }

    pub fn unhealthy(self) -> Self {
        Self {
            healthy: false,
            ..self
        }
    }

    /// Number of calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn requests(&self) -> Vec<PredictionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ChurnPredictor for MockChurnPredictor {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().await.push(request.clone());

        let reply = self.script.lock().await.pop_front();
        debug!(
            "MockChurnPredictor: call {} for {} ({:?})",
            call, request.customer_id, reply
        );

        match reply {
            Some(MockReply::Respond(outcome)) => outcome,
            Some(MockReply::Delay(delay, outcome)) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => self.fallback.clone(),
        }
    }

    async fn is_healthy(&self) -> bool {
        self.healthy
    }

    fn endpoint(&self) -> &str {
        "mock://ml-service"
    }
}
