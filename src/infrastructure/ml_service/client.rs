use crate::domain::customer::PredictionRequest;
use crate::domain::errors::PredictorError;
use crate::domain::ports::ChurnPredictor;
use crate::domain::prediction::{PredictResponse, PredictionResult};
use crate::infrastructure::core::HttpClientFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP adapter for the external churn model (`POST /predict`, `GET /health`)
pub struct MlServiceClient {
    client: Client,
    base_url: String,
    predict_url: Url,
    health_url: Url,
    health_timeout: Duration,
}

impl MlServiceClient {
    pub fn new(base_url: &str, timeout: Duration, health_timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .with_context(|| format!("Invalid ML service base URL: {}", base_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client: HttpClientFactory::create_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            predict_url: base.join("predict").context("Failed to build predict URL")?,
            health_url: base.join("health").context("Failed to build health URL")?,
            health_timeout,
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }
}

#[async_trait]
impl ChurnPredictor for MlServiceClient {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError> {
        debug!(
            "POST {} for customer {} (subscription={}, watch_hours={}, last_login_days={})",
            self.predict_url,
            request.customer_id,
            request.features.subscription_type,
            request.features.watch_hours,
            request.features.last_login_days
        );

        let response = self
            .client
            .post(self.predict_url.clone())
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        classify_response(status, &body)
    }

    async fn is_healthy(&self) -> bool {
        let result = self
            .client
            .get(self.health_url.clone())
            .timeout(self.health_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("ML service health check returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("ML service not available: {}", e);
                false
            }
        }
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

fn transport_error(error: reqwest::Error) -> PredictorError {
    if error.is_timeout() {
        PredictorError::Timeout
    } else {
        PredictorError::Unreachable {
            reason: error.to_string(),
        }
    }
}

/// Map an HTTP status and body onto a prediction or a failure mode
pub(crate) fn classify_response(
    status: u16,
    body: &str,
) -> Result<PredictionResult, PredictorError> {
    match status {
        200..=299 => {
            if body.trim().is_empty() {
                return Err(PredictorError::Empty);
            }
            let parsed: Option<PredictResponse> =
                serde_json::from_str(body).map_err(|e| PredictorError::Protocol {
                    reason: e.to_string(),
                })?;
            match parsed {
                Some(response) => response
                    .into_result()
                    .map_err(|reason| PredictorError::Protocol { reason }),
                None => Err(PredictorError::Empty),
            }
        }
        400..=499 => Err(PredictorError::Rejected {
            status,
            body: body.to_string(),
        }),
        500..=599 => Err(PredictorError::Unavailable { status }),
        other => Err(PredictorError::Protocol {
            reason: format!("unexpected HTTP status {}", other),
        }),
    }
}
