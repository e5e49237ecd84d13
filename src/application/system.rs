use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::application::health::HealthReport;
use crate::application::history_service::{HistoryEntry, HistoryService};
use crate::application::insights::{
    KpiAggregator, Kpis, RecommendationAdvisor, RiskExplainer, RiskFactorsResult,
};
use crate::application::prediction::{PredictionOrchestrator, PredictionPolicy};
use crate::config::Config;
use crate::domain::customer::PredictionRequest;
use crate::domain::errors::{ExplainError, PredictionError};
use crate::domain::history::{HistoryRecord, PageRequest};
use crate::domain::ports::ChurnPredictor;
use crate::domain::prediction::PredictionResult;
use crate::domain::repositories::HistoryRepository;
use crate::infrastructure::MlServiceClient;
use crate::infrastructure::observability::PredictionMetrics;
use crate::infrastructure::persistence::{Database, SqliteHistoryRepository};

/// Wired application: one predictor, one history store and the services
/// reading from it.
pub struct ChurnInsight {
    predictor: Arc<dyn ChurnPredictor>,
    orchestrator: PredictionOrchestrator,
    explainer: RiskExplainer,
    kpis: KpiAggregator,
    advisor: RecommendationAdvisor,
    history: HistoryService,
    store: Arc<dyn HistoryRepository>,
    metrics: Option<PredictionMetrics>,
}

impl ChurnInsight {
    pub async fn build(config: &Config) -> Result<Self> {
        info!(
            "Building ChurnInsight (ML service: {}, database: {})",
            config.ml_service.base_url, config.persistence.database_url
        );

        let db = Database::new(&config.persistence.database_url)
            .await
            .context("Failed to open prediction history database")?;
        let history: Arc<dyn HistoryRepository> = Arc::new(SqliteHistoryRepository::new(db.pool));

        let predictor: Arc<dyn ChurnPredictor> = Arc::new(
            MlServiceClient::new(
                &config.ml_service.base_url,
                config.ml_service.timeout(),
                config.ml_service.health_timeout(),
            )
            .context("Failed to create ML service client")?,
        );

        let metrics = if config.observability.enabled {
            Some(PredictionMetrics::new().context("Failed to register prediction metrics")?)
        } else {
            None
        };

        let policy = config.ml_service.prediction_policy();
        info!(
            "Prediction policy: timeout {:?}, {} retries, worst case {:?}",
            policy.timeout,
            policy.max_retries,
            policy.worst_case_latency()
        );

        Ok(Self::from_parts(predictor, history, policy, metrics))
    }

    pub fn from_parts(
        predictor: Arc<dyn ChurnPredictor>,
        history: Arc<dyn HistoryRepository>,
        policy: PredictionPolicy,
        metrics: Option<PredictionMetrics>,
    ) -> Self {
        let mut orchestrator =
            PredictionOrchestrator::new(predictor.clone(), history.clone(), policy);
        if let Some(metrics) = &metrics {
            orchestrator = orchestrator.with_metrics(metrics.clone());
        }

        Self {
            predictor,
            orchestrator,
            explainer: RiskExplainer::new(history.clone()),
            kpis: KpiAggregator::new(history.clone()),
            advisor: RecommendationAdvisor::new(),
            history: HistoryService::new(history.clone()),
            store: history,
            metrics,
        }
    }

    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictionError> {
        self.orchestrator.predict(request).await
    }

    pub async fn predict_with_cancel<C>(
        &self,
        request: &PredictionRequest,
        cancel: C,
    ) -> Result<PredictionResult, PredictionError>
    where
        C: Future<Output = ()>,
    {
        self.orchestrator.predict_with_cancel(request, cancel).await
    }

    /// Upper bound on how long `predict` can take, persistence excluded
    pub fn worst_case_latency(&self) -> Duration {
        self.orchestrator.policy().worst_case_latency()
    }

    pub async fn explain(&self, customer_id: &str) -> Result<RiskFactorsResult, ExplainError> {
        self.explainer.explain(customer_id).await
    }

    pub fn recommend(&self, record: &HistoryRecord) -> String {
        self.advisor.suggest(record)
    }

    /// Recommendation for the most recent prediction of `customer_id`
    pub async fn recommend_latest(&self, customer_id: &str) -> Result<String, ExplainError> {
        let page = PageRequest { page: 0, size: 1 };
        let latest = self
            .store
            .page_by_customer(customer_id, page)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ExplainError::NotFound {
                customer_id: customer_id.to_string(),
            })?;
        Ok(self.recommend(&latest))
    }

    pub async fn compute_kpis(&self) -> Result<Kpis> {
        self.kpis.compute_kpis().await
    }

    pub async fn list_history(&self, page: PageRequest) -> Result<Vec<HistoryEntry>> {
        self.history.list(page).await
    }

    pub async fn list_history_by_customer(
        &self,
        customer_id: &str,
        page: PageRequest,
    ) -> Result<Vec<HistoryEntry>> {
        self.history.by_customer(customer_id, page).await
    }

    pub async fn list_history_by_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<HistoryEntry>> {
        self.history.by_range(start, end, page).await
    }

    pub async fn latest_per_customer(&self) -> Result<Vec<HistoryEntry>> {
        self.history.latest_per_customer().await
    }

    pub async fn clear_history(&self) -> Result<u64> {
        self.history.clear().await
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport::check(self.predictor.as_ref()).await
    }

    pub fn basic_health(&self) -> HealthReport {
        HealthReport::basic()
    }

    pub fn metrics(&self) -> Option<&PredictionMetrics> {
        self.metrics.as_ref()
    }
}
