use crate::domain::repositories::HistoryRepository;
use crate::domain::risk_tier::RiskTier;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Portfolio-level churn indicators over the latest record of each customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_customers: u64,
    pub high_risk: u64,
    pub medium_risk: u64,
    pub low_risk: u64,
    /// Percentage in [0, 100]
    pub churn_rate: f64,
}

pub struct KpiAggregator {
    history: Arc<dyn HistoryRepository>,
}

impl KpiAggregator {
    pub fn new(history: Arc<dyn HistoryRepository>) -> Self {
        Self { history }
    }

    /// Read-only; older predictions of the same customer never count.
    pub async fn compute_kpis(&self) -> Result<Kpis> {
        let latest = self
            .history
            .latest_per_customer()
            .await
            .context("Failed to load latest predictions per customer")?;

        let total_customers = latest.len() as u64;
        let count_tier = |tier: RiskTier| {
            latest
                .iter()
                .filter(|r| tier.matches_label(&r.risk_tier))
                .count() as u64
        };
        let churned = latest.iter().filter(|r| r.is_churn()).count() as u64;

        let churn_rate = if total_customers > 0 {
            churned as f64 / total_customers as f64 * 100.0
        } else {
            0.0
        };

        let kpis = Kpis {
            total_customers,
            high_risk: count_tier(RiskTier::High),
            medium_risk: count_tier(RiskTier::Medium),
            low_risk: count_tier(RiskTier::Low),
            churn_rate,
        };
        debug!("KPIs computed: {:?}", kpis);
        Ok(kpis)
    }
}
