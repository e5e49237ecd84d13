use crate::domain::errors::ValidationError;
use crate::domain::history::{HistoryRecord, PageRequest};
use crate::domain::repositories::HistoryRepository;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Listing view of a stored prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Option<i64>,
    pub customer_id: String,
    pub subscription_type: String,
    pub payment_method: String,
    pub monthly_fee: f64,
    pub watch_hours: f64,
    pub last_login_days: u32,
    pub number_of_profiles: u8,
    pub avg_watch_time_per_day: f64,
    pub probability: f64,
    pub label: String,
    pub risk_tier: String,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryRecord> for HistoryEntry {
    fn from(record: HistoryRecord) -> Self {
        Self {
            id: record.id,
            customer_id: record.customer_id,
            subscription_type: record.subscription_type,
            payment_method: record.payment_method,
            monthly_fee: record.monthly_fee,
            watch_hours: record.watch_hours,
            last_login_days: record.last_login_days,
            number_of_profiles: record.number_of_profiles,
            avg_watch_time_per_day: record.avg_watch_time_per_day,
            probability: record.probability,
            label: record.label,
            risk_tier: record.risk_tier,
            created_at: record.created_at,
        }
    }
}

/// Paged read access to the prediction history, plus the administrative clear.
pub struct HistoryService {
    history: Arc<dyn HistoryRepository>,
}

impl HistoryService {
    pub fn new(history: Arc<dyn HistoryRepository>) -> Self {
        Self { history }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Vec<HistoryEntry>> {
        let records = self
            .history
            .page(page)
            .await
            .context("Failed to list prediction history")?;
        Ok(into_entries(records))
    }

    pub async fn by_customer(
        &self,
        customer_id: &str,
        page: PageRequest,
    ) -> Result<Vec<HistoryEntry>> {
        let records = self
            .history
            .page_by_customer(customer_id, page)
            .await
            .with_context(|| format!("Failed to list history of customer {}", customer_id))?;
        Ok(into_entries(records))
    }

    /// Both bounds inclusive. `start` after `end` is rejected.
    pub async fn by_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<HistoryEntry>> {
        if start > end {
            return Err(ValidationError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            }
            .into());
        }

        let records = self
            .history
            .page_by_created_range(start, end, page)
            .await
            .with_context(|| format!("Failed to list history between {} and {}", start, end))?;
        Ok(into_entries(records))
    }

    /// Latest prediction of every customer, newest first
    pub async fn latest_per_customer(&self) -> Result<Vec<HistoryEntry>> {
        let records = self
            .history
            .latest_per_customer()
            .await
            .context("Failed to load latest predictions")?;
        Ok(into_entries(records))
    }

    /// Removes every record. Returns how many were deleted.
    pub async fn clear(&self) -> Result<u64> {
        warn!("Clearing the whole prediction history");
        let removed = self
            .history
            .clear_all()
            .await
            .context("Failed to clear prediction history")?;
        info!("Removed {} prediction history records", removed);
        Ok(removed)
    }
}

fn into_entries(records: Vec<HistoryRecord>) -> Vec<HistoryEntry> {
    records.into_iter().map(HistoryEntry::from).collect()
}
