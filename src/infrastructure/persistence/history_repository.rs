use crate::domain::history::{HistoryRecord, PageRequest, stored_range, to_stored_precision};
use crate::domain::repositories::HistoryRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

pub struct SqliteHistoryRepository {
    pool: SqlitePool,
}

impl SqliteHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn insert(&self, record: &HistoryRecord) -> Result<HistoryRecord> {
        let created_at = to_stored_precision(record.created_at);
        let result = sqlx::query(
            r#"
            INSERT INTO prediction_history
            (customer_id, subscription_type, payment_method, monthly_fee, watch_hours,
             last_login_days, number_of_profiles, avg_watch_time_per_day, probability,
             label, prediction_label, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.customer_id)
        .bind(&record.subscription_type)
        .bind(&record.payment_method)
        .bind(record.monthly_fee)
        .bind(record.watch_hours)
        .bind(i64::from(record.last_login_days))
        .bind(i64::from(record.number_of_profiles))
        .bind(record.avg_watch_time_per_day)
        .bind(record.probability)
        .bind(&record.label)
        .bind(&record.risk_tier)
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .context("Failed to save prediction history")?;

        let id = result.last_insert_rowid();
        info!(
            "Persisted prediction #{} for customer {} ({})",
            id, record.customer_id, record.risk_tier
        );
        Ok(HistoryRecord {
            created_at,
            ..record.clone()
        }
        .with_id(id))
    }

    async fn page(&self, page: PageRequest) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM prediction_history ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(i64::from(page.size))
        .bind(offset(page)?)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load prediction history page")?;
        map_rows(rows)
    }

    async fn page_by_customer(
        &self,
        customer_id: &str,
        page: PageRequest,
    ) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM prediction_history
            WHERE customer_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(customer_id)
        .bind(i64::from(page.size))
        .bind(offset(page)?)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to load prediction history of {}", customer_id))?;
        map_rows(rows)
    }

    async fn page_by_created_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<HistoryRecord>> {
        let (start, end) = stored_range(start, end);
        let rows = sqlx::query(
            r#"
            SELECT * FROM prediction_history
            WHERE created_at BETWEEN ? AND ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(start.timestamp_millis())
        .bind(end.timestamp_millis())
        .bind(i64::from(page.size))
        .bind(offset(page)?)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load prediction history range")?;
        map_rows(rows)
    }

    async fn latest_per_customer(&self) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM prediction_history p
            WHERE p.id = (
                SELECT ph.id FROM prediction_history ph
                WHERE ph.customer_id = p.customer_id
                ORDER BY ph.created_at DESC, ph.id DESC
                LIMIT 1
            )
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load latest prediction per customer")?;
        map_rows(rows)
    }

    async fn find_all(&self) -> Result<Vec<HistoryRecord>> {
        let rows =
            sqlx::query("SELECT * FROM prediction_history ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await
                .context("Failed to load prediction history")?;
        map_rows(rows)
    }

    async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM prediction_history")
            .execute(&self.pool)
            .await
            .context("Failed to clear prediction history")?;
        let removed = result.rows_affected();
        info!("Cleared prediction history ({} records)", removed);
        Ok(removed)
    }
}

fn offset(page: PageRequest) -> Result<i64> {
    i64::try_from(page.offset()).context("Page offset out of range")
}

fn map_rows(rows: Vec<SqliteRow>) -> Result<Vec<HistoryRecord>> {
    debug!("Mapping {} prediction history rows", rows.len());
    rows.iter().map(map_row).collect()
}

fn map_row(row: &SqliteRow) -> Result<HistoryRecord> {
    let id: i64 = row.try_get("id")?;
    let last_login_days: i64 = row.try_get("last_login_days")?;
    let number_of_profiles: i64 = row.try_get("number_of_profiles")?;
    let created_at_ms: i64 = row.try_get("created_at")?;

    Ok(HistoryRecord {
        id: Some(id),
        customer_id: row.try_get("customer_id")?,
        subscription_type: row.try_get("subscription_type")?,
        payment_method: row.try_get("payment_method")?,
        monthly_fee: row.try_get("monthly_fee")?,
        watch_hours: row.try_get("watch_hours")?,
        last_login_days: u32::try_from(last_login_days)
            .with_context(|| format!("Invalid last_login_days in record #{}", id))?,
        number_of_profiles: u8::try_from(number_of_profiles)
            .with_context(|| format!("Invalid number_of_profiles in record #{}", id))?,
        avg_watch_time_per_day: row.try_get("avg_watch_time_per_day")?,
        probability: row.try_get("probability")?,
        label: row.try_get("label")?,
        risk_tier: row.try_get("prediction_label")?,
        created_at: Utc
            .timestamp_millis_opt(created_at_ms)
            .single()
            .with_context(|| format!("Invalid created_at in record #{}", id))?,
    })
}
