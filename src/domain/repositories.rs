//! Repository Pattern Abstractions
//!
//! `HistoryRepository` is the only persistence seam of the system. It stores
//! prediction history records and serves the read-side analytics.
//!
//! # Implementations
//!
//! - `SqliteHistoryRepository`: durable storage through `sqlx`
//! - `InMemoryHistoryRepository`: `Arc<RwLock>` backed, for tests and
//!   ephemeral runs
//!
//! # Ordering
//!
//! Every listing is ordered by creation time, newest first. Records created
//! within the same timestamp are ordered by descending identity, so the most
//! recently inserted wins.
//!
//! # Example
//!
//! ```rust,no_run
//! use churninsight::domain::history::PageRequest;
//! use churninsight::domain::repositories::HistoryRepository;
//! use churninsight::infrastructure::InMemoryHistoryRepository;
//!
//! # async {
//! let repo = InMemoryHistoryRepository::new();
//! let latest = repo.page(PageRequest::first(20)?).await?;
//! # Ok::<(), anyhow::Error>(())
//! # };
//! ```

use crate::domain::history::{HistoryRecord, PageRequest};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append a record and return it with its assigned identity
    async fn insert(&self, record: &HistoryRecord) -> Result<HistoryRecord>;

    /// One page over all records
    async fn page(&self, page: PageRequest) -> Result<Vec<HistoryRecord>>;

    /// One page over the records of a customer
    async fn page_by_customer(
        &self,
        customer_id: &str,
        page: PageRequest,
    ) -> Result<Vec<HistoryRecord>>;

    /// One page over the records created within `[start, end]`
    async fn page_by_created_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<HistoryRecord>>;

    /// Most recent record of every distinct customer, newest first
    async fn latest_per_customer(&self) -> Result<Vec<HistoryRecord>>;

    /// Every stored record
    async fn find_all(&self) -> Result<Vec<HistoryRecord>>;

    /// Delete all records, returning how many were removed
    async fn clear_all(&self) -> Result<u64>;
}
