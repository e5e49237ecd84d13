//! In-Memory Repository Implementation
//!
//! Thread-safe, in-memory implementation of `HistoryRepository`.
//!
//! # Features
//!
//! - **Thread-safe**: Uses `Arc<RwLock>` for concurrent access
//! - **Same ordering** as the SQLite store: newest first, ties broken by
//!   descending identity
//! - **Testing**: Ideal for unit tests and development
//!
//! # Limitations
//!
//! - Data is lost on application restart
//! - Scans are linear in the number of records

use crate::domain::history::{HistoryRecord, PageRequest, stored_range, to_stored_precision};
use crate::domain::repositories::HistoryRepository;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct HistoryState {
    records: Vec<HistoryRecord>,
    next_id: i64,
}

/// In-memory implementation of HistoryRepository
#[derive(Clone)]
pub struct InMemoryHistoryRepository {
    state: Arc<RwLock<HistoryState>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(HistoryState {
                records: Vec::new(),
                next_id: 1,
            })),
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryHistoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(records: &mut [HistoryRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn paginate(mut records: Vec<HistoryRecord>, page: PageRequest) -> Vec<HistoryRecord> {
    newest_first(&mut records);
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    records
        .into_iter()
        .skip(offset)
        .take(page.size as usize)
        .collect()
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn insert(&self, record: &HistoryRecord) -> Result<HistoryRecord> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        state.next_id += 1;
        let stored = HistoryRecord {
            created_at: to_stored_precision(record.created_at),
            ..record.clone()
        }
        .with_id(id);
        state.records.push(stored.clone());
        Ok(stored)
    }

    async fn page(&self, page: PageRequest) -> Result<Vec<HistoryRecord>> {
        let records = self.state.read().await.records.clone();
        Ok(paginate(records, page))
    }

    async fn page_by_customer(
        &self,
        customer_id: &str,
        page: PageRequest,
    ) -> Result<Vec<HistoryRecord>> {
        let state = self.state.read().await;
        let records = state
            .records
            .iter()
            .filter(|r| r.customer_id == customer_id)
            .cloned()
            .collect();
        Ok(paginate(records, page))
    }

    async fn page_by_created_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Vec<HistoryRecord>> {
        let (start, end) = stored_range(start, end);
        let state = self.state.read().await;
        let records = state
            .records
            .iter()
            .filter(|r| r.created_at >= start && r.created_at <= end)
            .cloned()
            .collect();
        Ok(paginate(records, page))
    }

    async fn latest_per_customer(&self) -> Result<Vec<HistoryRecord>> {
        let state = self.state.read().await;
        let mut latest: HashMap<&str, &HistoryRecord> = HashMap::new();
        for record in &state.records {
            latest
                .entry(record.customer_id.as_str())
                .and_modify(|current| {
                    if (record.created_at, record.id) > (current.created_at, current.id) {
                        *current = record;
                    }
                })
                .or_insert(record);
        }
        let mut records: Vec<HistoryRecord> = latest.into_values().cloned().collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn find_all(&self) -> Result<Vec<HistoryRecord>> {
        let mut records = self.state.read().await.records.clone();
        newest_first(&mut records);
        Ok(records)
    }

    async fn clear_all(&self) -> Result<u64> {
        let mut state = self.state.write().await;
        let removed = state.records.len() as u64;
        state.records.clear();
        Ok(removed)
    }
}
