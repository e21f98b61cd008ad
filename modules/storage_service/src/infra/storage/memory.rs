//! In-memory storage repository backed by `RwLock<BTreeMap>`.

use crate::contract::{Page, Storage, SERVICE_AGENT};
use crate::domain::query::{fold, StorageQuery};
use crate::domain::repository::{CodeConflict, StorageRepository};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory repository for development and testing.
///
/// Ids are assigned from an auto-incrementing counter starting at 1, so
/// iteration order of the map is creation order.
pub struct InMemoryStorageRepository {
    rows: RwLock<BTreeMap<i64, Storage>>,
    next_id: AtomicI64,
}

impl InMemoryStorageRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Store a record as-is (deleted flag and audit fields included), returning its new id.
    pub fn seed(&self, mut storage: Storage) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        storage.id = id;
        self.rows.write().insert(id, storage);
        id
    }

    /// Raw row lookup that also sees deleted records
    pub fn get_raw(&self, id: i64) -> Option<Storage> {
        self.rows.read().get(&id).cloned()
    }

    /// Number of rows, deleted ones included
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

fn code_taken(rows: &BTreeMap<i64, Storage>, code: &str, exclude_id: Option<i64>) -> bool {
    let code = fold(code);
    rows.values().any(|s| {
        !s.is_deleted && Some(s.id) != exclude_id && s.code.to_ascii_lowercase() == code
    })
}

fn conflict(code: &str) -> anyhow::Error {
    CodeConflict {
        code: code.to_string(),
    }
    .into()
}

impl Default for InMemoryStorageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageRepository for InMemoryStorageRepository {
    async fn insert(&self, storage: &Storage) -> Result<i64> {
        // Check and insert under one write lock
        let mut rows = self.rows.write();
        if code_taken(&rows, &storage.code, None) {
            return Err(conflict(&storage.code));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut stored = storage.clone();
        stored.id = id;
        rows.insert(id, stored);
        Ok(id)
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<Storage>> {
        Ok(self
            .rows
            .read()
            .get(&id)
            .filter(|s| !s.is_deleted)
            .cloned())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.rows.read().contains_key(&id))
    }

    async fn code_in_use(&self, code: &str, exclude_id: Option<i64>) -> Result<bool> {
        Ok(code_taken(&self.rows.read(), code, exclude_id))
    }

    async fn update(&self, storage: &Storage) -> Result<u64> {
        let mut rows = self.rows.write();
        let active = rows.get(&storage.id).is_some_and(|s| !s.is_deleted);
        if active && code_taken(&rows, &storage.code, Some(storage.id)) {
            return Err(conflict(&storage.code));
        }

        match rows.get_mut(&storage.id) {
            Some(existing) if !existing.is_deleted => {
                existing.code = storage.code.clone();
                existing.name = storage.name.clone();
                existing.module_sources = storage.module_sources.clone();
                existing.module_destinations = storage.module_destinations.clone();
                existing.last_modified_utc = storage.last_modified_utc;
                existing.last_modified_by = storage.last_modified_by.clone();
                existing.last_modified_agent = storage.last_modified_agent.clone();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn soft_delete(
        &self,
        id: i64,
        deleted_by: &str,
        deleted_at: DateTime<Utc>,
    ) -> Result<u64> {
        let mut rows = self.rows.write();
        match rows.get_mut(&id) {
            Some(existing) if !existing.is_deleted => {
                existing.is_deleted = true;
                existing.deleted_utc = Some(deleted_at);
                existing.deleted_by = Some(deleted_by.to_string());
                existing.last_modified_utc = deleted_at;
                existing.last_modified_by = deleted_by.to_string();
                existing.last_modified_agent = SERVICE_AGENT.to_string();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn find_page(&self, query: &StorageQuery) -> Result<Page<Storage>> {
        let snapshot: Vec<Storage> = self.rows.read().values().cloned().collect();
        Ok(query.apply(snapshot))
    }
}
