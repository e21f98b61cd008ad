//! Repository trait for data access
//!
//! This trait defines the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs and infra/storage/memory.rs

use super::query::StorageQuery;
use crate::contract::{Page, Storage};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A write was refused because another active storage holds the same code.
///
/// Repositories return it inside their `anyhow::Error` so the service can
/// report the race as a duplicate code failure.
#[derive(Debug, thiserror::Error)]
#[error("code '{code}' is already used by another active storage")]
pub struct CodeConflict {
    pub code: String,
}

/// Repository for storages and their owned module links
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Insert a storage with its links, returning the generated id.
    /// Fails with [`CodeConflict`] when the code is taken by an active storage.
    async fn insert(&self, storage: &Storage) -> Result<i64>;

    /// Find a non-deleted storage by id, links included
    async fn find_active_by_id(&self, id: i64) -> Result<Option<Storage>>;

    /// Check if a storage row exists, deleted or not
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Check if an active storage other than `exclude_id` uses `code`
    /// (trimmed, ASCII case-insensitive)
    async fn code_in_use(&self, code: &str, exclude_id: Option<i64>) -> Result<bool>;

    /// Replace scalar fields and both link collections of an active storage.
    /// Returns the number of storage rows updated, fails with [`CodeConflict`]
    /// like `insert`.
    async fn update(&self, storage: &Storage) -> Result<u64>;

    /// Flag an active storage as deleted. Returns the number of storage rows updated.
    async fn soft_delete(&self, id: i64, deleted_by: &str, deleted_at: DateTime<Utc>)
        -> Result<u64>;

    /// Evaluate a typed query over active storages
    async fn find_page(&self, query: &StorageQuery) -> Result<Page<Storage>>;
}
