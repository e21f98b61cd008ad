//! Domain service - business logic orchestration

use super::query::{StorageQuery, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use super::repository::{CodeConflict, StorageRepository};
use super::validation::{duplicate_code, ValidationContext};
use crate::contract::{
    IdentityContext, ListRequest, Page, Storage, StorageError, ValidationFailure, SERVICE_AGENT,
};
use std::sync::Arc;

/// Domain service for storage management
pub struct Service {
    repo: Arc<dyn StorageRepository>,
    default_page_size: u64,
    max_page_size: u64,
}

impl Service {
    /// Create a new service instance
    pub fn new(repo: Arc<dyn StorageRepository>) -> Self {
        Self {
            repo,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Override the default and largest accepted page sizes
    pub fn with_page_limits(mut self, default_page_size: u64, max_page_size: u64) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    /// Override the largest accepted page size
    pub fn with_max_page_size(mut self, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Page size applied when a list request omits one
    pub fn default_page_size(&self) -> u64 {
        self.default_page_size
    }

    /// Create a storage, returning its new identifier
    pub async fn create_storage(
        &self,
        storage: Storage,
        identity: &IdentityContext,
    ) -> Result<i64, StorageError> {
        let mut storage = normalize(storage);
        storage.id = 0;
        self.ensure_valid(&storage).await?;

        let now = chrono::Utc::now();
        storage.is_deleted = false;
        storage.created_utc = now;
        storage.created_by = identity.username.clone();
        storage.created_agent = SERVICE_AGENT.to_string();
        storage.last_modified_utc = now;
        storage.last_modified_by = identity.username.clone();
        storage.last_modified_agent = SERVICE_AGENT.to_string();
        storage.deleted_utc = None;
        storage.deleted_by = None;

        let id = self.repo.insert(&storage).await.map_err(write_error)?;

        tracing::info!(
            id,
            code = %storage.code,
            user = %identity.username,
            timezone_offset = identity.timezone_offset,
            "Storage created"
        );
        Ok(id)
    }

    /// List active storages matching a loosely-typed request
    pub async fn list_storages(&self, request: &ListRequest) -> Result<Page<Storage>, StorageError> {
        let query = StorageQuery::parse(request, self.max_page_size)?;
        tracing::debug!(?query, "Listing storages");

        self.repo.find_page(&query).await.map_err(internal)
    }

    /// Get an active storage with its module links
    pub async fn get_storage(&self, id: i64) -> Result<Storage, StorageError> {
        self.repo
            .find_active_by_id(id)
            .await
            .map_err(internal)?
            .ok_or_else(|| StorageError::not_found(id))
    }

    /// Replace a storage wholesale, returning affected storage rows
    pub async fn update_storage(
        &self,
        id: i64,
        storage: Storage,
        identity: &IdentityContext,
    ) -> Result<u64, StorageError> {
        if id != storage.id {
            return Err(StorageError::invalid_argument(format!(
                "path id {} does not match storage id {}",
                id, storage.id
            )));
        }

        let existing = self.get_storage(id).await?;

        let mut storage = normalize(storage);
        self.ensure_valid(&storage).await?;

        storage.is_deleted = false;
        storage.created_utc = existing.created_utc;
        storage.created_by = existing.created_by;
        storage.created_agent = existing.created_agent;
        storage.last_modified_utc = chrono::Utc::now();
        storage.last_modified_by = identity.username.clone();
        storage.last_modified_agent = SERVICE_AGENT.to_string();
        storage.deleted_utc = None;
        storage.deleted_by = None;

        let affected = self.repo.update(&storage).await.map_err(write_error)?;
        if affected == 0 {
            // Deleted between the lookup and the write
            return Err(StorageError::not_found(id));
        }

        tracing::info!(
            id,
            code = %storage.code,
            user = %identity.username,
            timezone_offset = identity.timezone_offset,
            "Storage updated"
        );
        Ok(affected)
    }

    /// Soft delete a storage. Deleting twice is safe and affects no rows.
    pub async fn delete_storage(
        &self,
        id: i64,
        identity: &IdentityContext,
    ) -> Result<u64, StorageError> {
        let affected = self
            .repo
            .soft_delete(id, &identity.username, chrono::Utc::now())
            .await
            .map_err(internal)?;

        if affected == 0 {
            if !self.repo.exists(id).await.map_err(internal)? {
                return Err(StorageError::not_found(id));
            }
            tracing::debug!(id, "Storage already deleted");
            return Ok(0);
        }

        tracing::info!(
            id,
            user = %identity.username,
            timezone_offset = identity.timezone_offset,
            "Storage deleted"
        );
        Ok(affected)
    }

    /// Run all validation rules against the live store without writing
    pub async fn validate_storage(
        &self,
        storage: &Storage,
    ) -> Result<Vec<ValidationFailure>, StorageError> {
        let storage = normalize(storage.clone());
        storage
            .validate(&ValidationContext::new(self.repo.as_ref()))
            .await
    }

    async fn ensure_valid(&self, storage: &Storage) -> Result<(), StorageError> {
        let failures = storage
            .validate(&ValidationContext::new(self.repo.as_ref()))
            .await?;

        if failures.is_empty() {
            return Ok(());
        }

        tracing::warn!(
            id = storage.id,
            code = %storage.code,
            failures = failures.len(),
            "Storage rejected by validation"
        );
        Err(StorageError::Validation { failures })
    }
}

fn normalize(mut storage: Storage) -> Storage {
    storage.code = storage.code.trim().to_string();
    storage.name = storage.name.trim().to_string();
    storage
}

/// A code conflict on write means a concurrent caller won the race
/// after validation passed
fn write_error(error: anyhow::Error) -> StorageError {
    match error.downcast_ref::<CodeConflict>() {
        Some(conflict) => {
            tracing::warn!(code = %conflict.code, "Storage code taken by a concurrent write");
            StorageError::Validation {
                failures: vec![duplicate_code(&conflict.code)],
            }
        }
        None => internal(error),
    }
}

fn internal(error: anyhow::Error) -> StorageError {
    tracing::error!(error = ?error, "Storage repository failure");
    StorageError::Internal
}
