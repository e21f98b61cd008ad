//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to interact with storage service.
//! NO HTTP - direct function calls for performance.

use super::{
    error::{StorageError, ValidationFailure},
    model::{IdentityContext, ListRequest, Page, Storage},
};
use async_trait::async_trait;

/// Storage service API for inter-module communication
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Create a storage and return its new identifier
    async fn create_storage(
        &self,
        storage: Storage,
        identity: &IdentityContext,
    ) -> Result<i64, StorageError>;

    /// List active storages one page at a time
    async fn list_storages(&self, request: &ListRequest) -> Result<Page<Storage>, StorageError>;

    /// Get an active storage with its module links
    async fn get_storage(&self, id: i64) -> Result<Storage, StorageError>;

    /// Replace a storage and its module links, returning affected rows
    async fn update_storage(
        &self,
        id: i64,
        storage: Storage,
        identity: &IdentityContext,
    ) -> Result<u64, StorageError>;

    /// Soft delete a storage, returning affected rows
    async fn delete_storage(&self, id: i64, identity: &IdentityContext)
        -> Result<u64, StorageError>;

    /// Run validation rules without writing anything
    async fn validate_storage(
        &self,
        storage: &Storage,
    ) -> Result<Vec<ValidationFailure>, StorageError>;
}
