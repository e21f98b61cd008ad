//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    IdentityContext, ListRequest, Page, Storage, StorageApi, StorageError, ValidationFailure,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client implementation that directly calls the domain service
///
/// This client is used for in-process communication without HTTP overhead.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl StorageApi for NativeClient {
    async fn create_storage(
        &self,
        storage: Storage,
        identity: &IdentityContext,
    ) -> Result<i64, StorageError> {
        self.service.create_storage(storage, identity).await
    }

    async fn list_storages(&self, request: &ListRequest) -> Result<Page<Storage>, StorageError> {
        self.service.list_storages(request).await
    }

    async fn get_storage(&self, id: i64) -> Result<Storage, StorageError> {
        self.service.get_storage(id).await
    }

    async fn update_storage(
        &self,
        id: i64,
        storage: Storage,
        identity: &IdentityContext,
    ) -> Result<u64, StorageError> {
        self.service.update_storage(id, storage, identity).await
    }

    async fn delete_storage(
        &self,
        id: i64,
        identity: &IdentityContext,
    ) -> Result<u64, StorageError> {
        self.service.delete_storage(id, identity).await
    }

    async fn validate_storage(
        &self,
        storage: &Storage,
    ) -> Result<Vec<ValidationFailure>, StorageError> {
        self.service.validate_storage(storage).await
    }
}
