//! Route registration for the storage REST API

use super::{dto::*, error::Problem, handlers};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

/// Register all storage routes on `router`
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    router
        .route(
            "/storages",
            get(list_storages_handler).post(create_storage_handler),
        )
        .route("/storages/validate", post(validate_storage_handler))
        .route(
            "/storages/{id}",
            get(get_storage_handler)
                .put(update_storage_handler)
                .delete(delete_storage_handler),
        )
        // Add service as extension for handlers
        .layer(Extension(service))
}

// ===== Handler wrappers that extract service from Extension =====

async fn list_storages_handler(
    Extension(service): Extension<Arc<Service>>,
    query: Query<ListStoragesQuery>,
) -> Result<Json<StorageListResponse>, Problem> {
    handlers::list_storages(service, query).await
}

async fn get_storage_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i64>,
) -> Result<Json<StorageViewModel>, Problem> {
    handlers::get_storage(service, path).await
}

async fn create_storage_handler(
    Extension(service): Extension<Arc<Service>>,
    headers: HeaderMap,
    json: Json<StorageViewModel>,
) -> Result<(StatusCode, Json<CreatedResponse>), Problem> {
    handlers::create_storage(service, headers, json).await
}

async fn update_storage_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i64>,
    headers: HeaderMap,
    json: Json<StorageViewModel>,
) -> Result<Json<AffectedResponse>, Problem> {
    handlers::update_storage(service, path, headers, json).await
}

async fn delete_storage_handler(
    Extension(service): Extension<Arc<Service>>,
    path: Path<i64>,
    headers: HeaderMap,
) -> Result<Json<AffectedResponse>, Problem> {
    handlers::delete_storage(service, path, headers).await
}

async fn validate_storage_handler(
    Extension(service): Extension<Arc<Service>>,
    json: Json<StorageViewModel>,
) -> Result<Json<ValidationResponse>, Problem> {
    handlers::validate_storage(service, json).await
}
