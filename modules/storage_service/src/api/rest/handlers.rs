//! HTTP request handlers - thin layer that delegates to domain service

use super::{
    dto::*,
    error::{map_domain_error, Problem},
    mapper::{map_to_model, parse_select, project},
};
use crate::contract::{IdentityContext, ListRequest};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

/// Header carrying the acting user name
pub const USERNAME_HEADER: &str = "x-username";
/// Header carrying the client timezone offset in hours
pub const TIMEZONE_OFFSET_HEADER: &str = "x-timezone-offset";

/// Resolve the acting identity from request headers, falling back to defaults
pub fn identity_from_headers(headers: &HeaderMap) -> IdentityContext {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let default = IdentityContext::default();
    IdentityContext {
        username: header(USERNAME_HEADER)
            .map(ToString::to_string)
            .unwrap_or(default.username),
        timezone_offset: header(TIMEZONE_OFFSET_HEADER)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.timezone_offset),
    }
}

/// List storages with paging, filter, order, keyword and projection
pub async fn list_storages(
    service: Arc<Service>,
    Query(query): Query<ListStoragesQuery>,
) -> Result<Json<StorageListResponse>, Problem> {
    let request = ListRequest {
        page: query.page.unwrap_or(1),
        size: query.size.unwrap_or_else(|| service.default_page_size()),
        filter: query.filter,
        order: query.order,
        keyword: query.keyword,
    };

    let page = service
        .list_storages(&request)
        .await
        .map_err(map_domain_error)?;

    let select = parse_select(query.select.as_deref());
    let data = page
        .items
        .into_iter()
        .map(|storage| {
            serde_json::to_value(StorageViewModel::from(storage))
                .map(|value| project(value, &select))
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to serialize storage list");
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .with_detail("An unexpected error occurred")
        })?;

    let info = PageInfoDto {
        page: page.page,
        size: page.size,
        count: data.len(),
        total: page.total,
        select,
    };

    Ok(Json(StorageListResponse { data, info }))
}

/// Get a specific storage
pub async fn get_storage(
    service: Arc<Service>,
    Path(id): Path<i64>,
) -> Result<Json<StorageViewModel>, Problem> {
    let storage = service.get_storage(id).await.map_err(map_domain_error)?;

    Ok(Json(storage.into()))
}

/// Create a new storage
pub async fn create_storage(
    service: Arc<Service>,
    headers: HeaderMap,
    Json(view): Json<StorageViewModel>,
) -> Result<(StatusCode, Json<CreatedResponse>), Problem> {
    let identity = identity_from_headers(&headers);
    let id = service
        .create_storage(map_to_model(view), &identity)
        .await
        .map_err(map_domain_error)?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Replace an existing storage
pub async fn update_storage(
    service: Arc<Service>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(view): Json<StorageViewModel>,
) -> Result<Json<AffectedResponse>, Problem> {
    let identity = identity_from_headers(&headers);
    let affected = service
        .update_storage(id, map_to_model(view), &identity)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(AffectedResponse { affected }))
}

/// Soft delete a storage
pub async fn delete_storage(
    service: Arc<Service>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<AffectedResponse>, Problem> {
    let identity = identity_from_headers(&headers);
    let affected = service
        .delete_storage(id, &identity)
        .await
        .map_err(map_domain_error)?;

    Ok(Json(AffectedResponse { affected }))
}

/// Validate a storage without saving it
pub async fn validate_storage(
    service: Arc<Service>,
    Json(view): Json<StorageViewModel>,
) -> Result<Json<ValidationResponse>, Problem> {
    let failures = service
        .validate_storage(&map_to_model(view))
        .await
        .map_err(map_domain_error)?;

    Ok(Json(ValidationResponse {
        valid: failures.is_empty(),
        errors: failures.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_identity_defaults() {
        let identity = identity_from_headers(&HeaderMap::new());
        assert_eq!(identity, IdentityContext::default());
    }

    #[test]
    fn test_identity_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USERNAME_HEADER, HeaderValue::from_static(" dev2 "));
        headers.insert(TIMEZONE_OFFSET_HEADER, HeaderValue::from_static("7"));

        assert_eq!(identity_from_headers(&headers), IdentityContext::new("dev2", 7));
    }

    #[test]
    fn test_bad_offset_falls_back_to_zero() {
        let mut headers = HeaderMap::new();
        headers.insert(TIMEZONE_OFFSET_HEADER, HeaderValue::from_static("GMT+7"));

        assert_eq!(identity_from_headers(&headers).timezone_offset, 0);
    }
}
