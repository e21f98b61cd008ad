//! REST DTOs with serde derives for HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ===== Storage DTOs =====

/// Storage view model, used for both requests and responses.
///
/// Audit fields are filled on responses and ignored on requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageViewModel {
    /// Storage identifier (0 or absent on create)
    #[serde(rename = "_id", default)]
    pub id: i64,

    #[schema(example = "GDG-01")]
    #[serde(default)]
    pub code: Option<String>,

    #[schema(example = "Gudang Kain")]
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub module_sources: Vec<ModuleSourceViewModel>,

    #[serde(default)]
    pub module_destinations: Vec<ModuleDestinationViewModel>,

    #[serde(rename = "_createdUtc", default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<DateTime<Utc>>,

    #[serde(rename = "_createdBy", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(rename = "_lastModifiedUtc", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_utc: Option<DateTime<Utc>>,

    #[serde(rename = "_lastModifiedBy", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
}

/// Module reference as sent by clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModuleViewModel {
    #[serde(rename = "_id", default)]
    pub id: Option<i64>,

    #[schema(example = "WVG")]
    #[serde(default)]
    pub code: Option<String>,

    #[schema(example = "Weaving")]
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSourceViewModel {
    #[serde(default)]
    pub module_source: Option<ModuleViewModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDestinationViewModel {
    #[serde(default)]
    pub module_destination: Option<ModuleViewModel>,
}

// ===== Request / Response DTOs =====

/// Query parameters for listing storages
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListStoragesQuery {
    /// 1-based page index (default 1)
    pub page: Option<u64>,
    /// Page size (default from configuration)
    pub size: Option<u64>,
    /// JSON object of field → "asc" | "desc"
    pub order: Option<String>,
    /// JSON object of field → value
    pub filter: Option<String>,
    /// Substring searched in code and name
    pub keyword: Option<String>,
    /// Comma-separated view model fields to return
    pub select: Option<String>,
}

/// Paginated list of storages
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StorageListResponse {
    /// Storages on this page, projected to `select` when given
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<serde_json::Value>,

    pub info: PageInfoDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageInfoDto {
    pub page: u64,
    pub size: u64,
    /// Items on this page
    pub count: usize,
    /// Matches before paging
    pub total: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub select: Vec<String>,
}

/// Identifier of a newly created storage
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    #[serde(rename = "_id")]
    pub id: i64,
}

/// Rows affected by an update or delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AffectedResponse {
    pub affected: u64,
}

/// One failed validation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorDto {
    #[schema(example = "code")]
    pub member: String,
    pub message: String,
}

/// Result of a dry-run validation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: Vec<FieldErrorDto>,
}

// Note: Conversion implementations live in mapper.rs
