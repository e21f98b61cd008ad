//! Contract models for storage service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};

/// Agent name stamped into audit fields by this service
pub const SERVICE_AGENT: &str = "storage-service";

/// Page size used when a caller does not ask for one
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Storage record: a named location grouping source and destination modules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    /// Identity assigned by persistence (0 until created)
    pub id: i64,
    /// Business code, unique among active storages
    pub code: String,
    /// Display label
    pub name: String,
    /// Modules this storage receives goods from, in order
    pub module_sources: Vec<ModuleSourceLink>,
    /// Modules this storage sends goods to, in order
    pub module_destinations: Vec<ModuleDestinationLink>,
    /// Soft delete flag
    pub is_deleted: bool,
    pub created_utc: DateTime<Utc>,
    pub created_by: String,
    pub created_agent: String,
    pub last_modified_utc: DateTime<Utc>,
    pub last_modified_by: String,
    pub last_modified_agent: String,
    pub deleted_utc: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            id: 0,
            code: String::new(),
            name: String::new(),
            module_sources: Vec::new(),
            module_destinations: Vec::new(),
            is_deleted: false,
            created_utc: DateTime::<Utc>::UNIX_EPOCH,
            created_by: String::new(),
            created_agent: String::new(),
            last_modified_utc: DateTime::<Utc>::UNIX_EPOCH,
            last_modified_by: String::new(),
            last_modified_agent: String::new(),
            deleted_utc: None,
            deleted_by: None,
        }
    }
}

impl Storage {
    /// Create an unsaved storage with the given code and name
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether this record has been persisted
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }
}

/// Reference to a module owned by another service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRef {
    pub id: Option<i64>,
    pub code: Option<String>,
    pub name: Option<String>,
}

impl ModuleRef {
    pub fn new(id: i64, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            code: Some(code.into()),
            name: Some(name.into()),
        }
    }
}

/// Link from a storage to a module it receives from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSourceLink {
    pub module: Option<ModuleRef>,
}

/// Link from a storage to a module it delivers to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDestinationLink {
    pub module: Option<ModuleRef>,
}

impl From<ModuleRef> for ModuleSourceLink {
    fn from(module: ModuleRef) -> Self {
        Self {
            module: Some(module),
        }
    }
}

impl From<ModuleRef> for ModuleDestinationLink {
    fn from(module: ModuleRef) -> Self {
        Self {
            module: Some(module),
        }
    }
}

/// Acting user for audit stamping
///
/// Audit timestamps are always UTC. `timezone_offset` is carried through
/// from the caller and logged with each write, it never shifts a stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    /// User name written into audit fields
    pub username: String,
    /// Client timezone offset in hours
    pub timezone_offset: i32,
}

impl Default for IdentityContext {
    fn default() -> Self {
        Self {
            username: "anonymous".to_string(),
            timezone_offset: 0,
        }
    }
}

impl IdentityContext {
    pub fn new(username: impl Into<String>, timezone_offset: i32) -> Self {
        Self {
            username: username.into(),
            timezone_offset,
        }
    }
}

/// Loosely-typed list request as received from callers
///
/// `filter` and `order` are JSON object texts, e.g. `{"code":"GDG-01"}` and
/// `{"name":"desc"}`. They are parsed into a typed query by the domain layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// 1-based page index
    pub page: u64,
    /// Items per page
    pub size: u64,
    pub filter: Option<String>,
    pub order: Option<String>,
    pub keyword: Option<String>,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
            filter: None,
            order: None,
            keyword: None,
        }
    }
}

impl ListRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }
}

/// One page of results plus the total number of matches before paging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

impl<T> Page<T> {
    /// Split into `(items, total)`
    pub fn into_parts(self) -> (Vec<T>, u64) {
        (self.items, self.total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}
