//! Query engine for storage listings
//!
//! Turns a loosely-typed [`ListRequest`] (JSON object texts for filter and order,
//! free-text keyword) into a typed [`StorageQuery`]. The typed query is evaluated
//! in memory by [`StorageQuery::apply`] and translated to SQL by the SeaORM
//! repository, so both stores share the same semantics:
//!
//! 1. only active (non-deleted) records
//! 2. all structured filters combined with AND
//! 3. keyword as case-insensitive substring over code OR name
//! 4. stable ordering by the requested sort chain, then by id
//! 5. total counted before paging
//! 6. page sliced as `[(page - 1) * size, page * size)`, empty past the end

use crate::contract::{ListRequest, ModuleRef, Page, Storage, StorageError};
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub use crate::contract::DEFAULT_PAGE_SIZE;

/// Upper bound for `size` when no configuration overrides it
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 1000;

/// Field keys are compared ignoring ASCII case and underscores, so
/// `"Code"`, `"code"` and `"_Code"` address the same field.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Trim and ASCII-lowercase a caller-supplied value
pub(crate) fn fold(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

/// Structured equality filter on a known storage field.
///
/// Text values are stored folded (trimmed, ASCII lowercase) and compared
/// against the lowercased stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageFilter {
    Id(i64),
    Code(String),
    Name(String),
    /// Storage links to a source module with this code
    ModuleSourceCode(String),
    /// Storage links to a destination module with this code
    ModuleDestinationCode(String),
}

impl StorageFilter {
    pub fn code(code: &str) -> Self {
        Self::Code(fold(code))
    }

    pub fn name(name: &str) -> Self {
        Self::Name(fold(name))
    }

    pub fn module_source_code(code: &str) -> Self {
        Self::ModuleSourceCode(fold(code))
    }

    pub fn module_destination_code(code: &str) -> Self {
        Self::ModuleDestinationCode(fold(code))
    }

    /// Parse one `key: value` entry. Unknown keys and `null` values yield `None`.
    fn parse(key: &str, value: &Value) -> Result<Option<Self>, StorageError> {
        if value.is_null() {
            return Ok(None);
        }

        let filter = match normalize_key(key).as_str() {
            "id" => Self::Id(integer_value(key, value)?),
            "code" => Self::code(&text_value(key, value)?),
            "name" => Self::name(&text_value(key, value)?),
            "modulesourcecode" => Self::module_source_code(&text_value(key, value)?),
            "moduledestinationcode" => Self::module_destination_code(&text_value(key, value)?),
            _ => return Ok(None),
        };

        Ok(Some(filter))
    }

    /// In-memory predicate
    pub fn matches(&self, storage: &Storage) -> bool {
        match self {
            Self::Id(id) => storage.id == *id,
            Self::Code(code) => storage.code.to_ascii_lowercase() == *code,
            Self::Name(name) => storage.name.to_ascii_lowercase() == *name,
            Self::ModuleSourceCode(code) => storage
                .module_sources
                .iter()
                .any(|link| module_has_code(link.module.as_ref(), code)),
            Self::ModuleDestinationCode(code) => storage
                .module_destinations
                .iter()
                .any(|link| module_has_code(link.module.as_ref(), code)),
        }
    }
}

fn module_has_code(module: Option<&ModuleRef>, code: &str) -> bool {
    module
        .and_then(|m| m.code.as_deref())
        .is_some_and(|c| c.to_ascii_lowercase() == code)
}

fn integer_value(key: &str, value: &Value) -> Result<i64, StorageError> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        StorageError::invalid_argument(format!("filter '{}' expects an integer, got {}", key, value))
    })
}

fn text_value(key: &str, value: &Value) -> Result<String, StorageError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(StorageError::invalid_argument(format!(
            "filter '{}' expects a string, got {}",
            key, value
        ))),
    }
}

/// Sortable storage fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Code,
    Name,
    CreatedUtc,
    LastModifiedUtc,
}

impl SortField {
    fn parse(key: &str) -> Option<Self> {
        match normalize_key(key).as_str() {
            "id" => Some(Self::Id),
            "code" => Some(Self::Code),
            "name" => Some(Self::Name),
            "createdutc" => Some(Self::CreatedUtc),
            "lastmodifiedutc" => Some(Self::LastModifiedUtc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(key: &str, value: &Value) -> Result<Self, StorageError> {
        match value.as_str().map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("asc") => Ok(Self::Asc),
            Some("desc") => Ok(Self::Desc),
            _ => Err(StorageError::invalid_argument(format!(
                "order '{}' must be \"asc\" or \"desc\", got {}",
                key, value
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    fn compare(&self, a: &Storage, b: &Storage) -> Ordering {
        let ordering = match self.field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Code => a.code.cmp(&b.code),
            SortField::Name => a.name.cmp(&b.name),
            SortField::CreatedUtc => a.created_utc.cmp(&b.created_utc),
            SortField::LastModifiedUtc => a.last_modified_utc.cmp(&b.last_modified_utc),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Typed, validated storage list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageQuery {
    /// 1-based page index
    pub page: u64,
    /// Items per page, at least 1
    pub size: u64,
    /// Combined with AND
    pub filters: Vec<StorageFilter>,
    /// Sort chain; `id asc` is always the final tie-breaker
    pub order: Vec<SortSpec>,
    /// Folded keyword, `None` when blank
    pub keyword: Option<String>,
}

impl StorageQuery {
    /// Unfiltered query for one page
    pub fn new(page: u64, size: u64) -> Result<Self, StorageError> {
        if page == 0 {
            return Err(StorageError::invalid_argument("page must be at least 1"));
        }
        if size == 0 {
            return Err(StorageError::invalid_argument("size must be at least 1"));
        }

        Ok(Self {
            page,
            size,
            filters: Vec::new(),
            order: Vec::new(),
            keyword: None,
        })
    }

    /// Parse and validate a loosely-typed list request
    pub fn parse(request: &ListRequest, max_page_size: u64) -> Result<Self, StorageError> {
        if request.size > max_page_size {
            return Err(StorageError::invalid_argument(format!(
                "size must not exceed {}",
                max_page_size
            )));
        }

        let mut query = Self::new(request.page, request.size)?;

        for (key, value) in parse_object("filter", request.filter.as_deref())? {
            if let Some(filter) = StorageFilter::parse(&key, &value)? {
                query.filters.push(filter);
            }
        }

        for (key, value) in parse_object("order", request.order.as_deref())? {
            let Some(field) = SortField::parse(&key) else {
                continue;
            };
            let direction = SortDirection::parse(&key, &value)?;
            query.order.push(SortSpec { field, direction });
        }

        if let Some(keyword) = request.keyword.as_deref() {
            query = query.with_keyword(keyword);
        }

        Ok(query)
    }

    pub fn with_filter(mut self, filter: StorageFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_order(mut self, spec: SortSpec) -> Self {
        self.order.push(spec);
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        let folded = fold(keyword);
        self.keyword = (!folded.is_empty()).then_some(folded);
        self
    }

    /// Number of matching records to skip
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// Active, passes every filter and the keyword
    pub fn matches(&self, storage: &Storage) -> bool {
        !storage.is_deleted
            && self.filters.iter().all(|f| f.matches(storage))
            && self.keyword_matches(storage)
    }

    fn keyword_matches(&self, storage: &Storage) -> bool {
        match &self.keyword {
            None => true,
            Some(keyword) => {
                storage.code.to_ascii_lowercase().contains(keyword.as_str())
                    || storage.name.to_ascii_lowercase().contains(keyword.as_str())
            }
        }
    }

    /// Total order used for results
    pub fn compare(&self, a: &Storage, b: &Storage) -> Ordering {
        self.order
            .iter()
            .map(|spec| spec.compare(a, b))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    /// Evaluate the query over a record set
    pub fn apply(&self, records: impl IntoIterator<Item = Storage>) -> Page<Storage> {
        let mut matched: Vec<Storage> = records
            .into_iter()
            .filter(|storage| self.matches(storage))
            .collect();
        matched.sort_by(|a, b| self.compare(a, b));

        let total = matched.len() as u64;
        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(self.size).unwrap_or(usize::MAX);
        let items = matched.into_iter().skip(offset).take(size).collect();

        Page {
            items,
            total,
            page: self.page,
            size: self.size,
        }
    }
}

fn parse_object(label: &str, text: Option<&str>) -> Result<Map<String, Value>, StorageError> {
    let text = match text.map(str::trim) {
        None | Some("") => return Ok(Map::new()),
        Some(text) => text,
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(StorageError::invalid_argument(format!(
            "{} must be a JSON object, got {}",
            label, other
        ))),
        Err(e) => Err(StorageError::invalid_argument(format!(
            "{} is not valid JSON: {}",
            label, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ModuleRef, ModuleSourceLink};
    use chrono::{Duration, TimeZone, Utc};

    fn storage(id: i64, code: &str, name: &str) -> Storage {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(id);
        Storage {
            id,
            created_utc: created,
            last_modified_utc: created,
            ..Storage::new(code, name)
        }
    }

    fn warehouse() -> Vec<Storage> {
        vec![
            storage(1, "GDG-01", "Gudang Kain"),
            storage(2, "GDG-02", "Gudang Benang"),
            storage(3, "FIN-01", "Finishing Rack"),
            storage(4, "GDG-03", "Gudang Kain Jadi"),
            storage(5, "SPN-01", "Spinning Store"),
        ]
    }

    fn codes(page: &Page<Storage>) -> Vec<&str> {
        page.items.iter().map(|s| s.code.as_str()).collect()
    }

    #[test]
    fn test_rejects_zero_page_and_size() {
        assert!(matches!(
            StorageQuery::new(0, 10),
            Err(StorageError::InvalidArgument { .. })
        ));
        assert!(matches!(
            StorageQuery::new(1, 0),
            Err(StorageError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_rejects_size_above_maximum() {
        let request = ListRequest::new(1, 51);
        assert!(matches!(
            StorageQuery::parse(&request, 50),
            Err(StorageError::InvalidArgument { .. })
        ));
        assert!(StorageQuery::parse(&ListRequest::new(1, 50), 50).is_ok());
    }

    #[test]
    fn test_default_order_is_creation_order() {
        let mut records = warehouse();
        records.reverse();

        let query = StorageQuery::new(1, 25).unwrap();
        let page = query.apply(records);

        assert_eq!(page.total, 5);
        assert_eq!(codes(&page), vec!["GDG-01", "GDG-02", "FIN-01", "GDG-03", "SPN-01"]);
    }

    #[test]
    fn test_deleted_records_are_excluded() {
        let mut records = warehouse();
        records[1].is_deleted = true;

        let page = StorageQuery::new(1, 25).unwrap().apply(records);

        assert_eq!(page.total, 4);
        assert!(!codes(&page).contains(&"GDG-02"));
    }

    #[test]
    fn test_keyword_matches_code_or_name() {
        let request = ListRequest::new(1, 25).with_keyword("  kain ");
        let page = StorageQuery::parse(&request, 100).unwrap().apply(warehouse());
        assert_eq!(codes(&page), vec!["GDG-01", "GDG-03"]);

        let request = ListRequest::new(1, 25).with_keyword("fin");
        let page = StorageQuery::parse(&request, 100).unwrap().apply(warehouse());
        assert_eq!(codes(&page), vec!["FIN-01"]);
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let query = StorageQuery::parse(&ListRequest::new(1, 25).with_keyword("   "), 100).unwrap();
        assert_eq!(query.keyword, None);
        assert_eq!(query.apply(warehouse()).total, 5);
    }

    #[test]
    fn test_filters_and_keyword_combine_with_and() {
        let request = ListRequest::new(1, 25)
            .with_filter(r#"{"Name": "gudang kain"}"#)
            .with_keyword("gdg");
        let page = StorageQuery::parse(&request, 100).unwrap().apply(warehouse());
        assert_eq!(codes(&page), vec!["GDG-01"]);

        let request = ListRequest::new(1, 25)
            .with_filter(r#"{"code": "gdg-01", "_id": 2}"#);
        let page = StorageQuery::parse(&request, 100).unwrap().apply(warehouse());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_unknown_filter_keys_and_nulls_are_ignored() {
        let request = ListRequest::new(1, 25)
            .with_filter(r#"{"UnitCode": "U1", "IsActive": true, "name": null}"#);
        let query = StorageQuery::parse(&request, 100).unwrap();

        assert!(query.filters.is_empty());
        assert_eq!(query.apply(warehouse()).total, 5);
    }

    #[test]
    fn test_filter_type_mismatch_is_rejected() {
        let request = ListRequest::new(1, 25).with_filter(r#"{"id": "abc"}"#);
        assert!(matches!(
            StorageQuery::parse(&request, 100),
            Err(StorageError::InvalidArgument { .. })
        ));

        let request = ListRequest::new(1, 25).with_filter(r#"{"code": ["a"]}"#);
        assert!(StorageQuery::parse(&request, 100).is_err());
    }

    #[test]
    fn test_filter_must_be_json_object() {
        for filter in ["[1,2]", "not json", "42"] {
            let request = ListRequest::new(1, 25).with_filter(filter);
            assert!(
                matches!(
                    StorageQuery::parse(&request, 100),
                    Err(StorageError::InvalidArgument { .. })
                ),
                "filter {:?} should be rejected",
                filter
            );
        }

        for filter in ["", "{}", "null"] {
            let request = ListRequest::new(1, 25).with_filter(filter);
            assert!(StorageQuery::parse(&request, 100).is_ok());
        }
    }

    #[test]
    fn test_module_code_filter() {
        let mut records = warehouse();
        records[2]
            .module_sources
            .push(ModuleSourceLink::from(ModuleRef::new(7, "WVG", "Weaving")));

        let request = ListRequest::new(1, 25).with_filter(r#"{"moduleSourceCode": "wvg"}"#);
        let page = StorageQuery::parse(&request, 100).unwrap().apply(records.clone());
        assert_eq!(codes(&page), vec!["FIN-01"]);

        let request = ListRequest::new(1, 25).with_filter(r#"{"moduleDestinationCode": "WVG"}"#);
        let page = StorageQuery::parse(&request, 100).unwrap().apply(records);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_order_chain_and_direction() {
        let request = ListRequest::new(1, 25).with_order(r#"{"Name": "desc"}"#);
        let page = StorageQuery::parse(&request, 100).unwrap().apply(warehouse());
        assert_eq!(codes(&page), vec!["SPN-01", "GDG-03", "GDG-01", "GDG-02", "FIN-01"]);

        let request = ListRequest::new(1, 25).with_order(r#"{"_LastModifiedUtc": "DESC"}"#);
        let page = StorageQuery::parse(&request, 100).unwrap().apply(warehouse());
        assert_eq!(page.items.first().map(|s| s.id), Some(5));
    }

    #[test]
    fn test_ties_fall_back_to_id() {
        let records = vec![
            storage(3, "B", "Same"),
            storage(1, "C", "Same"),
            storage(2, "A", "Same"),
        ];
        let request = ListRequest::new(1, 25).with_order(r#"{"name": "asc"}"#);
        let page = StorageQuery::parse(&request, 100).unwrap().apply(records);
        assert_eq!(page.items.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_unknown_order_field_is_ignored_but_bad_direction_is_not() {
        let request = ListRequest::new(1, 25).with_order(r#"{"Unit": "asc"}"#);
        let query = StorageQuery::parse(&request, 100).unwrap();
        assert!(query.order.is_empty());

        let request = ListRequest::new(1, 25).with_order(r#"{"code": "sideways"}"#);
        assert!(matches!(
            StorageQuery::parse(&request, 100),
            Err(StorageError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_unknown_order_field_value_is_not_inspected() {
        let request = ListRequest::new(1, 25).with_order(r#"{"Unit": 1, "code": "desc"}"#);
        let query = StorageQuery::parse(&request, 100).unwrap();
        assert_eq!(query.order, vec![SortSpec::desc(SortField::Code)]);

        let page = query.apply(warehouse());
        assert_eq!(codes(&page), vec!["SPN-01", "GDG-03", "GDG-02", "GDG-01", "FIN-01"]);
    }

    #[test]
    fn test_default_request_uses_default_page_size() {
        let request = ListRequest::default();
        assert_eq!(request.size, DEFAULT_PAGE_SIZE);
        assert_eq!(StorageQuery::parse(&request, 100).unwrap().size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_paging_slices_and_keeps_total() {
        let query = StorageQuery::new(2, 2).unwrap();
        let page = query.apply(warehouse());
        assert_eq!(codes(&page), vec!["FIN-01", "GDG-03"]);
        assert_eq!(page.total, 5);

        let last = StorageQuery::new(3, 2).unwrap().apply(warehouse());
        assert_eq!(codes(&last), vec!["SPN-01"]);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let page = StorageQuery::new(10, 2).unwrap().apply(warehouse());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 10);
    }

    #[test]
    fn test_page_never_exceeds_size() {
        for size in 1..=6 {
            let page = StorageQuery::new(1, size).unwrap().apply(warehouse());
            assert!(page.items.len() as u64 <= size);
            assert_eq!(page.total, 5);
        }
    }

    #[test]
    fn test_huge_page_index_does_not_overflow() {
        let page = StorageQuery::new(u64::MAX, u64::MAX).unwrap().apply(warehouse());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
    }
}
