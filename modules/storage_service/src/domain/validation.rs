//! Validation rules for storage records
//!
//! Rules run in a fixed order and every rule runs, so one pass reports all
//! failures at once:
//!
//! 1. `code` is required
//! 2. `name` is required
//! 3. every module link references a module
//! 4. a module appears at most once per link collection
//! 5. `code` is not used by another active storage (only when rule 1 passed)

use super::repository::StorageRepository;
use crate::contract::{FailureKind, ModuleRef, Storage, StorageError, ValidationFailure};
use std::collections::HashSet;

/// Gives validation rules access to persisted storages
pub struct ValidationContext<'a> {
    repo: &'a dyn StorageRepository,
}

impl<'a> ValidationContext<'a> {
    pub fn new(repo: &'a dyn StorageRepository) -> Self {
        Self { repo }
    }

    async fn code_in_use(&self, code: &str, exclude_id: Option<i64>) -> Result<bool, StorageError> {
        self.repo.code_in_use(code, exclude_id).await.map_err(|e| {
            tracing::error!(error = ?e, code, "Duplicate code lookup failed");
            StorageError::Internal
        })
    }
}

impl Storage {
    /// Field-level rules (1-4). Lazy: nothing is evaluated until iterated.
    pub fn field_failures(&self) -> impl Iterator<Item = ValidationFailure> + '_ {
        let sources = self.module_sources.iter().map(|l| l.module.as_ref());
        let destinations = self.module_destinations.iter().map(|l| l.module.as_ref());

        required("code", &self.code)
            .into_iter()
            .chain(required("name", &self.name))
            .chain(link_failures("module_sources", sources))
            .chain(link_failures("module_destinations", destinations))
    }

    /// Run every rule, including the duplicate code check against the store
    pub async fn validate(
        &self,
        ctx: &ValidationContext<'_>,
    ) -> Result<Vec<ValidationFailure>, StorageError> {
        let mut failures: Vec<ValidationFailure> = self.field_failures().collect();

        let code = self.code.trim();
        if !code.is_empty() {
            let exclude_id = self.is_persisted().then_some(self.id);
            if ctx.code_in_use(code, exclude_id).await? {
                failures.push(duplicate_code(code));
            }
        }

        Ok(failures)
    }
}

pub(crate) fn duplicate_code(code: &str) -> ValidationFailure {
    ValidationFailure::new(
        "code",
        FailureKind::DuplicateCode,
        format!("Code '{}' is already used by another storage", code),
    )
}

fn required(member: &str, value: &str) -> Option<ValidationFailure> {
    value.trim().is_empty().then(|| {
        ValidationFailure::new(
            member,
            FailureKind::RequiredFieldMissing,
            format!("{} is required", member),
        )
    })
}

fn link_failures<'a>(
    collection: &'static str,
    modules: impl Iterator<Item = Option<&'a ModuleRef>> + 'a,
) -> impl Iterator<Item = ValidationFailure> + 'a {
    let mut seen = HashSet::new();

    modules.enumerate().filter_map(move |(index, module)| {
        let member = format!("{}[{}].module", collection, index);
        match module.and_then(|m| m.id) {
            None => Some(ValidationFailure::new(
                member,
                FailureKind::RequiredFieldMissing,
                "module is required",
            )),
            Some(id) if !seen.insert(id) => Some(ValidationFailure::new(
                member,
                FailureKind::DuplicateModule,
                format!("module {} is already linked", id),
            )),
            Some(_) => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ModuleDestinationLink, ModuleSourceLink};
    use crate::infra::storage::memory::InMemoryStorageRepository;

    fn members(failures: &[ValidationFailure]) -> Vec<(&str, FailureKind)> {
        failures.iter().map(|f| (f.member.as_str(), f.kind)).collect()
    }

    #[test]
    fn test_blank_storage_fails_required_fields() {
        let failures: Vec<_> = Storage::default().field_failures().collect();
        assert_eq!(
            members(&failures),
            vec![
                ("code", FailureKind::RequiredFieldMissing),
                ("name", FailureKind::RequiredFieldMissing),
            ]
        );
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let failures: Vec<_> = Storage::new("   ", "\t").field_failures().collect();
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn test_empty_links_are_valid() {
        assert_eq!(Storage::new("GDG-01", "Gudang").field_failures().count(), 0);
    }

    #[test]
    fn test_link_without_module_is_reported_by_position() {
        let mut storage = Storage::new("GDG-01", "Gudang");
        storage.module_sources = vec![
            ModuleRef::new(1, "WVG", "Weaving").into(),
            ModuleSourceLink::default(),
        ];
        storage.module_destinations = vec![ModuleDestinationLink {
            module: Some(ModuleRef {
                id: None,
                code: Some("FIN".to_string()),
                name: None,
            }),
        }];

        let failures: Vec<_> = storage.field_failures().collect();
        assert_eq!(
            members(&failures),
            vec![
                ("module_sources[1].module", FailureKind::RequiredFieldMissing),
                ("module_destinations[0].module", FailureKind::RequiredFieldMissing),
            ]
        );
    }

    #[test]
    fn test_same_module_twice_in_one_collection() {
        let mut storage = Storage::new("GDG-01", "Gudang");
        storage.module_sources = vec![
            ModuleRef::new(1, "WVG", "Weaving").into(),
            ModuleRef::new(2, "DYE", "Dyeing").into(),
            ModuleRef::new(1, "WVG", "Weaving").into(),
        ];
        // The same module on the other side is fine
        storage.module_destinations = vec![ModuleRef::new(1, "WVG", "Weaving").into()];

        let failures: Vec<_> = storage.field_failures().collect();
        assert_eq!(
            members(&failures),
            vec![("module_sources[2].module", FailureKind::DuplicateModule)]
        );
    }

    #[tokio::test]
    async fn test_blank_storage_validates_standalone() {
        let repo = InMemoryStorageRepository::new();
        let ctx = ValidationContext::new(&repo);

        let failures = Storage::default().validate(&ctx).await.unwrap();
        assert!(!failures.is_empty());
        assert!(failures.iter().all(|f| f.kind == FailureKind::RequiredFieldMissing));
    }

    #[tokio::test]
    async fn test_duplicate_code_is_case_insensitive() {
        let repo = InMemoryStorageRepository::new();
        repo.seed(Storage::new("GDG-01", "Gudang"));
        let ctx = ValidationContext::new(&repo);

        let failures = Storage::new(" gdg-01 ", "Other").validate(&ctx).await.unwrap();
        assert_eq!(members(&failures), vec![("code", FailureKind::DuplicateCode)]);
    }

    #[tokio::test]
    async fn test_duplicate_check_excludes_own_id() {
        let repo = InMemoryStorageRepository::new();
        let id = repo.seed(Storage::new("GDG-01", "Gudang"));
        let ctx = ValidationContext::new(&repo);

        let mut same = Storage::new("GDG-01", "Renamed");
        same.id = id;
        assert!(same.validate(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_name_and_duplicate_code_coexist() {
        let repo = InMemoryStorageRepository::new();
        repo.seed(Storage::new("GDG-01", "Gudang"));
        let ctx = ValidationContext::new(&repo);

        let failures = Storage::new("GDG-01", "").validate(&ctx).await.unwrap();
        assert_eq!(
            members(&failures),
            vec![
                ("name", FailureKind::RequiredFieldMissing),
                ("code", FailureKind::DuplicateCode),
            ]
        );
    }

    #[tokio::test]
    async fn test_deleted_storage_does_not_block_code() {
        let repo = InMemoryStorageRepository::new();
        let mut deleted = Storage::new("GDG-01", "Gudang");
        deleted.is_deleted = true;
        repo.seed(deleted);
        let ctx = ValidationContext::new(&repo);

        assert!(Storage::new("GDG-01", "New").validate(&ctx).await.unwrap().is_empty());
    }
}
