//! Common test utilities and shared storage fixtures
#![allow(dead_code)]

use sea_orm::Database;
use std::sync::Arc;
use storage_service::contract::*;
use storage_service::domain::Service;
use storage_service::infra::storage::{InMemoryStorageRepository, SeaOrmStorageRepository};
use tempfile::TempDir;

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

/// Modules of a small weaving mill, used as link targets
pub fn spinning() -> ModuleRef {
    ModuleRef::new(1, "SPN", "Spinning")
}

pub fn weaving() -> ModuleRef {
    ModuleRef::new(2, "WVG", "Weaving")
}

pub fn finishing() -> ModuleRef {
    ModuleRef::new(3, "FNS", "Finishing")
}

pub fn storage(code: &str, name: &str) -> Storage {
    Storage::new(code, name)
}

/// Storage receiving from `sources` and delivering to `destinations`
pub fn linked_storage(
    code: &str,
    name: &str,
    sources: Vec<ModuleRef>,
    destinations: Vec<ModuleRef>,
) -> Storage {
    let mut storage = Storage::new(code, name);
    storage.module_sources = sources.into_iter().map(Into::into).collect();
    storage.module_destinations = destinations.into_iter().map(Into::into).collect();
    storage
}

pub fn dev() -> IdentityContext {
    IdentityContext::new("dev", 7)
}

pub fn memory_service() -> (Arc<InMemoryStorageRepository>, Service) {
    let repo = Arc::new(InMemoryStorageRepository::new());
    let service = Service::new(repo.clone());
    (repo, service)
}

/// URL of a fresh SQLite file named after the test inside `dir`
pub fn sqlite_url(dir: &TempDir, test_name: &str) -> String {
    let path = dir.path().join(format!("{}.db", test_name));
    format!("sqlite://{}?mode=rwc", path.display())
}

/// Repository over a migrated SQLite file named after the test.
/// Keep the returned directory alive for the duration of the test.
pub async fn sqlite_repository(test_name: &str) -> (TempDir, Arc<SeaOrmStorageRepository>) {
    let dir = tempfile::tempdir().unwrap();

    let db = Database::connect(sqlite_url(&dir, test_name)).await.unwrap();
    storage_service::module::migrate(&db).await.unwrap();

    (dir, Arc::new(SeaOrmStorageRepository::new(Arc::new(db))))
}

/// Service backed by [`sqlite_repository`]
pub async fn sqlite_service(test_name: &str) -> (TempDir, Service) {
    let (dir, repo) = sqlite_repository(test_name).await;
    (dir, Service::new(repo))
}

/// Fire `attempts` concurrent creates of the same code, returning the
/// successful ids and the errors
pub async fn race_creates(
    service: Arc<Service>,
    code: &str,
    attempts: usize,
) -> (Vec<i64>, Vec<StorageError>) {
    let handles: Vec<_> = (0..attempts)
        .map(|i| {
            let service = service.clone();
            let candidate = storage(code, &format!("Racer {}", i));
            tokio::spawn(async move { service.create_storage(candidate, &dev()).await })
        })
        .collect();

    let mut ids = Vec::new();
    let mut errors = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(id) => ids.push(id),
            Err(err) => errors.push(err),
        }
    }
    (ids, errors)
}

pub fn codes(page: &Page<Storage>) -> Vec<String> {
    page.items.iter().map(|s| s.code.clone()).collect()
}

pub fn failure_members(error: &StorageError) -> Vec<(String, FailureKind)> {
    match error {
        StorageError::Validation { failures } => failures
            .iter()
            .map(|f| (f.member.clone(), f.kind))
            .collect(),
        other => panic!("expected validation error, got {:?}", other),
    }
}
