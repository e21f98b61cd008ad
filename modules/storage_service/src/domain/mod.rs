//! Domain layer - business logic and services

pub mod query;
pub mod repository;
pub mod service;
pub mod validation;

pub use query::{SortDirection, SortField, SortSpec, StorageFilter, StorageQuery};
pub use repository::{CodeConflict, StorageRepository};
pub use service::Service;
pub use validation::ValidationContext;
