//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;

pub use client::StorageApi;
pub use error::{FailureKind, StorageError, ValidationFailure};
pub use model::{
    IdentityContext, ListRequest, ModuleDestinationLink, ModuleRef, ModuleSourceLink, Page,
    Storage, DEFAULT_PAGE_SIZE, SERVICE_AGENT,
};
