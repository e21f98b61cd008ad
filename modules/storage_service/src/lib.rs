//! Storage Service Module
//!
//! Master data for storages: the places goods are kept, each linked to the
//! modules goods may arrive from and leave to. Writes are validated for
//! required fields and a code unique among active storages; reads are
//! filtered, ordered and paged.

// Public exports
pub mod contract;
pub use contract::{
    client::StorageApi, error::StorageError, FailureKind, IdentityContext, ListRequest,
    ModuleDestinationLink, ModuleRef, ModuleSourceLink, Page, Storage, ValidationFailure,
};

pub mod module;
pub use module::StorageServiceModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
