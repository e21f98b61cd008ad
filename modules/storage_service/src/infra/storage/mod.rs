//! Storage layer - database entities and repositories

pub mod entity;
pub mod mapper;
pub mod memory;
pub mod migrations;
pub mod query_mapper;
pub mod repositories;

pub use memory::InMemoryStorageRepository;
pub use repositories::SeaOrmStorageRepository;
