//! API layer - REST adapter and in-process client

pub mod native;
pub mod rest;
