//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity::{self, module_destination, module_source};
use crate::contract::{ModuleDestinationLink, ModuleRef, ModuleSourceLink, Storage};
use sea_orm::ActiveValue::{NotSet, Set};

// ===== Storage Conversions =====

/// Assemble a storage from its row and its link rows (already in position order)
pub fn to_storage(
    model: entity::Model,
    sources: Vec<module_source::Model>,
    destinations: Vec<module_destination::Model>,
) -> Storage {
    Storage {
        id: model.id,
        code: model.code,
        name: model.name,
        module_sources: sources
            .into_iter()
            .map(|row| ModuleSourceLink {
                module: module_ref(row.module_id, row.module_code, row.module_name),
            })
            .collect(),
        module_destinations: destinations
            .into_iter()
            .map(|row| ModuleDestinationLink {
                module: module_ref(row.module_id, row.module_code, row.module_name),
            })
            .collect(),
        is_deleted: model.is_deleted,
        created_utc: model.created_utc,
        created_by: model.created_by,
        created_agent: model.created_agent,
        last_modified_utc: model.last_modified_utc,
        last_modified_by: model.last_modified_by,
        last_modified_agent: model.last_modified_agent,
        deleted_utc: model.deleted_utc,
        deleted_by: model.deleted_by,
    }
}

impl From<&Storage> for entity::ActiveModel {
    fn from(model: &Storage) -> Self {
        Self {
            id: if model.is_persisted() { Set(model.id) } else { NotSet },
            code: Set(model.code.clone()),
            name: Set(model.name.clone()),
            is_deleted: Set(model.is_deleted),
            created_utc: Set(model.created_utc),
            created_by: Set(model.created_by.clone()),
            created_agent: Set(model.created_agent.clone()),
            last_modified_utc: Set(model.last_modified_utc),
            last_modified_by: Set(model.last_modified_by.clone()),
            last_modified_agent: Set(model.last_modified_agent.clone()),
            deleted_utc: Set(model.deleted_utc),
            deleted_by: Set(model.deleted_by.clone()),
        }
    }
}

// ===== Link Conversions =====

pub fn source_rows(storage_id: i64, links: &[ModuleSourceLink]) -> Vec<module_source::ActiveModel> {
    links
        .iter()
        .zip(0..)
        .map(|(link, position)| {
            let module = link.module.clone().unwrap_or_default();
            module_source::ActiveModel {
                id: NotSet,
                storage_id: Set(storage_id),
                position: Set(position),
                module_id: Set(module.id),
                module_code: Set(module.code),
                module_name: Set(module.name),
            }
        })
        .collect()
}

pub fn destination_rows(
    storage_id: i64,
    links: &[ModuleDestinationLink],
) -> Vec<module_destination::ActiveModel> {
    links
        .iter()
        .zip(0..)
        .map(|(link, position)| {
            let module = link.module.clone().unwrap_or_default();
            module_destination::ActiveModel {
                id: NotSet,
                storage_id: Set(storage_id),
                position: Set(position),
                module_id: Set(module.id),
                module_code: Set(module.code),
                module_name: Set(module.name),
            }
        })
        .collect()
}

/// A link row with no module columns set maps back to an empty link
fn module_ref(id: Option<i64>, code: Option<String>, name: Option<String>) -> Option<ModuleRef> {
    if id.is_none() && code.is_none() && name.is_none() {
        return None;
    }
    Some(ModuleRef { id, code, name })
}
