//! Mapper implementations for converting between DTOs and contract models
//!
//! View model → entity mapping never fails: every nested link becomes exactly
//! one link in the same position, and a missing module becomes a link without
//! a module. Checking the result is the validator's job.

use super::dto::*;
use crate::contract;
use serde_json::{Map, Value};

// ===== View model → entity =====

/// Map an incoming view model to a storage entity
pub fn map_to_model(view: StorageViewModel) -> contract::Storage {
    view.into()
}

impl From<StorageViewModel> for contract::Storage {
    fn from(view: StorageViewModel) -> Self {
        Self {
            id: view.id,
            code: view.code.unwrap_or_default(),
            name: view.name.unwrap_or_default(),
            module_sources: view
                .module_sources
                .into_iter()
                .map(|item| contract::ModuleSourceLink {
                    module: item.module_source.map(Into::into),
                })
                .collect(),
            module_destinations: view
                .module_destinations
                .into_iter()
                .map(|item| contract::ModuleDestinationLink {
                    module: item.module_destination.map(Into::into),
                })
                .collect(),
            ..Self::default()
        }
    }
}

impl From<ModuleViewModel> for contract::ModuleRef {
    fn from(view: ModuleViewModel) -> Self {
        Self {
            id: view.id,
            code: view.code,
            name: view.name,
        }
    }
}

// ===== Entity → view model =====

impl From<contract::Storage> for StorageViewModel {
    fn from(storage: contract::Storage) -> Self {
        Self {
            id: storage.id,
            code: Some(storage.code),
            name: Some(storage.name),
            module_sources: storage
                .module_sources
                .into_iter()
                .map(|link| ModuleSourceViewModel {
                    module_source: link.module.map(Into::into),
                })
                .collect(),
            module_destinations: storage
                .module_destinations
                .into_iter()
                .map(|link| ModuleDestinationViewModel {
                    module_destination: link.module.map(Into::into),
                })
                .collect(),
            created_utc: Some(storage.created_utc),
            created_by: Some(storage.created_by),
            last_modified_utc: Some(storage.last_modified_utc),
            last_modified_by: Some(storage.last_modified_by),
        }
    }
}

impl From<contract::ModuleRef> for ModuleViewModel {
    fn from(module: contract::ModuleRef) -> Self {
        Self {
            id: module.id,
            code: module.code,
            name: module.name,
        }
    }
}

impl From<contract::ValidationFailure> for FieldErrorDto {
    fn from(failure: contract::ValidationFailure) -> Self {
        Self {
            member: failure.member,
            message: failure.message,
        }
    }
}

// ===== Projection =====

/// Split a `select` parameter into field names
pub fn parse_select(select: Option<&str>) -> Vec<String> {
    select
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Keep only the selected top-level fields of a serialized view model.
/// Names match ignoring ASCII case and underscores; an empty selection keeps everything.
pub fn project(value: Value, select: &[String]) -> Value {
    if select.is_empty() {
        return value;
    }
    let wanted: Vec<String> = select.iter().map(|s| normalize(s)).collect();

    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| wanted.contains(&normalize(key)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn module(id: i64, code: &str) -> ModuleViewModel {
        ModuleViewModel {
            id: Some(id),
            code: Some(code.to_string()),
            name: Some(format!("Module {}", code)),
        }
    }

    #[test]
    fn test_links_keep_count_and_order() {
        let view = StorageViewModel {
            code: Some("GDG-01".to_string()),
            name: Some("Gudang".to_string()),
            module_sources: vec![
                ModuleSourceViewModel { module_source: Some(module(3, "C")) },
                ModuleSourceViewModel { module_source: Some(module(1, "A")) },
                ModuleSourceViewModel { module_source: Some(module(2, "B")) },
            ],
            module_destinations: vec![
                ModuleDestinationViewModel { module_destination: Some(module(9, "Z")) },
                ModuleDestinationViewModel { module_destination: Some(module(8, "Y")) },
            ],
            ..StorageViewModel::default()
        };

        let storage = map_to_model(view);

        let sources: Vec<_> = storage
            .module_sources
            .iter()
            .map(|l| l.module.as_ref().and_then(|m| m.id))
            .collect();
        assert_eq!(sources, vec![Some(3), Some(1), Some(2)]);

        let destinations: Vec<_> = storage
            .module_destinations
            .iter()
            .map(|l| l.module.as_ref().and_then(|m| m.code.clone()))
            .collect();
        assert_eq!(destinations, vec![Some("Z".to_string()), Some("Y".to_string())]);
    }

    #[test]
    fn test_missing_module_keeps_the_link() {
        let view = StorageViewModel {
            module_sources: vec![
                ModuleSourceViewModel::default(),
                ModuleSourceViewModel { module_source: Some(module(1, "A")) },
            ],
            module_destinations: vec![ModuleDestinationViewModel::default()],
            ..StorageViewModel::default()
        };

        let storage = map_to_model(view);

        assert_eq!(storage.module_sources.len(), 2);
        assert!(storage.module_sources[0].module.is_none());
        assert_eq!(storage.module_destinations.len(), 1);
        assert!(storage.module_destinations[0].module.is_none());
        assert!(storage.code.is_empty());
    }

    #[test]
    fn test_client_json_shape() {
        let body = json!({
            "code": "code",
            "moduleSources": [
                { "moduleSource": { "_id": 1, "code": "code", "name": "name" } }
            ],
            "moduleDestinations": [
                { "moduleDestination": { "_id": 1, "code": "code", "name": "name" } }
            ],
            "_createdBy": "someone else"
        });

        let view: StorageViewModel = serde_json::from_value(body).unwrap();
        let storage = map_to_model(view);

        assert_eq!(storage.id, 0);
        assert_eq!(storage.code, "code");
        assert_eq!(storage.name, "");
        assert_eq!(
            storage.module_sources[0].module,
            Some(contract::ModuleRef::new(1, "code", "name"))
        );
        assert_eq!(storage.module_destinations.len(), 1);
        // Audit fields are never taken from the caller
        assert_eq!(storage.created_by, "");
    }

    #[test]
    fn test_entity_to_view_model_round_trip() {
        let mut storage = contract::Storage::new("GDG-01", "Gudang");
        storage.id = 4;
        storage.module_sources = vec![contract::ModuleSourceLink::default()];

        let view = StorageViewModel::from(storage.clone());
        assert_eq!(view.id, 4);
        assert_eq!(view.module_sources, vec![ModuleSourceViewModel::default()]);

        let back = map_to_model(view);
        assert_eq!(back.code, storage.code);
        assert_eq!(back.module_sources, storage.module_sources);
    }

    #[test]
    fn test_projection() {
        let value = json!({ "_id": 1, "code": "A", "name": "Alpha", "moduleSources": [] });
        let select = parse_select(Some(" code, _id ,,"));

        assert_eq!(select, vec!["code".to_string(), "_id".to_string()]);
        assert_eq!(project(value.clone(), &select), json!({ "_id": 1, "code": "A" }));
        assert_eq!(project(value.clone(), &[]), value);

        let select = parse_select(Some("ID,ModuleSources"));
        assert_eq!(
            project(value, &select),
            json!({ "_id": 1, "moduleSources": [] })
        );
    }
}
