//! SeaORM entities for database tables

use sea_orm::entity::prelude::*;

/// Storages table entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "storages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Business code, unique among rows with `is_deleted = false`
    pub code: String,

    pub name: String,

    /// Soft delete flag
    pub is_deleted: bool,

    pub created_utc: DateTimeUtc,
    pub created_by: String,
    pub created_agent: String,
    pub last_modified_utc: DateTimeUtc,
    pub last_modified_by: String,
    pub last_modified_agent: String,
    pub deleted_utc: Option<DateTimeUtc>,
    pub deleted_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "module_source::Entity")]
    ModuleSources,
    #[sea_orm(has_many = "module_destination::Entity")]
    ModuleDestinations,
}

impl Related<module_source::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModuleSources.def()
    }
}

impl Related<module_destination::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ModuleDestinations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Source module links owned by a storage
pub mod module_source {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "storage_module_sources")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,

        /// Owning storage
        pub storage_id: i64,

        /// Position within the storage's collection
        pub position: i32,

        pub module_id: Option<i64>,
        pub module_code: Option<String>,
        pub module_name: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::StorageId",
            to = "super::Column::Id",
            on_delete = "Cascade"
        )]
        Storage,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Storage.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Destination module links owned by a storage
pub mod module_destination {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "storage_module_destinations")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,

        /// Owning storage
        pub storage_id: i64,

        /// Position within the storage's collection
        pub position: i32,

        pub module_id: Option<i64>,
        pub module_code: Option<String>,
        pub module_name: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::StorageId",
            to = "super::Column::Id",
            on_delete = "Cascade"
        )]
        Storage,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Storage.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
